use chrono::NaiveDateTime;
use reservo_core::Patch;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};

use crate::ids::{ClassroomId, RequestId, UserId};

/// A time-bound classroom reservation.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Request {
    pub id: RequestId,
    pub start_date: NaiveDateTime,
    pub end_date: NaiveDateTime,
    pub registration_date: NaiveDateTime,
    pub is_approved: bool,
    pub author_id: Option<UserId>,
    pub classroom_id: Option<ClassroomId>,
}

/// Insert payload. New requests are never approved.
#[derive(Debug, Clone)]
pub struct NewRequest {
    pub start_date: NaiveDateTime,
    pub end_date: NaiveDateTime,
    pub registration_date: NaiveDateTime,
    pub author_id: UserId,
    pub classroom_id: ClassroomId,
}

/// Columns an update writes. `None` leaves a column as stored and an inner
/// `None` clears a relation. Approval has its own store operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestChanges {
    pub author_id: Option<Option<UserId>>,
    pub classroom_id: Option<Option<ClassroomId>>,
    /// Replaces the participant set.
    pub requesting_users: Option<Vec<UserId>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RequestResponse {
    pub id: RequestId,
    pub start_date: NaiveDateTime,
    pub end_date: NaiveDateTime,
    pub registration_date: NaiveDateTime,
    pub is_approved: bool,
    pub author: Option<UserId>,
    pub requesting_users: Vec<UserId>,
    pub classroom: Option<ClassroomId>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RequestsResponse {
    pub requests: Vec<RequestResponse>,
}

/// `is_approved` and `registration_date` are not accepted from callers;
/// unknown keys are ignored.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateRequestDto {
    pub start_date: NaiveDateTime,
    pub end_date: NaiveDateTime,
    pub author_id: UserId,
    pub classroom_id: ClassroomId,
    #[serde(default)]
    pub requesting_user_logins: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateRequestDto {
    #[serde(default)]
    #[schema(value_type = Option<i32>)]
    pub new_author_id: Patch<UserId>,
    #[serde(default)]
    #[schema(value_type = Option<i32>)]
    pub new_classroom_id: Patch<ClassroomId>,
    /// Replaces the participant set; `null` or `[]` empties it.
    #[serde(default)]
    #[schema(value_type = Option<Vec<String>>)]
    pub new_requesting_user_logins: Patch<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApproveRequestDto {
    pub manager_id: UserId,
}

/// Query filters for `GET /api/requests`. All filters combine with AND.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RequestFilterParams {
    /// Only requests authored by this user
    #[param(value_type = Option<i32>)]
    pub author_id: Option<UserId>,
    /// Only requests for this classroom
    #[param(value_type = Option<i32>)]
    pub classroom_id: Option<ClassroomId>,
    /// Requests starting at or after this instant
    pub from: Option<NaiveDateTime>,
    /// Requests ending at or before this instant
    pub to: Option<NaiveDateTime>,
}
