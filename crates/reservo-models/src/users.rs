use chrono::NaiveDateTime;
use reservo_core::Patch;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::ids::{ClassroomId, DepartmentId, RequestId, UserId};

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct User {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub login: String,
    pub registration_date: NaiveDateTime,
    pub is_admin: bool,
    pub department_id: Option<DepartmentId>,
}

/// Insert payload; `registration_date` is stamped by the service.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub login: String,
    pub is_admin: bool,
    pub registration_date: NaiveDateTime,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserChanges {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub department_id: Option<Option<DepartmentId>>,
    /// Replaces the occupied classroom set.
    pub occupied_classrooms: Option<Vec<ClassroomId>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub login: String,
    pub registration_date: NaiveDateTime,
    pub is_admin: bool,
    pub department: Option<DepartmentId>,
    pub managed_department: Option<DepartmentId>,
    pub managed_classrooms: Vec<ClassroomId>,
    pub occupied_classrooms: Vec<ClassroomId>,
    pub authored_requests: Vec<RequestId>,
    /// Requests the user participates in.
    pub requests: Vec<RequestId>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UsersResponse {
    pub users: Vec<UserResponse>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateUserDto {
    pub first_name: String,
    pub last_name: String,
    pub login: String,
    #[serde(default)]
    pub is_admin: bool,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateUserDto {
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub new_first_name: Patch<String>,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub new_last_name: Patch<String>,
    #[serde(default)]
    #[schema(value_type = Option<i32>)]
    pub new_department_id: Patch<DepartmentId>,
    /// Replaces the whole occupied set; `null` or `[]` empties it.
    #[serde(default)]
    #[schema(value_type = Option<Vec<i32>>)]
    pub new_occupied_classroom_ids: Patch<Vec<ClassroomId>>,
}
