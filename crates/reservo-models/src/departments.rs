use reservo_core::Patch;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};

use crate::ids::{ClassroomId, DepartmentId, UserId};

/// `manager_id` is a plain column, not a foreign key: it may name a user that
/// no longer exists, in which case nobody manages the department.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Department {
    pub id: DepartmentId,
    pub full_name: String,
    pub code_name: String,
    pub manager_id: Option<UserId>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DepartmentChanges {
    pub full_name: Option<String>,
    pub code_name: Option<String>,
    pub manager_id: Option<Option<UserId>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DepartmentResponse {
    pub id: DepartmentId,
    pub full_name: String,
    pub code_name: String,
    pub manager: Option<UserId>,
    pub users: Vec<UserId>,
    pub classrooms: Vec<ClassroomId>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DepartmentsResponse {
    pub departments: Vec<DepartmentResponse>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateDepartmentDto {
    pub full_name: String,
    pub code_name: String,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateDepartmentDto {
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub new_full_name: Patch<String>,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub new_code_name: Patch<String>,
    /// `null` removes the current manager.
    #[serde(default)]
    #[schema(value_type = Option<i32>)]
    pub new_manager_id: Patch<UserId>,
}

#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DepartmentFilterParams {
    /// Exact code name, e.g. `MATH`
    pub code_name: String,
}
