use reservo_core::Patch;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::ids::{BuildingId, ClassroomId, DepartmentId, RequestId, UserId};

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Classroom {
    pub id: ClassroomId,
    pub name: String,
    pub floor: i32,
    pub is_private: bool,
    pub building_id: Option<BuildingId>,
    pub department_id: Option<DepartmentId>,
    pub manager_id: Option<UserId>,
}

/// Columns an update writes; untouched columns stay `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassroomChanges {
    pub name: Option<String>,
    pub is_private: Option<bool>,
    pub building_id: Option<Option<BuildingId>>,
    pub department_id: Option<Option<DepartmentId>>,
    pub manager_id: Option<Option<UserId>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ClassroomResponse {
    pub id: ClassroomId,
    pub name: String,
    pub floor: i32,
    pub is_private: bool,
    pub building: Option<BuildingId>,
    pub department: Option<DepartmentId>,
    pub manager: Option<UserId>,
    pub occupants: Vec<UserId>,
    pub requests: Vec<RequestId>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ClassroomsResponse {
    pub classrooms: Vec<ClassroomResponse>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateClassroomDto {
    pub name: String,
    pub floor: i32,
    pub is_private: bool,
}

/// Relations accept `null` to detach the classroom; `new_name` and
/// `new_is_private` do not.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateClassroomDto {
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub new_name: Patch<String>,
    #[serde(default)]
    #[schema(value_type = Option<i32>)]
    pub new_building_id: Patch<BuildingId>,
    #[serde(default)]
    #[schema(value_type = Option<i32>)]
    pub new_department_id: Patch<DepartmentId>,
    #[serde(default)]
    #[schema(value_type = Option<i32>)]
    pub new_manager_id: Patch<UserId>,
    #[serde(default)]
    #[schema(value_type = Option<bool>)]
    pub new_is_private: Patch<bool>,
}
