use reservo_core::Patch;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};

use crate::ids::{BuildingId, ClassroomId};

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Building {
    pub id: BuildingId,
    pub name: String,
    pub address: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildingChanges {
    pub name: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct BuildingResponse {
    pub id: BuildingId,
    pub name: String,
    pub address: String,
    pub classrooms: Vec<ClassroomId>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BuildingsResponse {
    pub buildings: Vec<BuildingResponse>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateBuildingDto {
    pub name: String,
    pub address: String,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateBuildingDto {
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub new_name: Patch<String>,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub new_address: Patch<String>,
}

#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct BuildingFilterParams {
    /// Exact building name
    pub name: String,
}
