use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;

use reservo_core::AppError;
use reservo_models::{
    BuildingFilterParams, BuildingId, BuildingResponse, BuildingsResponse, CreateBuildingDto,
    UpdateBuildingDto,
};

use crate::access;
use crate::extract::JsonBody;
use crate::middleware::auth::AuthUser;
use crate::modules::buildings::service::BuildingService;
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/api/buildings",
    request_body = CreateBuildingDto,
    responses(
        (status = 201, description = "Building created", body = BuildingResponse),
        (status = 400, description = "Invalid input, duplicate building, or caller is not an administrator"),
        (status = 401, description = "Missing or invalid token")
    ),
    tag = "Buildings",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn create_building(
    State(state): State<AppState>,
    auth_user: AuthUser,
    JsonBody(dto): JsonBody<CreateBuildingDto>,
) -> Result<(StatusCode, Json<BuildingResponse>), AppError> {
    access::require_admin(state.store.as_ref(), auth_user.login()).await?;

    let building = BuildingService::create_building(state.store.as_ref(), dto).await?;
    Ok((StatusCode::CREATED, Json(building)))
}

#[utoipa::path(
    get,
    path = "/api/buildings",
    params(BuildingFilterParams),
    responses(
        (status = 200, description = "Buildings with this name, possibly none", body = BuildingsResponse),
        (status = 401, description = "Missing or invalid token")
    ),
    tag = "Buildings",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_buildings_by_name(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(filters): Query<BuildingFilterParams>,
) -> Result<Json<BuildingsResponse>, AppError> {
    access::require_authenticated(state.store.as_ref(), auth_user.login()).await?;

    let buildings =
        BuildingService::find_buildings_by_name(state.store.as_ref(), &filters.name).await?;
    Ok(Json(buildings))
}

#[utoipa::path(
    get,
    path = "/api/buildings/{id}",
    params(
        ("id" = i32, Path, description = "Building ID")
    ),
    responses(
        (status = 200, description = "Building details", body = BuildingResponse),
        (status = 400, description = "Building not found"),
        (status = 401, description = "Missing or invalid token")
    ),
    tag = "Buildings",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_building(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<BuildingId>,
) -> Result<Json<BuildingResponse>, AppError> {
    access::require_authenticated(state.store.as_ref(), auth_user.login()).await?;

    let building = BuildingService::find_building(state.store.as_ref(), id).await?;
    Ok(Json(building))
}

#[utoipa::path(
    put,
    path = "/api/buildings/{id}",
    params(
        ("id" = i32, Path, description = "Building ID")
    ),
    request_body = UpdateBuildingDto,
    responses(
        (status = 200, description = "Building updated", body = BuildingResponse),
        (status = 400, description = "Invalid input, building not found, or caller is not an administrator"),
        (status = 401, description = "Missing or invalid token")
    ),
    tag = "Buildings",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn update_building(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<BuildingId>,
    JsonBody(dto): JsonBody<UpdateBuildingDto>,
) -> Result<Json<BuildingResponse>, AppError> {
    access::require_admin(state.store.as_ref(), auth_user.login()).await?;

    let building = BuildingService::update_building(state.store.as_ref(), id, dto).await?;
    Ok(Json(building))
}

#[utoipa::path(
    get,
    path = "/api/buildings/all",
    responses(
        (status = 200, description = "All buildings", body = BuildingsResponse),
        (status = 400, description = "No buildings exist")
    ),
    tag = "Buildings"
)]
#[instrument(skip(state))]
pub async fn get_all_buildings(
    State(state): State<AppState>,
) -> Result<Json<BuildingsResponse>, AppError> {
    let buildings = BuildingService::find_all_buildings(state.store.as_ref()).await?;
    Ok(Json(buildings))
}
