use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;

use reservo_core::AppError;
use reservo_models::{
    CreateDepartmentDto, DepartmentFilterParams, DepartmentId, DepartmentResponse,
    DepartmentsResponse, UpdateDepartmentDto,
};

use crate::access;
use crate::extract::JsonBody;
use crate::middleware::auth::AuthUser;
use crate::modules::departments::service::DepartmentService;
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/api/departments",
    request_body = CreateDepartmentDto,
    responses(
        (status = 201, description = "Department created", body = DepartmentResponse),
        (status = 400, description = "Invalid input, duplicate department, or caller is not an administrator"),
        (status = 401, description = "Missing or invalid token")
    ),
    tag = "Departments",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn create_department(
    State(state): State<AppState>,
    auth_user: AuthUser,
    JsonBody(dto): JsonBody<CreateDepartmentDto>,
) -> Result<(StatusCode, Json<DepartmentResponse>), AppError> {
    access::require_admin(state.store.as_ref(), auth_user.login()).await?;

    let department = DepartmentService::create_department(state.store.as_ref(), dto).await?;
    Ok((StatusCode::CREATED, Json(department)))
}

#[utoipa::path(
    get,
    path = "/api/departments",
    params(DepartmentFilterParams),
    responses(
        (status = 200, description = "Departments with this code name, possibly none", body = DepartmentsResponse),
        (status = 401, description = "Missing or invalid token")
    ),
    tag = "Departments",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_departments_by_code_name(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(filters): Query<DepartmentFilterParams>,
) -> Result<Json<DepartmentsResponse>, AppError> {
    access::require_authenticated(state.store.as_ref(), auth_user.login()).await?;

    let departments =
        DepartmentService::find_departments_by_code_name(state.store.as_ref(), &filters.code_name)
            .await?;
    Ok(Json(departments))
}

#[utoipa::path(
    get,
    path = "/api/departments/{id}",
    params(
        ("id" = i32, Path, description = "Department ID")
    ),
    responses(
        (status = 200, description = "Department details", body = DepartmentResponse),
        (status = 400, description = "Department not found"),
        (status = 401, description = "Missing or invalid token")
    ),
    tag = "Departments",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_department(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<DepartmentId>,
) -> Result<Json<DepartmentResponse>, AppError> {
    access::require_authenticated(state.store.as_ref(), auth_user.login()).await?;

    let department = DepartmentService::find_department(state.store.as_ref(), id).await?;
    Ok(Json(department))
}

#[utoipa::path(
    put,
    path = "/api/departments/{id}",
    params(
        ("id" = i32, Path, description = "Department ID")
    ),
    request_body = UpdateDepartmentDto,
    responses(
        (status = 200, description = "Department updated", body = DepartmentResponse),
        (status = 400, description = "Invalid input, unknown department or manager, or caller is not an administrator"),
        (status = 401, description = "Missing or invalid token")
    ),
    tag = "Departments",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn update_department(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<DepartmentId>,
    JsonBody(dto): JsonBody<UpdateDepartmentDto>,
) -> Result<Json<DepartmentResponse>, AppError> {
    access::require_admin(state.store.as_ref(), auth_user.login()).await?;

    let department = DepartmentService::update_department(state.store.as_ref(), id, dto).await?;
    Ok(Json(department))
}

#[utoipa::path(
    get,
    path = "/api/departments/all",
    responses(
        (status = 200, description = "All departments", body = DepartmentsResponse),
        (status = 400, description = "No departments exist")
    ),
    tag = "Departments"
)]
#[instrument(skip(state))]
pub async fn get_all_departments(
    State(state): State<AppState>,
) -> Result<Json<DepartmentsResponse>, AppError> {
    let departments = DepartmentService::find_all_departments(state.store.as_ref()).await?;
    Ok(Json(departments))
}
