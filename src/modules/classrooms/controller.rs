use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::instrument;

use reservo_core::AppError;
use reservo_models::{
    ClassroomId, ClassroomResponse, ClassroomsResponse, CreateClassroomDto, UpdateClassroomDto,
};

use crate::access;
use crate::extract::JsonBody;
use crate::middleware::auth::AuthUser;
use crate::modules::classrooms::service::ClassroomService;
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/api/classrooms",
    request_body = CreateClassroomDto,
    responses(
        (status = 201, description = "Classroom created", body = ClassroomResponse),
        (status = 400, description = "Invalid input or caller is not an administrator"),
        (status = 401, description = "Missing or invalid token")
    ),
    tag = "Classrooms",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn create_classroom(
    State(state): State<AppState>,
    auth_user: AuthUser,
    JsonBody(dto): JsonBody<CreateClassroomDto>,
) -> Result<(StatusCode, Json<ClassroomResponse>), AppError> {
    access::require_admin(state.store.as_ref(), auth_user.login()).await?;

    let classroom = ClassroomService::create_classroom(state.store.as_ref(), dto).await?;
    Ok((StatusCode::CREATED, Json(classroom)))
}

#[utoipa::path(
    get,
    path = "/api/classrooms/{id}",
    params(
        ("id" = i32, Path, description = "Classroom ID")
    ),
    responses(
        (status = 200, description = "Classroom details", body = ClassroomResponse),
        (status = 400, description = "Classroom not found"),
        (status = 401, description = "Missing or invalid token")
    ),
    tag = "Classrooms",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_classroom(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<ClassroomId>,
) -> Result<Json<ClassroomResponse>, AppError> {
    access::require_authenticated(state.store.as_ref(), auth_user.login()).await?;

    let classroom = ClassroomService::find_classroom(state.store.as_ref(), id).await?;
    Ok(Json(classroom))
}

/// Open to administrators and to the manager of the classroom's department.
#[utoipa::path(
    put,
    path = "/api/classrooms/{id}",
    params(
        ("id" = i32, Path, description = "Classroom ID")
    ),
    request_body = UpdateClassroomDto,
    responses(
        (status = 200, description = "Classroom updated", body = ClassroomResponse),
        (status = 400, description = "Invalid input, unknown relation, or access denied"),
        (status = 401, description = "Missing or invalid token")
    ),
    tag = "Classrooms",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn update_classroom(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<ClassroomId>,
    JsonBody(dto): JsonBody<UpdateClassroomDto>,
) -> Result<Json<ClassroomResponse>, AppError> {
    access::is_admin_or_manager_of_department_by_classroom(
        state.store.as_ref(),
        auth_user.login(),
        id,
    )
    .await?;

    let classroom = ClassroomService::update_classroom(state.store.as_ref(), id, dto).await?;
    Ok(Json(classroom))
}

#[utoipa::path(
    get,
    path = "/api/classrooms/all",
    responses(
        (status = 200, description = "All classrooms", body = ClassroomsResponse),
        (status = 400, description = "No classrooms exist"),
        (status = 401, description = "Missing or invalid token")
    ),
    tag = "Classrooms",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_all_classrooms(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<ClassroomsResponse>, AppError> {
    access::require_authenticated(state.store.as_ref(), auth_user.login()).await?;

    let classrooms = ClassroomService::find_all_classrooms(state.store.as_ref()).await?;
    Ok(Json(classrooms))
}

#[utoipa::path(
    get,
    path = "/api/classrooms/all/non-private",
    responses(
        (status = 200, description = "Classrooms open to everyone", body = ClassroomsResponse),
        (status = 400, description = "No non-private classrooms exist")
    ),
    tag = "Classrooms"
)]
#[instrument(skip(state))]
pub async fn get_all_non_private_classrooms(
    State(state): State<AppState>,
) -> Result<Json<ClassroomsResponse>, AppError> {
    let classrooms =
        ClassroomService::find_all_non_private_classrooms(state.store.as_ref()).await?;
    Ok(Json(classrooms))
}
