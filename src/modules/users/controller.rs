use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::instrument;

use reservo_core::AppError;
use reservo_models::{CreateUserDto, UpdateUserDto, UserId, UserResponse, UsersResponse};

use crate::access;
use crate::extract::JsonBody;
use crate::middleware::auth::AuthUser;
use crate::modules::users::service::UserService;
use crate::state::AppState;

/// Registration is open; any caller may create a user.
#[utoipa::path(
    post,
    path = "/api/users",
    request_body = CreateUserDto,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Invalid input or login already in use")
    ),
    tag = "Users"
)]
#[instrument(skip(state, dto))]
pub async fn create_user(
    State(state): State<AppState>,
    JsonBody(dto): JsonBody<CreateUserDto>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    let user = UserService::create_user(state.store.as_ref(), dto).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

#[utoipa::path(
    get,
    path = "/api/users/{id}",
    params(
        ("id" = i32, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User details", body = UserResponse),
        (status = 400, description = "User not found"),
        (status = 401, description = "Missing or invalid token")
    ),
    tag = "Users",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<UserId>,
) -> Result<Json<UserResponse>, AppError> {
    access::require_authenticated(state.store.as_ref(), auth_user.login()).await?;

    let user = UserService::find_user(state.store.as_ref(), id).await?;
    Ok(Json(user))
}

#[utoipa::path(
    get,
    path = "/api/users/login/{login}",
    params(
        ("login" = String, Path, description = "User login")
    ),
    responses(
        (status = 200, description = "User details", body = UserResponse),
        (status = 400, description = "User not found"),
        (status = 401, description = "Missing or invalid token")
    ),
    tag = "Users",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_user_by_login(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(login): Path<String>,
) -> Result<Json<UserResponse>, AppError> {
    access::require_authenticated(state.store.as_ref(), auth_user.login()).await?;

    let user = UserService::find_user_by_login(state.store.as_ref(), &login).await?;
    Ok(Json(user))
}

/// Open to administrators and to the manager of the target user's department.
#[utoipa::path(
    put,
    path = "/api/users/{id}",
    params(
        ("id" = i32, Path, description = "User ID")
    ),
    request_body = UpdateUserDto,
    responses(
        (status = 200, description = "User updated", body = UserResponse),
        (status = 400, description = "Invalid input, unknown relation, or access denied"),
        (status = 401, description = "Missing or invalid token")
    ),
    tag = "Users",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn update_user(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<UserId>,
    JsonBody(dto): JsonBody<UpdateUserDto>,
) -> Result<Json<UserResponse>, AppError> {
    access::is_admin_or_manager_of_another_users_department(
        state.store.as_ref(),
        auth_user.login(),
        id,
    )
    .await?;

    let user = UserService::update_user(state.store.as_ref(), id, dto).await?;
    Ok(Json(user))
}

#[utoipa::path(
    get,
    path = "/api/users/all",
    responses(
        (status = 200, description = "All users", body = UsersResponse),
        (status = 400, description = "No users exist")
    ),
    tag = "Users"
)]
#[instrument(skip(state))]
pub async fn get_all_users(
    State(state): State<AppState>,
) -> Result<Json<UsersResponse>, AppError> {
    let users = UserService::find_all_users(state.store.as_ref()).await?;
    Ok(Json(users))
}
