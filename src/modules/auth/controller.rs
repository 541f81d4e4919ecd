use axum::{Json, extract::State};
use tracing::instrument;
use utoipa::ToSchema;

use reservo_core::AppError;
use reservo_models::{
    AccessTokenResponse, LoginRequest, LoginResponse, MessageResponse, RefreshTokenRequest,
};

use super::service::AuthService;
use crate::extract::JsonBody;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

#[derive(ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

/// Login with an existing login and receive an access/refresh token pair
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, description = "Bad request - malformed body", body = ErrorResponse),
        (status = 401, description = "Unknown login", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, dto))]
pub async fn login_user(
    State(state): State<AppState>,
    JsonBody(dto): JsonBody<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let response = AuthService::login_user(state.store.as_ref(), dto, &state.jwt_config).await?;
    Ok(Json(response))
}

/// Exchange a refresh token for a new access token
#[utoipa::path(
    post,
    path = "/api/auth/refresh",
    request_body = RefreshTokenRequest,
    responses(
        (status = 200, description = "Token refreshed", body = AccessTokenResponse),
        (status = 401, description = "Invalid or expired refresh token", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, dto))]
pub async fn refresh_token(
    State(state): State<AppState>,
    JsonBody(dto): JsonBody<RefreshTokenRequest>,
) -> Result<Json<AccessTokenResponse>, AppError> {
    let response =
        AuthService::refresh_access_token(state.store.as_ref(), &dto.refresh_token, &state.jwt_config)
            .await?;
    Ok(Json(response))
}

/// Logout the current user
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 200, description = "Logout successful", body = MessageResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    ),
    tag = "Authentication",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn logout_user(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<MessageResponse>, AppError> {
    let response = AuthService::logout_user(state.store.as_ref(), auth_user.login()).await?;
    Ok(Json(response))
}
