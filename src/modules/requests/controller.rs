use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;

use reservo_core::AppError;
use reservo_models::{
    ApproveRequestDto, CreateRequestDto, RequestFilterParams, RequestId, RequestResponse,
    RequestsResponse, UpdateRequestDto,
};

use crate::access;
use crate::extract::JsonBody;
use crate::middleware::auth::AuthUser;
use crate::modules::requests::service::RequestService;
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/api/requests",
    request_body = CreateRequestDto,
    responses(
        (status = 201, description = "Reservation request created", body = RequestResponse),
        (status = 400, description = "Invalid dates or unknown author, classroom or login"),
        (status = 401, description = "Missing or invalid token")
    ),
    tag = "Requests",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn create_request(
    State(state): State<AppState>,
    auth_user: AuthUser,
    JsonBody(dto): JsonBody<CreateRequestDto>,
) -> Result<(StatusCode, Json<RequestResponse>), AppError> {
    access::require_authenticated(state.store.as_ref(), auth_user.login()).await?;

    let request = RequestService::create_request(state.store.as_ref(), dto).await?;
    Ok((StatusCode::CREATED, Json(request)))
}

#[utoipa::path(
    get,
    path = "/api/requests",
    params(RequestFilterParams),
    responses(
        (status = 200, description = "Matching requests, possibly none", body = RequestsResponse),
        (status = 401, description = "Missing or invalid token")
    ),
    tag = "Requests",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_requests(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(filters): Query<RequestFilterParams>,
) -> Result<Json<RequestsResponse>, AppError> {
    access::require_authenticated(state.store.as_ref(), auth_user.login()).await?;

    let requests = RequestService::find_requests(state.store.as_ref(), filters).await?;
    Ok(Json(requests))
}

#[utoipa::path(
    get,
    path = "/api/requests/{id}",
    params(
        ("id" = i32, Path, description = "Request ID")
    ),
    responses(
        (status = 200, description = "Request details", body = RequestResponse),
        (status = 400, description = "Request not found"),
        (status = 401, description = "Missing or invalid token")
    ),
    tag = "Requests",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_request(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<RequestId>,
) -> Result<Json<RequestResponse>, AppError> {
    access::require_authenticated(state.store.as_ref(), auth_user.login()).await?;

    let request = RequestService::find_request(state.store.as_ref(), id).await?;
    Ok(Json(request))
}

/// Open to administrators and to the managers of the request's classroom
/// or of that classroom's department.
#[utoipa::path(
    put,
    path = "/api/requests/{id}",
    params(
        ("id" = i32, Path, description = "Request ID")
    ),
    request_body = UpdateRequestDto,
    responses(
        (status = 200, description = "Request updated", body = RequestResponse),
        (status = 400, description = "Unknown relation or access denied"),
        (status = 401, description = "Missing or invalid token")
    ),
    tag = "Requests",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn update_request(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<RequestId>,
    JsonBody(dto): JsonBody<UpdateRequestDto>,
) -> Result<Json<RequestResponse>, AppError> {
    access::is_admin_or_manager_in_request(state.store.as_ref(), auth_user.login(), id).await?;

    let request = RequestService::update_request(state.store.as_ref(), id, dto).await?;
    Ok(Json(request))
}

#[utoipa::path(
    put,
    path = "/api/requests/{id}/approve",
    params(
        ("id" = i32, Path, description = "Request ID")
    ),
    request_body = ApproveRequestDto,
    responses(
        (status = 200, description = "Request approved", body = RequestResponse),
        (status = 400, description = "Unknown request or manager, or access denied"),
        (status = 401, description = "Missing or invalid token")
    ),
    tag = "Requests",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn approve_request(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<RequestId>,
    JsonBody(dto): JsonBody<ApproveRequestDto>,
) -> Result<Json<RequestResponse>, AppError> {
    access::is_admin_or_manager_in_request(state.store.as_ref(), auth_user.login(), id).await?;

    let request = RequestService::approve_request(state.store.as_ref(), id, dto).await?;
    Ok(Json(request))
}

#[utoipa::path(
    get,
    path = "/api/requests/all",
    responses(
        (status = 200, description = "All requests", body = RequestsResponse),
        (status = 400, description = "No requests exist")
    ),
    tag = "Requests"
)]
#[instrument(skip(state))]
pub async fn get_all_requests(
    State(state): State<AppState>,
) -> Result<Json<RequestsResponse>, AppError> {
    let requests = RequestService::find_all_requests(state.store.as_ref()).await?;
    Ok(Json(requests))
}
