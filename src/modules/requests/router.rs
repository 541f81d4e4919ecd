use axum::{
    Router,
    routing::{get, put},
};

use crate::state::AppState;

use super::controller::{
    approve_request, create_request, get_all_requests, get_request, get_requests, update_request,
};

pub fn init_requests_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_requests).post(create_request))
        .route("/all", get(get_all_requests))
        .route("/{id}", get(get_request).put(update_request))
        .route("/{id}/approve", put(approve_request))
}
