use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use super::controller::{create_user, get_all_users, get_user, get_user_by_login, update_user};

pub fn init_users_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_user))
        .route("/all", get(get_all_users))
        .route("/login/{login}", get(get_user_by_login))
        .route("/{id}", get(get_user).put(update_user))
}
