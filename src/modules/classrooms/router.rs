use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use super::controller::{
    create_classroom, get_all_classrooms, get_all_non_private_classrooms, get_classroom,
    update_classroom,
};

pub fn init_classrooms_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_classroom))
        .route("/all", get(get_all_classrooms))
        .route("/all/non-private", get(get_all_non_private_classrooms))
        .route("/{id}", get(get_classroom).put(update_classroom))
}
