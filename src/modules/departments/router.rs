use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use super::controller::{
    create_department, get_all_departments, get_department, get_departments_by_code_name,
    update_department,
};

pub fn init_departments_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_department).get(get_departments_by_code_name))
        .route("/all", get(get_all_departments))
        .route("/{id}", get(get_department).put(update_department))
}
