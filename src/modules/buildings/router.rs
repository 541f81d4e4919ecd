use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use super::controller::{
    create_building, get_all_buildings, get_building, get_buildings_by_name, update_building,
};

pub fn init_buildings_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_building).get(get_buildings_by_name))
        .route("/all", get(get_all_buildings))
        .route("/{id}", get(get_building).put(update_building))
}
