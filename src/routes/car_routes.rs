use axum::{
    routing::{get, post},
    Router,
};

use crate::controllers::car_controller::{
    create_car, delete_car, get_car, list_cars, seed_cars, update_car,
};
use crate::state::AppState;

/// CRUD de coches (bajo `/api/car`)
pub fn car_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_cars).post(create_car))
        .route("/seed", post(seed_cars))
        .route("/:id", get(get_car).put(update_car).delete(delete_car))
}
