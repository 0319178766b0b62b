use axum::{
    routing::{get, post},
    Router,
};

use crate::controllers::prediction_controller::{
    health, model_info, predict_form, predict_json, vehicle_info,
};
use crate::state::AppState;

/// Predicción, información de vehículos y estado del servicio
pub fn prediction_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/model-info", get(model_info))
        .route("/predict", post(predict_form))
        .route("/api/predict", post(predict_json))
        .route("/api/vehicle-info/:registration_number", get(vehicle_info))
}
