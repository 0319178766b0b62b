pub mod auth_routes;
pub mod car_routes;
pub mod listing_routes;
pub mod prediction_routes;

use axum::Router;
use tower_http::trace::TraceLayer;

use crate::middleware::cors::cors_layer;
use crate::state::AppState;

/// Router completo de la aplicación
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(prediction_routes::prediction_routes())
        .merge(auth_routes::auth_form_routes())
        .nest("/api", listing_routes::listing_routes())
        .nest("/api/car", car_routes::car_routes())
        .nest("/api/auth", auth_routes::auth_routes(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&state.config))
        .with_state(state)
}
