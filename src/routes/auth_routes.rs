use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use crate::controllers::auth_controller::{
    change_password, current_user, login_form, login_json, register_form, register_json,
};
use crate::middleware::auth::auth_middleware;
use crate::state::AppState;

/// Rutas JSON de autenticación (bajo `/api/auth`)
pub fn auth_routes(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/password", put(change_password))
        .route("/me", get(current_user))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware));

    Router::new()
        .route("/register", post(register_json))
        .route("/login", post(login_json))
        .merge(protected)
}

/// Formularios de registro y login en la raíz
pub fn auth_form_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register_form))
        .route("/login", post(login_form))
}
