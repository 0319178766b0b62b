use axum::{
    routing::{get, post},
    Router,
};

use crate::controllers::listing_controller::{
    favorite_listing, featured_listings, list_brands, list_listings, list_locations,
    marketplace_stats, search_listings, similar_listings, view_listing,
};
use crate::state::AppState;

/// Rutas de navegación del marketplace (bajo `/api`)
pub fn listing_routes() -> Router<AppState> {
    Router::new()
        .route("/listings", get(list_listings))
        .route("/listings/featured", get(featured_listings))
        .route("/listings/:id", get(view_listing))
        .route("/listings/:id/favorite", post(favorite_listing))
        .route("/listings/:id/similar", get(similar_listings))
        .route("/search", get(search_listings))
        .route("/stats", get(marketplace_stats))
        .route("/brands", get(list_brands))
        .route("/locations", get(list_locations))
}
