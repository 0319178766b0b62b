//! Controller del marketplace: navegación, búsqueda y estadísticas

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::Utc;

use crate::dto::listing_dto::{LimitQuery, ListingCollection, ListingFiltersQuery, ListingSummary};
use crate::dto::ApiResponse;
use crate::models::Listing;
use crate::services::marketplace_service::{MarketplaceStats, DEFAULT_FEATURED_LIMIT};
use crate::services::search_service::SortKey;
use crate::services::similarity_service::{ScoredListing, DEFAULT_SIMILAR_LIMIT};
use crate::state::AppState;
use crate::utils::errors::AppError;

fn summaries(listings: Vec<Listing>) -> ListingCollection<ListingSummary> {
    let now = Utc::now();
    ListingCollection::new(
        listings
            .into_iter()
            .map(|listing| ListingSummary::from_listing(listing, now))
            .collect(),
    )
}

/// GET /api/listings: mismos filtros que la búsqueda, más recientes primero por defecto
pub async fn list_listings(
    State(state): State<AppState>,
    Query(query): Query<ListingFiltersQuery>,
) -> Result<Json<ApiResponse<ListingCollection<ListingSummary>>>, AppError> {
    let mut filters = query.into_filters()?;
    filters.sort_by.get_or_insert(SortKey::Date);
    let listings = state.marketplace.search(&filters).await?;
    Ok(Json(ApiResponse::success(summaries(listings))))
}

/// GET /api/search
pub async fn search_listings(
    State(state): State<AppState>,
    Query(query): Query<ListingFiltersQuery>,
) -> Result<Json<ApiResponse<ListingCollection<ListingSummary>>>, AppError> {
    let filters = query.into_filters()?;
    let listings = state.marketplace.search(&filters).await?;
    Ok(Json(ApiResponse::success(summaries(listings))))
}

/// GET /api/listings/featured
pub async fn featured_listings(
    State(state): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<ApiResponse<ListingCollection<ListingSummary>>>, AppError> {
    let limit = query.limit.unwrap_or(DEFAULT_FEATURED_LIMIT);
    let listings = state.marketplace.featured(limit).await?;
    Ok(Json(ApiResponse::success(summaries(listings))))
}

/// GET /api/listings/:id (cuenta una vista)
pub async fn view_listing(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Listing>>, AppError> {
    let listing = state.marketplace.view_listing(&id).await?;
    Ok(Json(ApiResponse::success(listing)))
}

/// POST /api/listings/:id/favorite
pub async fn favorite_listing(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Listing>>, AppError> {
    let listing = state.marketplace.favorite_listing(&id).await?;
    Ok(Json(ApiResponse::success_with_message(listing, "Added to favorites")))
}

/// GET /api/listings/:id/similar
pub async fn similar_listings(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<ApiResponse<ListingCollection<ScoredListing>>>, AppError> {
    let limit = query.limit.unwrap_or(DEFAULT_SIMILAR_LIMIT);
    let similar = state.marketplace.similar(&id, limit).await?;
    Ok(Json(ApiResponse::success(ListingCollection::new(similar))))
}

/// GET /api/stats
pub async fn marketplace_stats(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<MarketplaceStats>>, AppError> {
    let stats = state.marketplace.stats().await?;
    Ok(Json(ApiResponse::success(stats)))
}

/// GET /api/brands
pub async fn list_brands(State(state): State<AppState>) -> Result<Json<ApiResponse<Vec<String>>>, AppError> {
    Ok(Json(ApiResponse::success(state.marketplace.distinct_brands().await?)))
}

/// GET /api/locations
pub async fn list_locations(State(state): State<AppState>) -> Result<Json<ApiResponse<Vec<String>>>, AppError> {
    Ok(Json(ApiResponse::success(state.marketplace.distinct_locations().await?)))
}
