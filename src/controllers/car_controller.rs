//! Controller CRUD de `/api/car`

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use tracing::info;

use crate::dto::listing_dto::{
    CreateListingRequest, ListingCollection, ListingFiltersQuery, UpdateListingRequest,
};
use crate::dto::ApiResponse;
use crate::models::Listing;
use crate::state::AppState;
use crate::utils::errors::AppError;

/// GET /api/car (filtros opcionales, incluidos `year` y `status`)
pub async fn list_cars(
    State(state): State<AppState>,
    Query(query): Query<ListingFiltersQuery>,
) -> Result<Json<ApiResponse<ListingCollection<Listing>>>, AppError> {
    let filters = query.into_filters()?;
    let cars = state.marketplace.search(&filters).await?;
    Ok(Json(ApiResponse::success(ListingCollection::new(cars))))
}

/// POST /api/car
pub async fn create_car(
    State(state): State<AppState>,
    Json(request): Json<CreateListingRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Listing>>), AppError> {
    let new = request.into_new_listing()?;
    let car = state.marketplace.add_listing(new).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success_with_message(car, "Car added successfully")),
    ))
}

/// GET /api/car/:id (no cuenta vista)
pub async fn get_car(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Listing>>, AppError> {
    let car = state.marketplace.get_listing(&id).await?;
    Ok(Json(ApiResponse::success(car)))
}

/// PUT /api/car/:id
pub async fn update_car(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateListingRequest>,
) -> Result<Json<ApiResponse<Listing>>, AppError> {
    let update = request.into_update()?;
    let car = state.marketplace.update_listing(&id, &update).await?;
    Ok(Json(ApiResponse::success_with_message(car, "Car updated successfully")))
}

/// DELETE /api/car/:id
pub async fn delete_car(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    state.marketplace.delete_listing(&id).await?;
    Ok(Json(ApiResponse::message("Car deleted successfully")))
}

/// POST /api/car/seed
pub async fn seed_cars(State(state): State<AppState>) -> Result<Json<ApiResponse<usize>>, AppError> {
    let inserted = state.marketplace.seed_sample_data().await?;
    let message = if inserted == 0 {
        "Database already contains cars"
    } else {
        info!("🌱 Seed manual: {} anuncios", inserted);
        "Sample cars added"
    };
    Ok(Json(ApiResponse::success_with_message(inserted, message)))
}
