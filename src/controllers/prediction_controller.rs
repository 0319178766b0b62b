//! Predicción de precios, información de vehículos y estado del servicio

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Form, Json,
};
use chrono::Utc;
use serde::Serialize;
use tracing::info;

use crate::dto::prediction_dto::{PredictionForm, PredictionRequest, PredictionResponse};
use crate::dto::ApiResponse;
use crate::services::price_predictor::{ModelInfo, PredictionInput, PricePredictor};
use crate::services::vehicle_info_service::{
    insurance_provider_count, states_covered, VehicleQuery, VehicleReport, SERVICE_CENTER_BRANDS,
};
use crate::state::AppState;
use crate::utils::errors::{bad_request_error, AppError};
use crate::utils::validation::validate_registration_number;

const MODEL_UNAVAILABLE: &str = "Prediction model is not loaded";

fn predictor(state: &AppState) -> Result<Arc<PricePredictor>, AppError> {
    state
        .predictor
        .clone()
        .ok_or_else(|| AppError::ServiceUnavailable(MODEL_UNAVAILABLE.to_string()))
}

fn predict(
    state: &AppState,
    input: PredictionInput,
    registration_number: Option<String>,
) -> Result<PredictionResponse, AppError> {
    let predictor = predictor(state)?;
    let estimate = predictor.predict(&input)?;

    let query = VehicleQuery {
        brand: input.brand.clone(),
        year: input.year,
        registration_number: registration_number.filter(|r| !r.trim().is_empty()),
        mileage: input.mileage,
        fuel: input.fuel.clone(),
    };
    let report = state.vehicle_info.vehicle_report(&query, Utc::now().date_naive());

    info!(
        "💰 Predicción {} {}: ₹{:.0} ({})",
        input.brand, input.year, estimate.price, report.registration_number
    );

    Ok(PredictionResponse::new(
        &input,
        estimate,
        predictor.version().to_string(),
        predictor.accuracy().map(str::to_string),
        report,
    ))
}

/// POST /api/predict
pub async fn predict_json(
    State(state): State<AppState>,
    Json(request): Json<PredictionRequest>,
) -> Result<Json<ApiResponse<PredictionResponse>>, AppError> {
    predictor(&state)?;
    let registration_number = request.registration_number.clone();
    let input = request.into_input()?;
    Ok(Json(ApiResponse::success(predict(&state, input, registration_number)?)))
}

/// POST /predict (formulario)
pub async fn predict_form(
    State(state): State<AppState>,
    Form(form): Form<PredictionForm>,
) -> Result<Json<ApiResponse<PredictionResponse>>, AppError> {
    predictor(&state)?;
    let registration_number = form.registration_number.clone();
    let input = form.into_input()?;
    Ok(Json(ApiResponse::success(predict(&state, input, registration_number)?)))
}

/// GET /api/vehicle-info/:registration_number
pub async fn vehicle_info(
    State(state): State<AppState>,
    Path(registration_number): Path<String>,
) -> Result<Json<ApiResponse<VehicleReport>>, AppError> {
    let registration_number = registration_number.trim().to_uppercase();
    validate_registration_number(&registration_number)
        .map_err(|_| bad_request_error("Invalid registration number"))?;

    let query = VehicleQuery::for_registration(&registration_number);
    let report = state.vehicle_info.vehicle_report(&query, Utc::now().date_naive());
    Ok(Json(ApiResponse::success(report)))
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub model_loaded: bool,
    pub listings: u64,
    pub timestamp: chrono::DateTime<Utc>,
    pub version: &'static str,
}

/// GET /health: `unhealthy` (503) si no hay modelo
pub async fn health(State(state): State<AppState>) -> Result<(StatusCode, Json<HealthResponse>), AppError> {
    let listings = state.marketplace.all_listings().await?.len() as u64;
    let model_loaded = state.model_loaded();
    let (status_code, status) = if model_loaded {
        (StatusCode::OK, "healthy")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "unhealthy")
    };

    Ok((
        status_code,
        Json(HealthResponse {
            status,
            model_loaded,
            listings,
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION"),
        }),
    ))
}

#[derive(Debug, Serialize)]
pub struct DatabaseInfo {
    pub states_covered: usize,
    pub insurance_providers: usize,
    pub service_centers: usize,
}

#[derive(Debug, Serialize)]
pub struct ModelInfoResponse {
    #[serde(flatten)]
    pub model: ModelInfo,
    pub database_info: DatabaseInfo,
}

/// GET /model-info
pub async fn model_info(State(state): State<AppState>) -> Result<Json<ApiResponse<ModelInfoResponse>>, AppError> {
    let predictor = predictor(&state)?;
    Ok(Json(ApiResponse::success(ModelInfoResponse {
        model: predictor.info(),
        database_info: DatabaseInfo {
            states_covered: states_covered(),
            insurance_providers: insurance_provider_count(),
            service_centers: SERVICE_CENTER_BRANDS.len(),
        },
    })))
}
