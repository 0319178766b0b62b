use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::services::price_predictor::{PredictionInput, PriceEstimate};
use crate::services::vehicle_info_service::VehicleReport;
use crate::utils::errors::{missing_field_error, AppError, AppResult};
use crate::utils::validation::validate_not_empty;

// Request JSON de POST /api/predict
#[derive(Debug, Default, Clone, Deserialize, Validate)]
pub struct PredictionRequest {
    #[validate(custom = "validate_not_empty")]
    pub brand: Option<String>,
    #[validate(range(min = 1990, max = 2024))]
    pub year: Option<i32>,
    #[validate(range(max = 10000000))]
    pub km_driven: Option<u64>,
    pub fuel: Option<String>,
    pub seller_type: Option<String>,
    pub transmission: Option<String>,
    pub owner: Option<String>,
    pub mileage: Option<f64>,
    pub engine: Option<f64>,
    pub max_power: Option<f64>,
    #[validate(range(min = 2, max = 10))]
    pub seats: Option<u32>,
    pub torque_value: Option<f64>,
    pub registration_number: Option<String>,
}

impl PredictionRequest {
    /// Los campos obligatorios se comprueban en orden para nombrar el primero que falta
    pub fn into_input(self) -> AppResult<PredictionInput> {
        self.validate()?;
        Ok(PredictionInput {
            brand: require("brand", self.brand)?,
            year: require("year", self.year)?,
            km_driven: require("km_driven", self.km_driven)?,
            fuel: require("fuel", self.fuel)?,
            seller_type: require("seller_type", self.seller_type)?,
            transmission: require("transmission", self.transmission)?,
            owner: require("owner", self.owner)?,
            mileage: require("mileage", self.mileage)?,
            engine: require("engine", self.engine)?,
            max_power: require("max_power", self.max_power)?,
            seats: require("seats", self.seats)?,
            torque_value: require("torque_value", self.torque_value)?,
        })
    }
}

fn require<T>(field: &str, value: Option<T>) -> AppResult<T> {
    value.ok_or_else(|| missing_field_error(field))
}

// Formulario de POST /predict: todo llega como texto
#[derive(Debug, Default, Clone, Deserialize)]
pub struct PredictionForm {
    pub brand: Option<String>,
    pub year: Option<String>,
    pub km_driven: Option<String>,
    pub fuel: Option<String>,
    pub seller_type: Option<String>,
    pub transmission: Option<String>,
    pub owner: Option<String>,
    pub mileage: Option<String>,
    pub engine: Option<String>,
    pub max_power: Option<String>,
    pub seats: Option<String>,
    pub torque_value: Option<String>,
    pub registration_number: Option<String>,
}

impl PredictionForm {
    pub fn into_input(self) -> AppResult<PredictionInput> {
        Ok(PredictionInput {
            brand: text("brand", self.brand)?,
            year: number("year", self.year)?,
            // "25,000" -> 25000
            km_driven: number("km_driven", self.km_driven.map(|v| v.replace(',', "")))?,
            fuel: text("fuel", self.fuel)?,
            seller_type: text("seller_type", self.seller_type)?,
            transmission: text("transmission", self.transmission)?,
            owner: text("owner", self.owner)?,
            mileage: number("mileage", self.mileage)?,
            engine: number("engine", self.engine)?,
            max_power: number("max_power", self.max_power)?,
            seats: number("seats", self.seats)?,
            torque_value: number("torque_value", self.torque_value)?,
        })
    }
}

fn text(field: &str, value: Option<String>) -> AppResult<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| missing_field_error(field))
}

fn number<T: std::str::FromStr>(field: &str, value: Option<String>) -> AppResult<T> {
    let raw = text(field, value)?;
    raw.parse::<T>().map_err(|_| {
        AppError::BadRequest(format!("Input validation error: invalid {} '{}'", field, raw))
    })
}

// Response de una predicción
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub predicted_price: f64,
    pub formatted_price: String,
    pub confidence_lower: f64,
    pub confidence_upper: f64,
    pub confidence_range: String,
    pub car_age: i32,
    pub depreciation_rate: i32,
    pub model_version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<String>,
    pub prediction_timestamp: DateTime<Utc>,
    pub real_time_info: VehicleReport,
}

impl PredictionResponse {
    pub fn new(
        input: &PredictionInput,
        estimate: PriceEstimate,
        model_version: String,
        accuracy: Option<String>,
        real_time_info: VehicleReport,
    ) -> Self {
        let car_age = input.car_age();
        Self {
            predicted_price: estimate.price,
            formatted_price: format!("₹{:.2}", estimate.price),
            confidence_lower: estimate.confidence_lower,
            confidence_upper: estimate.confidence_upper,
            confidence_range: estimate.confidence_range,
            car_age,
            depreciation_rate: (car_age * 8).max(0),
            model_version,
            accuracy,
            prediction_timestamp: Utc::now(),
            real_time_info,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> PredictionForm {
        PredictionForm {
            brand: Some("Maruti".into()),
            year: Some("2019".into()),
            km_driven: Some("25,000".into()),
            fuel: Some("Petrol".into()),
            seller_type: Some("Individual".into()),
            transmission: Some("Manual".into()),
            owner: Some("First Owner".into()),
            mileage: Some("21.4".into()),
            engine: Some("1197".into()),
            max_power: Some("82".into()),
            seats: Some("5".into()),
            torque_value: Some("113".into()),
            registration_number: None,
        }
    }

    #[test]
    fn test_form_parsing() {
        let input = form().into_input().unwrap();
        assert_eq!(input.km_driven, 25_000);
        assert_eq!(input.seats, 5);
        assert!((input.mileage - 21.4).abs() < f64::EPSILON);
    }

    #[test]
    fn test_form_missing_and_invalid() {
        let mut missing = form();
        missing.owner = None;
        match missing.into_input() {
            Err(AppError::BadRequest(msg)) => assert_eq!(msg, "Missing required field: owner"),
            other => panic!("unexpected: {:?}", other),
        }

        let mut invalid = form();
        invalid.engine = Some("big".into());
        assert!(matches!(invalid.into_input(), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn test_json_request_names_missing_field() {
        let request = PredictionRequest {
            brand: Some("Honda".into()),
            year: Some(2018),
            ..Default::default()
        };
        match request.into_input() {
            Err(AppError::BadRequest(msg)) => assert_eq!(msg, "Missing required field: km_driven"),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_json_request_range_validation() {
        let request = PredictionRequest {
            year: Some(1980),
            ..Default::default()
        };
        assert!(matches!(request.into_input(), Err(AppError::Validation(_))));
    }
}
