//! Predicción de precios
//!
//! Carga un artefacto JSON (modelo lineal + codificadores de etiquetas +
//! lista ordenada de columnas), transforma la entrada cruda en un vector de
//! características y devuelve una estimación con una banda de ±15%.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::models::REFERENCE_YEAR;
use crate::utils::format::format_rupees;

const CONFIDENCE_LOWER: f64 = 0.85;
const CONFIDENCE_UPPER: f64 = 1.15;

/// Columnas categóricas que se codifican como `<col>_encoded`
pub const CATEGORICAL_COLUMNS: [&str; 5] = ["brand", "fuel", "seller_type", "transmission", "owner"];

/// Errores de la transformación de entrada / inferencia
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PredictionError {
    #[error("Unknown {field} value: {value}")]
    UnknownCategory { field: String, value: String },

    #[error("Encoder not available for {0}")]
    MissingEncoder(String),

    #[error("Missing feature column: {0}")]
    MissingFeature(String),

    #[error("Input validation error: {0}")]
    InvalidInput(String),
}

/// Errores al cargar el artefacto del modelo
#[derive(Debug, Error)]
pub enum ModelLoadError {
    #[error("Model file not found or unreadable: {0}")]
    Io(#[from] std::io::Error),

    #[error("Model file is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid model artifact: {0}")]
    Invalid(String),
}

/// Artefacto serializado en disco
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub model_type: String,
    pub version: String,
    pub intercept: f64,
    pub coefficients: HashMap<String, f64>,
    pub encoders: HashMap<String, Vec<String>>,
    pub feature_columns: Vec<String>,
    #[serde(default)]
    pub accuracy: Option<String>,
}

/// Codificador de etiquetas: índice de la clase en la lista ordenada
#[derive(Debug, Clone)]
pub struct LabelEncoder {
    classes: Vec<String>,
}

impl LabelEncoder {
    pub fn new(classes: Vec<String>) -> Self {
        Self { classes }
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn transform(&self, field: &str, value: &str) -> Result<f64, PredictionError> {
        self.classes
            .iter()
            .position(|class| class == value)
            .map(|index| index as f64)
            .ok_or_else(|| PredictionError::UnknownCategory {
                field: field.to_string(),
                value: value.to_string(),
            })
    }
}

/// Modelo de regresión sobre un vector ya ordenado
pub trait PriceModel: Send + Sync {
    fn model_type(&self) -> &str;
    fn predict(&self, features: &[f64]) -> f64;
}

/// Regresión lineal: intercept + Σ wᵢ·xᵢ
#[derive(Debug, Clone)]
pub struct LinearModel {
    model_type: String,
    intercept: f64,
    weights: Vec<f64>,
}

impl LinearModel {
    pub fn new(model_type: impl Into<String>, intercept: f64, weights: Vec<f64>) -> Self {
        Self {
            model_type: model_type.into(),
            intercept,
            weights,
        }
    }
}

impl PriceModel for LinearModel {
    fn model_type(&self) -> &str {
        &self.model_type
    }

    fn predict(&self, features: &[f64]) -> f64 {
        self.intercept
            + self
                .weights
                .iter()
                .zip(features)
                .map(|(w, x)| w * x)
                .sum::<f64>()
    }
}

/// Entrada cruda de una predicción
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PredictionInput {
    pub brand: String,
    pub year: i32,
    pub km_driven: u64,
    pub fuel: String,
    pub seller_type: String,
    pub transmission: String,
    pub owner: String,
    pub mileage: f64,
    pub engine: f64,
    pub max_power: f64,
    pub seats: u32,
    pub torque_value: f64,
}

impl PredictionInput {
    /// Reglas de entrada del formulario de predicción
    pub fn validate(&self) -> Result<(), PredictionError> {
        let required = [
            &self.brand,
            &self.fuel,
            &self.seller_type,
            &self.transmission,
            &self.owner,
        ];
        if required.iter().any(|value| value.trim().is_empty()) {
            return Err(PredictionError::InvalidInput("Missing required fields".to_string()));
        }
        if !(1990..=REFERENCE_YEAR).contains(&self.year) {
            return Err(PredictionError::InvalidInput(format!(
                "Year must be between 1990 and {}",
                REFERENCE_YEAR
            )));
        }
        if self.km_driven > 10_000_000 {
            return Err(PredictionError::InvalidInput("Invalid kilometer reading".to_string()));
        }
        if self.mileage <= 0.0 || self.engine <= 0.0 || self.max_power <= 0.0 {
            return Err(PredictionError::InvalidInput(
                "Technical specifications must be positive".to_string(),
            ));
        }
        if !(2..=10).contains(&self.seats) {
            return Err(PredictionError::InvalidInput("Seats must be between 2 and 10".to_string()));
        }
        Ok(())
    }

    pub fn car_age(&self) -> i32 {
        REFERENCE_YEAR - self.year
    }

    fn category(&self, column: &str) -> Option<&str> {
        match column {
            "brand" => Some(self.brand.as_str()),
            "fuel" => Some(self.fuel.as_str()),
            "seller_type" => Some(self.seller_type.as_str()),
            "transmission" => Some(self.transmission.as_str()),
            "owner" => Some(self.owner.as_str()),
            _ => None,
        }
    }
}

/// Estimación con banda de confianza
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PriceEstimate {
    pub price: f64,
    pub confidence_lower: f64,
    pub confidence_upper: f64,
    pub confidence_range: String,
}

impl PriceEstimate {
    pub fn from_price(price: f64) -> Self {
        let confidence_lower = price * CONFIDENCE_LOWER;
        let confidence_upper = price * CONFIDENCE_UPPER;
        Self {
            price,
            confidence_lower,
            confidence_upper,
            confidence_range: format!(
                "{} - {}",
                format_rupees(confidence_lower),
                format_rupees(confidence_upper)
            ),
        }
    }
}

/// Información del modelo cargado (GET /model-info)
#[derive(Debug, Clone, Serialize)]
pub struct ModelInfo {
    pub model_type: String,
    pub version: String,
    pub accuracy: Option<String>,
    pub feature_count: usize,
    pub features: Vec<String>,
    pub available_encoders: Vec<String>,
    pub supported_brands: Vec<String>,
}

/// Predictor: modelo + codificadores + orden de columnas
pub struct PricePredictor {
    model: Box<dyn PriceModel>,
    encoders: HashMap<String, LabelEncoder>,
    feature_columns: Vec<String>,
    version: String,
    accuracy: Option<String>,
}

impl PricePredictor {
    pub fn new(
        model: Box<dyn PriceModel>,
        encoders: HashMap<String, LabelEncoder>,
        feature_columns: Vec<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            model,
            encoders,
            feature_columns,
            version: version.into(),
            accuracy: None,
        }
    }

    /// Cargar el artefacto desde disco
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ModelLoadError> {
        let path = path.as_ref();
        debug!("Leyendo artefacto de modelo: {}", path.display());

        let raw = std::fs::read_to_string(path)?;
        let artifact: ModelArtifact = serde_json::from_str(&raw)?;
        let predictor = Self::from_artifact(artifact)?;

        info!(
            "✅ Modelo {} v{} cargado ({} características)",
            predictor.model.model_type(),
            predictor.version,
            predictor.feature_columns.len()
        );
        Ok(predictor)
    }

    pub fn from_artifact(artifact: ModelArtifact) -> Result<Self, ModelLoadError> {
        if artifact.feature_columns.is_empty() {
            return Err(ModelLoadError::Invalid("feature_columns is empty".to_string()));
        }

        let weights = artifact
            .feature_columns
            .iter()
            .map(|column| {
                artifact.coefficients.get(column).copied().ok_or_else(|| {
                    ModelLoadError::Invalid(format!("No coefficient for feature '{}'", column))
                })
            })
            .collect::<Result<Vec<f64>, _>>()?;

        let encoders = artifact
            .encoders
            .into_iter()
            .map(|(column, classes)| (column, LabelEncoder::new(classes)))
            .collect();

        let model = LinearModel::new(artifact.model_type, artifact.intercept, weights);
        let mut predictor = Self::new(Box::new(model), encoders, artifact.feature_columns, artifact.version);
        predictor.accuracy = artifact.accuracy;
        Ok(predictor)
    }

    /// Construye el vector de características en el orden de `feature_columns`
    pub fn build_features(&self, input: &PredictionInput) -> Result<Vec<f64>, PredictionError> {
        let mut values: HashMap<String, f64> = HashMap::from([
            ("year".to_string(), input.year as f64),
            ("km_driven".to_string(), input.km_driven as f64),
            ("mileage".to_string(), input.mileage),
            ("engine".to_string(), input.engine),
            ("max_power".to_string(), input.max_power),
            ("seats".to_string(), input.seats as f64),
            ("torque_value".to_string(), input.torque_value),
            ("car_age".to_string(), input.car_age() as f64),
            (
                "power_to_weight".to_string(),
                finite_or_zero(input.max_power / input.engine * 1000.0),
            ),
            (
                "mileage_efficiency".to_string(),
                finite_or_zero(input.mileage / input.engine * 1000.0),
            ),
        ]);

        for column in CATEGORICAL_COLUMNS {
            let encoder = self
                .encoders
                .get(column)
                .ok_or_else(|| PredictionError::MissingEncoder(column.to_string()))?;
            let value = input.category(column).unwrap_or_default();
            values.insert(format!("{}_encoded", column), encoder.transform(column, value)?);
        }

        self.feature_columns
            .iter()
            .map(|column| {
                values
                    .get(column)
                    .copied()
                    .ok_or_else(|| PredictionError::MissingFeature(column.clone()))
            })
            .collect()
    }

    pub fn predict(&self, input: &PredictionInput) -> Result<PriceEstimate, PredictionError> {
        input.validate()?;
        let features = self.build_features(input)?;
        let price = self.model.predict(&features);
        debug!("Predicción {} {} -> {:.0}", input.brand, input.year, price);
        Ok(PriceEstimate::from_price(price))
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn accuracy(&self) -> Option<&str> {
        self.accuracy.as_deref()
    }

    pub fn info(&self) -> ModelInfo {
        let mut available_encoders: Vec<String> = self.encoders.keys().cloned().collect();
        available_encoders.sort();

        ModelInfo {
            model_type: self.model.model_type().to_string(),
            version: self.version.clone(),
            accuracy: self.accuracy.clone(),
            feature_count: self.feature_columns.len(),
            features: self.feature_columns.clone(),
            available_encoders,
            supported_brands: self
                .encoders
                .get("brand")
                .map(|encoder| encoder.classes().to_vec())
                .unwrap_or_default(),
        }
    }
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn artifact() -> ModelArtifact {
        let columns = [
            "car_age",
            "km_driven",
            "max_power",
            "power_to_weight",
            "brand_encoded",
            "fuel_encoded",
            "seller_type_encoded",
            "transmission_encoded",
            "owner_encoded",
        ];
        let coefficients = HashMap::from([
            ("car_age".to_string(), -10_000.0),
            ("km_driven".to_string(), -1.0),
            ("max_power".to_string(), 5_000.0),
            ("power_to_weight".to_string(), 0.0),
            ("brand_encoded".to_string(), 100_000.0),
            ("fuel_encoded".to_string(), 0.0),
            ("seller_type_encoded".to_string(), 0.0),
            ("transmission_encoded".to_string(), 0.0),
            ("owner_encoded".to_string(), 0.0),
        ]);
        let classes = |values: &[&str]| values.iter().map(|v| v.to_string()).collect::<Vec<_>>();
        let encoders = HashMap::from([
            ("brand".to_string(), classes(&["Honda", "Maruti"])),
            ("fuel".to_string(), classes(&["Diesel", "Petrol"])),
            ("seller_type".to_string(), classes(&["Dealer", "Individual"])),
            ("transmission".to_string(), classes(&["Automatic", "Manual"])),
            ("owner".to_string(), classes(&["First Owner", "Second Owner"])),
        ]);

        ModelArtifact {
            model_type: "LinearRegression".to_string(),
            version: "test".to_string(),
            intercept: 200_000.0,
            coefficients,
            encoders,
            feature_columns: columns.iter().map(|c| c.to_string()).collect(),
            accuracy: None,
        }
    }

    fn input() -> PredictionInput {
        PredictionInput {
            brand: "Maruti".to_string(),
            year: 2020,
            km_driven: 25_000,
            fuel: "Petrol".to_string(),
            seller_type: "Individual".to_string(),
            transmission: "Manual".to_string(),
            owner: "First Owner".to_string(),
            mileage: 21.0,
            engine: 1197.0,
            max_power: 82.0,
            seats: 5,
            torque_value: 113.0,
        }
    }

    #[test]
    fn test_prediction_and_band() {
        let predictor = PricePredictor::from_artifact(artifact()).unwrap();
        let estimate = predictor.predict(&input()).unwrap();

        // 200000 - 4·10000 - 25000 + 82·5000 + 1·100000
        assert!((estimate.price - 645_000.0).abs() < 1e-6);
        assert!((estimate.confidence_lower - 548_250.0).abs() < 1e-6);
        assert!((estimate.confidence_upper - 741_750.0).abs() < 1e-6);
        assert_eq!(estimate.confidence_range, "₹548,250 - ₹741,750");
    }

    #[test]
    fn test_feature_vector_order() {
        let predictor = PricePredictor::from_artifact(artifact()).unwrap();
        let features = predictor.build_features(&input()).unwrap();
        assert_eq!(features.len(), 9);
        assert_eq!(features[0], 4.0);
        assert_eq!(features[1], 25_000.0);
        assert!((features[3] - 82.0 / 1197.0 * 1000.0).abs() < 1e-9);
        assert_eq!(&features[4..], &[1.0, 1.0, 1.0, 1.0, 0.0]);
    }

    #[test]
    fn test_unknown_category_is_typed_error() {
        let predictor = PricePredictor::from_artifact(artifact()).unwrap();
        let mut unknown = input();
        unknown.brand = "Trabant".to_string();

        let err = predictor.predict(&unknown).unwrap_err();
        assert_eq!(
            err,
            PredictionError::UnknownCategory {
                field: "brand".to_string(),
                value: "Trabant".to_string()
            }
        );
        assert_eq!(err.to_string(), "Unknown brand value: Trabant");
    }

    #[test]
    fn test_missing_encoder_and_feature() {
        let mut no_owner = artifact();
        no_owner.encoders.remove("owner");
        let predictor = PricePredictor::from_artifact(no_owner).unwrap();
        assert_eq!(
            predictor.build_features(&input()),
            Err(PredictionError::MissingEncoder("owner".to_string()))
        );

        let mut extra = artifact();
        extra.feature_columns.push("wheelbase".to_string());
        extra.coefficients.insert("wheelbase".to_string(), 1.0);
        let predictor = PricePredictor::from_artifact(extra).unwrap();
        assert_eq!(
            predictor.build_features(&input()),
            Err(PredictionError::MissingFeature("wheelbase".to_string()))
        );
    }

    #[test]
    fn test_missing_coefficient_rejects_artifact() {
        let mut broken = artifact();
        broken.coefficients.remove("car_age");
        assert!(matches!(
            PricePredictor::from_artifact(broken),
            Err(ModelLoadError::Invalid(_))
        ));
    }

    #[test]
    fn test_input_validation() {
        let mut bad = input();
        bad.year = 1985;
        assert!(matches!(bad.validate(), Err(PredictionError::InvalidInput(_))));

        let mut bad = input();
        bad.seats = 12;
        assert!(bad.validate().is_err());

        let mut bad = input();
        bad.engine = 0.0;
        assert!(bad.validate().is_err());

        let mut bad = input();
        bad.km_driven = 10_000_001;
        assert!(bad.validate().is_err());

        assert!(input().validate().is_ok());
    }

    #[test]
    fn test_zero_engine_features_are_zeroed() {
        assert_eq!(finite_or_zero(82.0 / 0.0), 0.0);
        assert_eq!(finite_or_zero(f64::NAN), 0.0);
    }

    #[test]
    fn test_load_missing_file() {
        assert!(matches!(
            PricePredictor::load("does/not/exist.json"),
            Err(ModelLoadError::Io(_))
        ));
    }
}
