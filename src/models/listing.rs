//! Modelo de Listing
//!
//! Un anuncio de coche usado: los campos básicos que envía el vendedor más los
//! metadatos del marketplace que se generan al crear el anuncio.
//! Se persiste como documento JSON (colección `cars`).

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Año de referencia para edad del vehículo, garantía y condición
pub const REFERENCE_YEAR: i32 = 2024;

/// Estado comercial del anuncio
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum ListingStatus {
    #[default]
    Available,
    Pending,
    Sold,
}

impl ListingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListingStatus::Available => "available",
            ListingStatus::Pending => "pending",
            ListingStatus::Sold => "sold",
        }
    }
}

impl fmt::Display for ListingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ListingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "available" => Ok(ListingStatus::Available),
            "pending" => Ok(ListingStatus::Pending),
            "sold" => Ok(ListingStatus::Sold),
            other => Err(format!("Unknown listing status '{}'", other)),
        }
    }
}

/// Campos básicos de un coche, tal como los proporciona el vendedor
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewListing {
    pub brand: String,
    pub model: String,
    pub year: i32,
    pub fuel: String,
    pub km_driven: u32,
    pub price: i64,
    pub location: String,
    pub seller_type: String,
    pub transmission: String,
    #[serde(default)]
    pub status: ListingStatus,
}

impl NewListing {
    /// Edad del vehículo respecto al año de referencia (nunca negativa)
    pub fn age(&self) -> i32 {
        (REFERENCE_YEAR - self.year).max(0)
    }
}

/// Anuncio completo tal como se almacena
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Listing {
    pub id: String,
    pub brand: String,
    pub model: String,
    pub year: i32,
    pub fuel: String,
    pub km_driven: u32,
    pub price: i64,
    pub location: String,
    pub seller_type: String,
    pub transmission: String,
    #[serde(default)]
    pub status: ListingStatus,
    pub posted_date: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
    pub views: u64,
    pub favorites: u64,
    #[serde(flatten)]
    pub details: ListingDetails,
}

impl Listing {
    /// Combina los campos del vendedor con los detalles generados
    pub fn assemble(
        id: String,
        new: NewListing,
        generated: GeneratedListing,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            brand: new.brand,
            model: new.model,
            year: new.year,
            fuel: new.fuel,
            km_driven: new.km_driven,
            price: new.price,
            location: new.location,
            seller_type: new.seller_type,
            transmission: new.transmission,
            status: new.status,
            posted_date: now,
            last_updated: now,
            views: generated.views,
            favorites: generated.favorites,
            details: generated.details,
        }
    }

    /// Puntuación de popularidad usada por los anuncios destacados
    pub fn popularity(&self) -> u64 {
        self.views + self.favorites * 2
    }

    /// Aplica una actualización parcial (semántica merge). El id no cambia.
    pub fn apply_update(&mut self, update: &ListingUpdate, now: DateTime<Utc>) {
        if let Some(brand) = &update.brand {
            self.brand = brand.clone();
        }
        if let Some(model) = &update.model {
            self.model = model.clone();
        }
        if let Some(year) = update.year {
            self.year = year;
        }
        if let Some(fuel) = &update.fuel {
            self.fuel = fuel.clone();
        }
        if let Some(km) = update.km_driven {
            self.km_driven = km;
        }
        if let Some(price) = update.price {
            self.price = price;
        }
        if let Some(location) = &update.location {
            self.location = location.clone();
        }
        if let Some(seller_type) = &update.seller_type {
            self.seller_type = seller_type.clone();
        }
        if let Some(transmission) = &update.transmission {
            self.transmission = transmission.clone();
        }
        if let Some(status) = update.status {
            self.status = status;
        }
        if let Some(negotiable) = update.negotiable {
            self.details.negotiable = negotiable;
        }
        if let Some(features) = &update.features {
            self.details.features = features.clone();
        }
        self.last_updated = now;
    }
}

/// Actualización parcial de un anuncio (PUT /api/car/:id)
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ListingUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fuel: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub km_driven: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seller_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transmission: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ListingStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub negotiable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub features: Option<Vec<String>>,
}

impl ListingUpdate {
    pub fn is_empty(&self) -> bool {
        *self == ListingUpdate::default()
    }
}

/// Salida de un generador de detalles: contadores iniciales + detalles
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedListing {
    pub views: u64,
    pub favorites: u64,
    pub details: ListingDetails,
}

/// Metadatos del marketplace generados al crear el anuncio
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ListingDetails {
    pub seller_info: SellerInfo,
    pub car_details: CarDetails,
    pub images: Vec<String>,
    pub condition: ConditionReport,
    pub features: Vec<String>,
    pub inspection_report: InspectionReport,
    pub price_history: Vec<PricePoint>,
    pub contact_info: ContactInfo,
    pub availability: String,
    pub negotiable: bool,
    pub exchange_accepted: bool,
    pub loan_available: bool,
    pub warranty: Warranty,
    pub service_history: ServiceHistory,
    pub ownership_history: OwnershipHistory,
    pub registration_state: String,
    pub insurance_status: InsuranceStatus,
    pub rto_clearance: String,
    pub accident_history: Option<AccidentRecord>,
    pub modifications: Option<Modifications>,
    pub test_drive_available: bool,
    pub home_inspection: bool,
    pub urgent_sale: bool,
    pub reason_for_sale: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SellerInfo {
    pub name: String,
    pub rating: f64,
    pub total_listings: u32,
    pub member_since: i32,
    pub verified: bool,
    pub response_time_hours: u32,
    pub location_verified: bool,
    pub phone_verified: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_license: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub showroom_address: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CarDetails {
    pub engine_capacity_cc: u32,
    pub max_power_bhp: u32,
    pub max_torque_nm: u32,
    pub mileage_kmpl: u32,
    pub seats: u8,
    pub body_type: String,
    pub color: String,
    pub variant: String,
    pub ownership: String,
    pub registration_year: i32,
    pub chassis_number: String,
    pub engine_number: String,
}

/// Banda de condición según edad y kilometraje
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ConditionGrade {
    Excellent,
    Good,
    Fair,
    Average,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConditionReport {
    pub overall: ConditionGrade,
    pub score: u8,
    pub exterior: String,
    pub interior: String,
    pub engine: String,
    pub tires: String,
    pub battery: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InspectionReport {
    pub inspected: bool,
    pub inspection_date: NaiveDate,
    pub inspector: String,
    pub report_url: String,
    pub major_issues: u8,
    pub minor_issues: u8,
    pub overall_rating: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub price: i64,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContactInfo {
    pub phone: String,
    pub whatsapp_available: bool,
    pub email: String,
    pub preferred_contact: String,
    pub available_hours: String,
    pub call_preference: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Warranty {
    /// Meses restantes de garantía de fábrica; 0 si ha expirado
    pub manufacturer_months_remaining: u32,
    pub extended_warranty: bool,
    pub warranty_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServiceHistory {
    pub total_services: u32,
    pub last_service_date: NaiveDate,
    pub service_type: String,
    pub major_repairs: u8,
    pub service_records_available: bool,
    pub next_service_due: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OwnershipHistory {
    pub total_owners: u8,
    pub current_owner_years: u8,
    pub usage_type: String,
    pub driven_by: String,
    pub parking_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InsuranceStatus {
    pub valid_until: NaiveDate,
    pub insurance_type: String,
    pub claim_history: u8,
    pub no_claim_bonus_pct: u8,
    pub transferable: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AccidentRecord {
    pub total_accidents: u8,
    pub severity: String,
    pub last_accident_date: NaiveDate,
    pub insurance_claimed: bool,
    pub repaired_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Modifications {
    pub items: Vec<String>,
    pub cost: i64,
    pub professionally_done: bool,
}
