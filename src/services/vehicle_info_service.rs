//! Información de vehículo y cumplimiento documental
//!
//! Simula el estado de seguro, PUC, RC y certificado de aptitud de un
//! vehículo a partir de su matrícula, calcula alertas, puntuación de
//! cumplimiento y coste mensual de propiedad. Las fechas simuladas salen de
//! un RNG inyectable.

use std::sync::Mutex;

use chrono::{Duration, NaiveDate};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::models::REFERENCE_YEAR;

/// Consumo de un eléctrico en kWh cada 100 km
const ELECTRIC_KWH_PER_100KM: f64 = 15.0;
pub const DEFAULT_MONTHLY_KM: f64 = 1000.0;

const REGISTRATION_PATTERNS: [(&str, &str); 20] = [
    ("DL", "Delhi"),
    ("MH", "Maharashtra"),
    ("KA", "Karnataka"),
    ("TN", "Tamil Nadu"),
    ("UP", "Uttar Pradesh"),
    ("GJ", "Gujarat"),
    ("RJ", "Rajasthan"),
    ("WB", "West Bengal"),
    ("AP", "Andhra Pradesh"),
    ("HR", "Haryana"),
    ("PB", "Punjab"),
    ("OR", "Odisha"),
    ("AS", "Assam"),
    ("BR", "Bihar"),
    ("CG", "Chhattisgarh"),
    ("GA", "Goa"),
    ("HP", "Himachal Pradesh"),
    ("JH", "Jharkhand"),
    ("KL", "Kerala"),
    ("MP", "Madhya Pradesh"),
];

const INSURANCE_PROVIDERS: [&str; 15] = [
    "ICICI Lombard",
    "HDFC ERGO",
    "Bajaj Allianz",
    "IFFCO Tokio",
    "New India Assurance",
    "Oriental Insurance",
    "United India Insurance",
    "National Insurance",
    "Reliance General",
    "Royal Sundaram",
    "SBI General",
    "Tata AIG",
    "Future Generali",
    "Cholamandalam MS",
    "Liberty General",
];

const LUXURY_BRANDS: [&str; 3] = ["BMW", "Audi", "Mercedes-Benz"];

pub fn states_covered() -> usize {
    REGISTRATION_PATTERNS.len()
}

pub fn insurance_provider_count() -> usize {
    INSURANCE_PROVIDERS.len()
}

/// Marcas con red de talleres propia
pub const SERVICE_CENTER_BRANDS: [&str; 10] = [
    "Maruti",
    "Hyundai",
    "Honda",
    "Toyota",
    "BMW",
    "Audi",
    "Mercedes-Benz",
    "Tata",
    "Mahindra",
    "Ford",
];

/// Talleres oficiales por marca
pub fn service_centers(brand: &str) -> &'static [&'static str] {
    match brand {
        "Maruti" => &[
            "Maruti Service Center - Sector 18",
            "Maruti Care - MG Road",
            "Maruti Authorized - Whitefield",
        ],
        "Hyundai" => &[
            "Hyundai Service - Whitefield",
            "Hyundai Care - Koramangala",
            "Hyundai Authorized - Electronic City",
        ],
        "Honda" => &[
            "Honda Service Center - Electronic City",
            "Honda Care - Indiranagar",
            "Honda Authorized - Jayanagar",
        ],
        "Toyota" => &[
            "Toyota Service - Bommanahalli",
            "Toyota Care - Jayanagar",
            "Toyota Authorized - Whitefield",
        ],
        "BMW" => &[
            "BMW Service Center - Embassy Golf Links",
            "BMW Authorized - Whitefield",
            "BMW Premium - Koramangala",
        ],
        "Audi" => &[
            "Audi Service Center - Koramangala",
            "Audi Authorized - Electronic City",
            "Audi Premium - MG Road",
        ],
        "Mercedes-Benz" => &["Mercedes Service - Whitefield", "Mercedes Authorized - Koramangala"],
        "Tata" => &["Tata Service Center - Electronic City", "Tata Authorized - Jayanagar"],
        "Mahindra" => &["Mahindra Service - Whitefield", "Mahindra Care - Bommanahalli"],
        "Ford" => &["Ford Service Center - Electronic City", "Ford Authorized - Koramangala"],
        _ => &["Generic Service Center - Local Area"],
    }
}

/// Estado a partir del prefijo de dos letras de la matrícula
pub fn registration_state(registration_number: &str) -> Option<&'static str> {
    let code = registration_number.get(..2)?.to_uppercase();
    REGISTRATION_PATTERNS
        .iter()
        .find(|(prefix, _)| *prefix == code)
        .map(|(_, state)| *state)
}

/// Precio y unidad del combustible
pub fn fuel_price(fuel: &str) -> (f64, &'static str) {
    match fuel {
        "Petrol" => (102.84, "₹/L"),
        "Diesel" => (94.65, "₹/L"),
        "CNG" => (75.50, "₹/kg"),
        "LPG" => (85.20, "₹/L"),
        "Electric" => (8.50, "₹/kWh"),
        _ => (100.0, "₹/L"),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FuelCost {
    pub monthly_cost: f64,
    pub yearly_cost: f64,
    pub cost_per_km: f64,
    pub fuel_price: f64,
    pub fuel_unit: String,
}

/// Coste de combustible. Un rendimiento o kilometraje nulo aporta 0.
pub fn calculate_fuel_cost(fuel: &str, mileage: f64, monthly_km: f64) -> FuelCost {
    let (price, unit) = fuel_price(fuel);

    let monthly_cost = if fuel == "Electric" {
        (monthly_km / 100.0) * ELECTRIC_KWH_PER_100KM * price
    } else if mileage > 0.0 {
        (monthly_km / mileage) * price
    } else {
        0.0
    };
    let monthly_cost = if monthly_cost.is_finite() { monthly_cost.max(0.0) } else { 0.0 };

    let cost_per_km = if monthly_km > 0.0 { monthly_cost / monthly_km } else { 0.0 };

    FuelCost {
        monthly_cost: round2(monthly_cost),
        yearly_cost: round2(monthly_cost * 12.0),
        cost_per_km: round2(cost_per_km),
        fuel_price: price,
        fuel_unit: unit.to_string(),
    }
}

/// Qué documentos han caducado
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExpiredDocuments {
    pub insurance: bool,
    pub puc: bool,
    pub rc: bool,
    pub fitness: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ComplianceStatus {
    #[serde(rename = "Fully Compliant")]
    FullyCompliant,
    #[serde(rename = "Partially Compliant")]
    PartiallyCompliant,
    #[serde(rename = "Non-Compliant")]
    NonCompliant,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AlertKind {
    Critical,
    Warning,
    Success,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Alert {
    #[serde(rename = "type")]
    pub kind: AlertKind,
    pub priority: u8,
    pub title: String,
    pub message: String,
    pub action: String,
    pub estimated_cost: String,
}

impl Alert {
    fn new(kind: AlertKind, priority: u8, title: &str, message: String, action: &str, cost: &str) -> Self {
        Self {
            kind,
            priority,
            title: title.to_string(),
            message,
            action: action.to_string(),
            estimated_cost: cost.to_string(),
        }
    }
}

impl ExpiredDocuments {
    pub fn count(&self) -> usize {
        [self.insurance, self.puc, self.rc, self.fitness]
            .iter()
            .filter(|expired| **expired)
            .count()
    }

    /// 100 − 40 seguro − 25 PUC − 30 RC − 15 aptitud, mínimo 0
    pub fn compliance_score(&self) -> u8 {
        let mut score: i32 = 100;
        if self.insurance {
            score -= 40;
        }
        if self.puc {
            score -= 25;
        }
        if self.rc {
            score -= 30;
        }
        if self.fitness {
            score -= 15;
        }
        score.max(0) as u8
    }

    pub fn overall_status(&self) -> ComplianceStatus {
        match self.count() {
            0 => ComplianceStatus::FullyCompliant,
            1..=2 => ComplianceStatus::PartiallyCompliant,
            _ => ComplianceStatus::NonCompliant,
        }
    }

    /// Alertas ordenadas por prioridad (críticas primero)
    pub fn alerts(&self, days_to_insurance: i64, days_to_puc: i64) -> Vec<Alert> {
        let mut alerts = Vec::new();

        if self.insurance {
            alerts.push(Alert::new(
                AlertKind::Critical,
                1,
                "Insurance Expired - Immediate Action Required",
                "Driving without insurance is illegal. You may face penalties up to ₹2,000 and vehicle seizure.".to_string(),
                "Renew insurance immediately",
                "₹15,000 - ₹50,000",
            ));
        } else if days_to_insurance <= 30 {
            alerts.push(Alert::new(
                AlertKind::Warning,
                2,
                "Insurance Expiring Soon",
                format!(
                    "Your insurance expires in {} days. Start renewal to avoid penalties.",
                    days_to_insurance
                ),
                "Initiate renewal process",
                "₹12,000 - ₹45,000",
            ));
        }

        if self.puc {
            alerts.push(Alert::new(
                AlertKind::Critical,
                1,
                "PUC Certificate Expired",
                "Expired PUC can result in fines up to ₹1,000. Required for insurance claims.".to_string(),
                "Get PUC test done immediately",
                "₹150",
            ));
        } else if days_to_puc <= 15 {
            alerts.push(Alert::new(
                AlertKind::Warning,
                2,
                "PUC Expiring Soon",
                format!(
                    "PUC expires in {} days. Book appointment to avoid last-minute rush.",
                    days_to_puc
                ),
                "Schedule PUC test",
                "₹150",
            ));
        }

        if self.rc {
            alerts.push(Alert::new(
                AlertKind::Critical,
                1,
                "Registration Certificate Expired",
                "Expired RC is a serious offense. Vehicle cannot be legally driven.".to_string(),
                "Visit RTO immediately for renewal",
                "₹1,000 - ₹5,000",
            ));
        }

        if self.fitness {
            alerts.push(Alert::new(
                AlertKind::Critical,
                1,
                "Fitness Certificate Expired",
                "Required for vehicles over 15 years. Mandatory for legal operation.".to_string(),
                "Get fitness certificate from RTO",
                "₹500 - ₹2,000",
            ));
        }

        if alerts.is_empty() {
            alerts.push(Alert::new(
                AlertKind::Success,
                0,
                "All Documents Valid",
                "Your vehicle is fully compliant with all regulations.".to_string(),
                "Maintain regular checks",
                "No immediate costs",
            ));
        }

        alerts.sort_by_key(|alert| alert.priority);
        alerts
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsuranceInfo {
    pub provider: String,
    pub policy_number: String,
    pub start_date: NaiveDate,
    pub expiry_date: NaiveDate,
    pub expired: bool,
    pub days_remaining: i64,
    pub status: String,
    pub premium_estimate: f64,
    pub coverage_type: String,
    pub idv: i64,
    pub no_claim_bonus_pct: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PucInfo {
    pub certificate_number: String,
    pub issue_date: NaiveDate,
    pub expiry_date: NaiveDate,
    pub expired: bool,
    pub days_remaining: i64,
    pub status: String,
    pub testing_center: String,
    pub emission_standard: String,
    pub fee: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrationInfo {
    pub rc_number: String,
    pub issue_date: NaiveDate,
    pub validity_date: NaiveDate,
    pub expired: bool,
    pub days_remaining: i64,
    pub status: String,
    pub rto_office: String,
    pub vehicle_class: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitnessInfo {
    pub required: bool,
    pub certificate_number: Option<String>,
    pub expiry_date: Option<NaiveDate>,
    pub expired: bool,
    pub days_remaining: i64,
    pub status: String,
    pub fee: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceInfo {
    pub last_service_date: NaiveDate,
    pub next_service_due: NaiveDate,
    pub service_centers: Vec<String>,
    pub total_services: u32,
    pub service_cost_estimate: f64,
    pub service_interval: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OwnershipCost {
    pub monthly_insurance: f64,
    pub monthly_fuel: f64,
    pub monthly_service: f64,
    pub total_monthly: f64,
}

impl OwnershipCost {
    pub fn new(yearly_premium: f64, fuel: &FuelCost, service_cost: f64) -> Self {
        let monthly_insurance = yearly_premium / 12.0;
        let monthly_service = service_cost / 6.0;
        Self {
            monthly_insurance: monthly_insurance.round(),
            monthly_fuel: fuel.monthly_cost.round(),
            monthly_service: monthly_service.round(),
            total_monthly: (monthly_insurance + fuel.monthly_cost + monthly_service).round(),
        }
    }
}

/// Informe completo de un vehículo
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleReport {
    pub registration_number: String,
    pub state: String,
    pub state_code: String,
    pub insurance: InsuranceInfo,
    pub puc: PucInfo,
    pub registration: RegistrationInfo,
    pub fitness: FitnessInfo,
    pub service: ServiceInfo,
    pub fuel_analysis: FuelCost,
    pub ownership_cost: OwnershipCost,
    pub alerts: Vec<Alert>,
    pub overall_status: ComplianceStatus,
    pub compliance_score: u8,
}

/// Datos de entrada del informe
#[derive(Debug, Clone)]
pub struct VehicleQuery {
    pub brand: String,
    pub year: i32,
    pub registration_number: Option<String>,
    pub mileage: f64,
    pub fuel: String,
}

impl VehicleQuery {
    /// Consulta por matrícula con los valores por defecto del endpoint público
    pub fn for_registration(registration_number: &str) -> Self {
        Self {
            brand: "Maruti".to_string(),
            year: 2018,
            registration_number: Some(registration_number.to_string()),
            mileage: 15.0,
            fuel: "Petrol".to_string(),
        }
    }
}

/// Prima anual estimada del seguro
pub fn insurance_premium(brand: &str, car_age: i32, expired: bool) -> f64 {
    let mut premium = 12_000.0 + car_age as f64 * 800.0;
    if expired {
        premium *= 1.25;
    }
    if LUXURY_BRANDS.contains(&brand) {
        premium *= 2.5;
    } else if ["Honda", "Toyota", "Hyundai"].contains(&brand) {
        premium *= 1.2;
    }
    premium
}

/// Coste de una revisión
pub fn service_cost(brand: &str) -> f64 {
    let base = 3_000.0;
    if LUXURY_BRANDS.contains(&brand) {
        base * 4.0
    } else if ["Honda", "Toyota"].contains(&brand) {
        base * 1.5
    } else {
        base
    }
}

/// Servicio de información de vehículos con RNG propio
pub struct VehicleInfoService {
    rng: Mutex<StdRng>,
}

impl VehicleInfoService {
    pub fn from_entropy() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    pub fn generate_registration_number(&self) -> String {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        generate_registration_number(&mut *rng)
    }

    pub fn vehicle_report(&self, query: &VehicleQuery, today: NaiveDate) -> VehicleReport {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        build_report(&mut *rng, query, today)
    }
}

impl Default for VehicleInfoService {
    fn default() -> Self {
        Self::from_entropy()
    }
}

/// Matrícula aleatoria: `KA07C4821`
pub fn generate_registration_number<R: Rng + ?Sized>(rng: &mut R) -> String {
    let (state, _) = REGISTRATION_PATTERNS
        .choose(rng)
        .copied()
        .unwrap_or(("DL", "Delhi"));
    let series = ['A', 'B', 'C', 'D', 'E', 'F', 'G', 'H']
        .choose(rng)
        .copied()
        .unwrap_or('A');
    format!(
        "{}{:02}{}{}",
        state,
        rng.gen_range(1..=99),
        series,
        rng.gen_range(1000..=9999)
    )
}

pub fn build_report<R: Rng + ?Sized>(rng: &mut R, query: &VehicleQuery, today: NaiveDate) -> VehicleReport {
    let registration_number = query
        .registration_number
        .clone()
        .filter(|reg| !reg.trim().is_empty())
        .unwrap_or_else(|| generate_registration_number(rng));
    let state_code: String = registration_number.chars().take(2).collect::<String>().to_uppercase();
    let state = registration_state(&registration_number).unwrap_or("Unknown").to_string();

    let insurance_start = today - Duration::days(rng.gen_range(30..=365));
    let insurance_expiry = insurance_start + Duration::days(365);
    let days_to_insurance = (insurance_expiry - today).num_days();

    let puc_date = today - Duration::days(rng.gen_range(1..=180));
    let puc_expiry = puc_date + Duration::days(180);
    let days_to_puc = (puc_expiry - today).num_days();

    let rc_issue = NaiveDate::from_ymd_opt(query.year, rng.gen_range(1..=12), rng.gen_range(1..=28))
        .unwrap_or(today);
    let rc_validity = rc_issue + Duration::days(15 * 365);
    let days_to_rc = (rc_validity - today).num_days();

    let fitness_required = query.year < 2015;
    let fitness_expiry = fitness_required.then(|| today - Duration::days(rng.gen_range(1..=365)) + Duration::days(365));
    let days_to_fitness = fitness_expiry.map(|d| (d - today).num_days()).unwrap_or(0);

    let expired = ExpiredDocuments {
        insurance: insurance_expiry < today,
        puc: puc_expiry < today,
        rc: rc_validity < today,
        fitness: fitness_expiry.map(|d| d < today).unwrap_or(false),
    };

    let car_age = REFERENCE_YEAR - query.year;
    let premium = insurance_premium(&query.brand, car_age, expired.insurance);
    let service = service_cost(&query.brand);
    let fuel_analysis = calculate_fuel_cost(&query.fuel, query.mileage, DEFAULT_MONTHLY_KM);
    let ownership_cost = OwnershipCost::new(premium, &fuel_analysis, service);
    let age = car_age.max(0) as u32;

    VehicleReport {
        insurance: InsuranceInfo {
            provider: INSURANCE_PROVIDERS.choose(rng).copied().unwrap_or_default().to_string(),
            policy_number: format!("POL{}", rng.gen_range(100_000_000..=999_999_999u64)),
            start_date: insurance_start,
            expiry_date: insurance_expiry,
            expired: expired.insurance,
            days_remaining: days_to_insurance.max(0),
            status: if expired.insurance { "Expired" } else { "Active" }.to_string(),
            premium_estimate: premium.round(),
            coverage_type: ["Comprehensive", "Third Party", "Zero Depreciation"]
                .choose(rng)
                .copied()
                .unwrap_or_default()
                .to_string(),
            idv: rng.gen_range(200_000..=1_500_000),
            no_claim_bonus_pct: rng.gen_range(0..=50),
        },
        puc: PucInfo {
            certificate_number: format!("PUC{}", rng.gen_range(10_000_000..=99_999_999)),
            issue_date: puc_date,
            expiry_date: puc_expiry,
            expired: expired.puc,
            days_remaining: days_to_puc.max(0),
            status: if expired.puc { "Expired" } else { "Valid" }.to_string(),
            testing_center: format!("Authorized PUC Center - {}", state),
            emission_standard: if query.year >= 2020 { "BS6" } else { "BS4" }.to_string(),
            fee: 150,
        },
        registration: RegistrationInfo {
            rc_number: registration_number.clone(),
            issue_date: rc_issue,
            validity_date: rc_validity,
            expired: expired.rc,
            days_remaining: days_to_rc.max(0),
            status: if expired.rc { "Expired" } else { "Valid" }.to_string(),
            rto_office: format!("RTO {}-{}", state_code, rng.gen_range(1..=20)),
            vehicle_class: "Motor Car".to_string(),
        },
        fitness: FitnessInfo {
            required: fitness_required,
            certificate_number: fitness_required
                .then(|| format!("FIT{}", rng.gen_range(10_000_000..=99_999_999))),
            expiry_date: fitness_expiry,
            expired: expired.fitness,
            days_remaining: days_to_fitness.max(0),
            status: match (fitness_required, expired.fitness) {
                (false, _) => "Not Required",
                (true, true) => "Expired",
                (true, false) => "Valid",
            }
            .to_string(),
            fee: fitness_required.then_some(500),
        },
        service: ServiceInfo {
            last_service_date: today - Duration::days(rng.gen_range(30..=180)),
            next_service_due: today + Duration::days(rng.gen_range(30..=90)),
            service_centers: service_centers(&query.brand)
                .iter()
                .take(3)
                .map(|s| s.to_string())
                .collect(),
            total_services: rng.gen_range(age * 2..=age * 4),
            service_cost_estimate: service,
            service_interval: "6 months / 10,000 km".to_string(),
        },
        alerts: expired.alerts(days_to_insurance, days_to_puc),
        overall_status: expired.overall_status(),
        compliance_score: expired.compliance_score(),
        fuel_analysis,
        ownership_cost,
        registration_number,
        state,
        state_code,
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    #[test]
    fn test_service_center_brands_have_own_network() {
        for brand in SERVICE_CENTER_BRANDS {
            assert!(service_centers(brand)[0].starts_with(brand.split('-').next().unwrap()));
        }
        assert_eq!(service_centers("Lada"), ["Generic Service Center - Local Area"]);
    }

    #[test]
    fn test_fuel_cost_petrol() {
        let cost = calculate_fuel_cost("Petrol", 20.0, 1000.0);
        assert_eq!(cost.monthly_cost, 5142.0);
        assert_eq!(cost.yearly_cost, 61704.0);
        assert_eq!(cost.cost_per_km, 5.14);
        assert_eq!(cost.fuel_unit, "₹/L");
    }

    #[test]
    fn test_fuel_cost_electric_and_unknown() {
        let electric = calculate_fuel_cost("Electric", 0.0, 1000.0);
        assert_eq!(electric.monthly_cost, 1275.0);
        assert_eq!(electric.fuel_unit, "₹/kWh");

        let unknown = calculate_fuel_cost("Hydrogen", 10.0, 1000.0);
        assert_eq!(unknown.fuel_price, 100.0);
        assert_eq!(unknown.monthly_cost, 10_000.0);
    }

    #[test]
    fn test_fuel_cost_zero_guard() {
        let zero_mileage = calculate_fuel_cost("Diesel", 0.0, 1000.0);
        assert_eq!(zero_mileage.monthly_cost, 0.0);
        assert_eq!(zero_mileage.cost_per_km, 0.0);

        let zero_km = calculate_fuel_cost("Petrol", 18.0, 0.0);
        assert_eq!(zero_km.monthly_cost, 0.0);
        assert_eq!(zero_km.cost_per_km, 0.0);
    }

    #[test]
    fn test_compliance_score_arithmetic() {
        assert_eq!(ExpiredDocuments::default().compliance_score(), 100);
        let insurance_and_rc = ExpiredDocuments {
            insurance: true,
            rc: true,
            ..Default::default()
        };
        assert_eq!(insurance_and_rc.compliance_score(), 30);
        let all = ExpiredDocuments {
            insurance: true,
            puc: true,
            rc: true,
            fitness: true,
        };
        assert_eq!(all.compliance_score(), 0);
    }

    #[test]
    fn test_overall_status() {
        assert_eq!(ExpiredDocuments::default().overall_status(), ComplianceStatus::FullyCompliant);
        let two = ExpiredDocuments {
            puc: true,
            fitness: true,
            ..Default::default()
        };
        assert_eq!(two.overall_status(), ComplianceStatus::PartiallyCompliant);
        let three = ExpiredDocuments {
            puc: true,
            rc: true,
            fitness: true,
            ..Default::default()
        };
        assert_eq!(three.overall_status(), ComplianceStatus::NonCompliant);
    }

    #[test]
    fn test_alerts_sorted_by_priority() {
        let docs = ExpiredDocuments {
            puc: true,
            ..Default::default()
        };
        let alerts = docs.alerts(10, 100);
        assert_eq!(alerts.len(), 2);
        assert_eq!(alerts[0].kind, AlertKind::Critical);
        assert_eq!(alerts[1].kind, AlertKind::Warning);
        assert!(alerts[1].message.contains("10 days"));

        let ok = ExpiredDocuments::default().alerts(200, 100);
        assert_eq!(ok.len(), 1);
        assert_eq!(ok[0].kind, AlertKind::Success);
        assert_eq!(ok[0].priority, 0);
    }

    #[test]
    fn test_registration_state_lookup() {
        assert_eq!(registration_state("KA01AB1234"), Some("Karnataka"));
        assert_eq!(registration_state("mh12de3456"), Some("Maharashtra"));
        assert_eq!(registration_state("ZZ01AB1234"), None);
        assert_eq!(registration_state("K"), None);
    }

    #[test]
    fn test_generated_registration_number_format() {
        let pattern = Regex::new(r"^[A-Z]{2}\d{2}[A-H]\d{4}$").unwrap();
        let service = VehicleInfoService::seeded(3);
        for _ in 0..50 {
            let reg = service.generate_registration_number();
            assert!(pattern.is_match(&reg), "{}", reg);
            assert!(registration_state(&reg).is_some());
        }
    }

    #[test]
    fn test_vehicle_report() {
        let service = VehicleInfoService::seeded(11);
        let report = service.vehicle_report(&VehicleQuery::for_registration("KA05MX2024"), today());

        assert_eq!(report.state, "Karnataka");
        assert_eq!(report.state_code, "KA");
        assert!(!report.fitness.required);
        assert_eq!(report.fitness.status, "Not Required");
        assert_eq!(report.puc.emission_standard, "BS4");
        assert_eq!(report.service.service_centers.len(), 3);
        assert!((12..=24).contains(&report.service.total_services));
        // seguro y PUC simulados nunca caducan; RC de 2018 sigue vigente
        assert_eq!(report.compliance_score, 100);
        assert_eq!(report.overall_status, ComplianceStatus::FullyCompliant);
        assert_eq!(report.fuel_analysis.monthly_cost, 6856.0);
    }

    #[test]
    fn test_old_vehicle_requires_fitness_and_has_expired_rc() {
        let service = VehicleInfoService::seeded(5);
        let query = VehicleQuery {
            brand: "BMW".to_string(),
            year: 2005,
            registration_number: None,
            mileage: 10.0,
            fuel: "Diesel".to_string(),
        };
        let report = service.vehicle_report(&query, today());
        assert!(report.fitness.required);
        assert!(report.registration.expired);
        assert_eq!(report.compliance_score, 70);
        assert_eq!(report.overall_status, ComplianceStatus::PartiallyCompliant);
        assert!(report.registration_number.len() >= 9);
    }

    #[test]
    fn test_premium_and_service_cost() {
        assert_eq!(insurance_premium("Maruti", 4, false), 15_200.0);
        assert_eq!(insurance_premium("BMW", 0, true), 37_500.0);
        assert_eq!(service_cost("Audi"), 12_000.0);
        assert_eq!(service_cost("Toyota"), 4_500.0);
        assert_eq!(service_cost("Kia"), 3_000.0);
    }
}
