//! Enriquecimiento sintético de anuncios
//!
//! Los campos que envía el vendedor pasan sin cambios; todo lo demás
//! (vendedor, condición, historial, garantía...) lo fabrica una estrategia
//! `DetailGenerator` inyectable. `RandomDetailGenerator` usa las tablas de
//! políticas del marketplace con un RNG sembrable.

use std::ops::RangeInclusive;
use std::sync::Mutex;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::models::{
    AccidentRecord, CarDetails, ConditionGrade, ConditionReport, ContactInfo, GeneratedListing,
    InspectionReport, InsuranceStatus, ListingDetails, Modifications, NewListing,
    OwnershipHistory, PricePoint, SellerInfo, ServiceHistory, Warranty, REFERENCE_YEAR,
};

const IMAGE_BASE_URL: &str = "https://example.com/car-images/";

const BASIC_FEATURES: [&str; 4] = [
    "Power Steering",
    "Power Windows",
    "Central Locking",
    "Air Conditioning",
];
const FEATURES_2018: [&str; 3] = ["Touchscreen Infotainment", "Bluetooth", "USB Ports"];
const FEATURES_2020: [&str; 3] = ["Android Auto", "Apple CarPlay", "Reverse Camera"];
const LUXURY_FEATURES: [&str; 7] = [
    "Leather Seats",
    "Sunroof",
    "Alloy Wheels",
    "Automatic Climate Control",
    "Cruise Control",
    "Parking Sensors",
    "Keyless Entry",
];
const LUXURY_BRANDS: [&str; 3] = ["BMW", "Mercedes-Benz", "Audi"];

const MODIFICATION_OPTIONS: [&str; 7] = [
    "Alloy Wheels",
    "Body Kit",
    "Audio System",
    "Seat Covers",
    "Window Tinting",
    "Roof Rails",
    "Fog Lights",
];

const REASONS_FOR_SALE: [&str; 6] = [
    "Buying new car",
    "Relocating",
    "Financial reasons",
    "Upgrading",
    "Multiple cars",
    "Rarely used",
];

/// Estrategia que fabrica los campos auxiliares de un anuncio
pub trait DetailGenerator: Send + Sync {
    fn generate(&self, new: &NewListing, now: DateTime<Utc>) -> GeneratedListing;
}

/// Generador aleatorio con las tablas de políticas del marketplace
pub struct RandomDetailGenerator {
    rng: Mutex<StdRng>,
}

impl RandomDetailGenerator {
    pub fn from_entropy() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Generador reproducible para tests y datos de ejemplo
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl Default for RandomDetailGenerator {
    fn default() -> Self {
        Self::from_entropy()
    }
}

impl DetailGenerator for RandomDetailGenerator {
    fn generate(&self, new: &NewListing, now: DateTime<Utc>) -> GeneratedListing {
        let mut guard = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        generate_with(&mut *guard, new, now)
    }
}

/// Generador determinista: siempre los mismos valores para la misma entrada
#[derive(Debug, Default, Clone, Copy)]
pub struct FixedDetailGenerator;

impl DetailGenerator for FixedDetailGenerator {
    fn generate(&self, new: &NewListing, now: DateTime<Utc>) -> GeneratedListing {
        let today = now.date_naive();
        let age = REFERENCE_YEAR - new.year;
        let (grade, scores) = condition_band(age, new.km_driven);
        let months = warranty_months(age);

        GeneratedListing {
            views: 100,
            favorites: 10,
            details: ListingDetails {
                seller_info: SellerInfo {
                    name: "Test Seller".to_string(),
                    rating: 4.5,
                    total_listings: 1,
                    member_since: 2020,
                    verified: true,
                    response_time_hours: 2,
                    location_verified: true,
                    phone_verified: true,
                    business_license: None,
                    showroom_address: None,
                },
                car_details: CarDetails {
                    engine_capacity_cc: 1200,
                    max_power_bhp: 90,
                    max_torque_nm: 113,
                    mileage_kmpl: 20,
                    seats: 5,
                    body_type: "Hatchback".to_string(),
                    color: "White".to_string(),
                    variant: format!("{} Base", new.model),
                    ownership: "First Owner".to_string(),
                    registration_year: new.year,
                    chassis_number: "ABC1000000".to_string(),
                    engine_number: "ENG100000".to_string(),
                },
                images: image_urls(&new.brand, &new.model, 8),
                condition: ConditionReport {
                    overall: grade,
                    score: *scores.start(),
                    exterior: "Good".to_string(),
                    interior: "Good".to_string(),
                    engine: "Good".to_string(),
                    tires: "Good".to_string(),
                    battery: "Good".to_string(),
                },
                features: feature_pool(&new.brand, new.year),
                inspection_report: InspectionReport {
                    inspected: true,
                    inspection_date: today,
                    inspector: "Certified Auto Inspector".to_string(),
                    report_url: "https://example.com/inspection-report.pdf".to_string(),
                    major_issues: 0,
                    minor_issues: 0,
                    overall_rating: "Pass".to_string(),
                },
                price_history: vec![PricePoint {
                    date: today,
                    price: new.price,
                    reason: "Initial listing".to_string(),
                }],
                contact_info: ContactInfo {
                    phone: "+91-7000010000".to_string(),
                    whatsapp_available: true,
                    email: "seller100@example.com".to_string(),
                    preferred_contact: "Phone".to_string(),
                    available_hours: "9 AM - 8 PM".to_string(),
                    call_preference: "Anytime".to_string(),
                },
                availability: "Available".to_string(),
                negotiable: true,
                exchange_accepted: false,
                loan_available: false,
                warranty: Warranty {
                    manufacturer_months_remaining: months,
                    extended_warranty: false,
                    warranty_type: if months > 0 { "Comprehensive" } else { "None" }.to_string(),
                },
                service_history: ServiceHistory {
                    total_services: age.max(0) as u32,
                    last_service_date: today,
                    service_type: "Authorized Service Center".to_string(),
                    major_repairs: 0,
                    service_records_available: true,
                    next_service_due: today,
                },
                ownership_history: OwnershipHistory {
                    total_owners: 1,
                    current_owner_years: 1,
                    usage_type: "Personal".to_string(),
                    driven_by: "Owner".to_string(),
                    parking_type: "Covered".to_string(),
                },
                registration_state: registration_state(&new.location).to_string(),
                insurance_status: InsuranceStatus {
                    valid_until: today,
                    insurance_type: "Comprehensive".to_string(),
                    claim_history: 0,
                    no_claim_bonus_pct: 0,
                    transferable: true,
                },
                rto_clearance: "Clear".to_string(),
                accident_history: None,
                modifications: None,
                test_drive_available: true,
                home_inspection: false,
                urgent_sale: false,
                reason_for_sale: "Upgrading".to_string(),
            },
        }
    }
}

/// Fabrica todos los campos auxiliares con el RNG dado
pub fn generate_with<R: Rng + ?Sized>(rng: &mut R, new: &NewListing, now: DateTime<Utc>) -> GeneratedListing {
    let today = now.date_naive();
    let age = REFERENCE_YEAR - new.year;

    let image_count = rng.gen_range(8..=15);

    GeneratedListing {
        views: rng.gen_range(50..=500),
        favorites: rng.gen_range(5..=50),
        details: ListingDetails {
            seller_info: seller_info(rng, &new.seller_type),
            car_details: car_details(rng, new),
            images: image_urls(&new.brand, &new.model, image_count),
            condition: assess_condition(rng, new.year, new.km_driven),
            features: generate_features(rng, &new.brand, new.year),
            inspection_report: InspectionReport {
                inspected: rng.gen_bool(0.5),
                inspection_date: days_before(today, rng.gen_range(1..=30)),
                inspector: "Certified Auto Inspector".to_string(),
                report_url: "https://example.com/inspection-report.pdf".to_string(),
                major_issues: rng.gen_range(0..=2),
                minor_issues: rng.gen_range(0..=5),
                overall_rating: pick(rng, &["Pass", "Pass with Minor Issues", "Needs Attention"]),
            },
            price_history: price_history(rng, new.price, today),
            contact_info: ContactInfo {
                phone: format!(
                    "+91-{}{}",
                    rng.gen_range(70_000..=99_999),
                    rng.gen_range(10_000..=99_999)
                ),
                whatsapp_available: rng.gen_bool(0.5),
                email: format!("seller{}@example.com", rng.gen_range(100..=999)),
                preferred_contact: pick(rng, &["Phone", "WhatsApp", "Email"]),
                available_hours: "9 AM - 8 PM".to_string(),
                call_preference: pick(rng, &["Anytime", "After 6 PM", "Weekends only"]),
            },
            availability: "Available".to_string(),
            negotiable: rng.gen_bool(0.5),
            exchange_accepted: rng.gen_bool(0.5),
            loan_available: rng.gen_bool(0.5),
            warranty: calculate_warranty(rng, new.year),
            service_history: ServiceHistory {
                total_services: age.max(0) as u32 * rng.gen_range(1..=3),
                last_service_date: days_before(today, rng.gen_range(30..=180)),
                service_type: pick(rng, &["Authorized Service Center", "Local Garage", "Mixed"]),
                major_repairs: rng.gen_range(0..=2),
                service_records_available: rng.gen_bool(0.5),
                next_service_due: days_after(today, rng.gen_range(30..=120)),
            },
            ownership_history: OwnershipHistory {
                total_owners: rng.gen_range(1..=3),
                current_owner_years: rng.gen_range(1..=5),
                usage_type: pick(rng, &["Personal", "Commercial", "Taxi"]),
                driven_by: pick(rng, &["Owner", "Chauffeur", "Family Members"]),
                parking_type: pick(rng, &["Covered", "Open", "Street"]),
            },
            registration_state: registration_state(&new.location).to_string(),
            insurance_status: InsuranceStatus {
                valid_until: days_after(today, rng.gen_range(30..=365)),
                insurance_type: pick(rng, &["Comprehensive", "Third Party", "Zero Depreciation"]),
                claim_history: rng.gen_range(0..=2),
                no_claim_bonus_pct: rng.gen_range(0..=50),
                transferable: rng.gen_bool(0.5),
            },
            rto_clearance: pick(rng, &["Clear", "Pending", "Minor Issues"]),
            accident_history: accident_history(rng, today),
            modifications: modifications(rng),
            test_drive_available: true,
            home_inspection: rng.gen_bool(0.5),
            urgent_sale: rng.gen_bool(0.5),
            reason_for_sale: pick(rng, &REASONS_FOR_SALE),
        },
    }
}

/// Banda de condición según edad y kilómetros
pub fn condition_band(age: i32, km_driven: u32) -> (ConditionGrade, RangeInclusive<u8>) {
    if age <= 2 && km_driven < 30_000 {
        (ConditionGrade::Excellent, 90..=95)
    } else if age <= 4 && km_driven < 60_000 {
        (ConditionGrade::Good, 75..=89)
    } else if age <= 7 && km_driven < 100_000 {
        (ConditionGrade::Fair, 60..=74)
    } else {
        (ConditionGrade::Average, 40..=59)
    }
}

pub fn assess_condition<R: Rng + ?Sized>(rng: &mut R, year: i32, km_driven: u32) -> ConditionReport {
    let (overall, scores) = condition_band(REFERENCE_YEAR - year, km_driven);
    let quality = ["Excellent", "Good", "Fair"];
    let wear = ["New", "Good", "Needs Replacement"];

    ConditionReport {
        overall,
        score: rng.gen_range(scores),
        exterior: pick(rng, &quality),
        interior: pick(rng, &quality),
        engine: pick(rng, &quality),
        tires: pick(rng, &wear),
        battery: pick(rng, &wear),
    }
}

/// Catálogo de equipamiento disponible según marca y año
pub fn feature_pool(brand: &str, year: i32) -> Vec<String> {
    let mut pool: Vec<&str> = BASIC_FEATURES.to_vec();
    if year >= 2018 {
        pool.extend(FEATURES_2018);
    }
    if year >= 2020 {
        pool.extend(FEATURES_2020);
    }
    if LUXURY_BRANDS.contains(&brand) {
        pool.extend(LUXURY_FEATURES);
    }
    pool.into_iter().map(String::from).collect()
}

/// Muestra sin repetición de `min(len, 6..=12)` elementos del catálogo
pub fn generate_features<R: Rng + ?Sized>(rng: &mut R, brand: &str, year: i32) -> Vec<String> {
    let pool = feature_pool(brand, year);
    let wanted = rng.gen_range(6..=12);
    let amount = pool.len().min(wanted);
    pool.choose_multiple(rng, amount).cloned().collect()
}

/// Meses de garantía de fábrica restantes (0 = expirada)
pub fn warranty_months(age: i32) -> u32 {
    let age = age.max(0);
    if age <= 3 {
        (36 - 12 * age).max(0) as u32
    } else {
        0
    }
}

pub fn calculate_warranty<R: Rng + ?Sized>(rng: &mut R, year: i32) -> Warranty {
    let age = REFERENCE_YEAR - year;
    let months = warranty_months(age);
    let extended_warranty = rng.gen_bool(0.5);

    let warranty_type = if age <= 3 {
        if months > 0 { "Comprehensive" } else { "Expired" }
    } else if rng.gen_bool(0.5) {
        "Extended"
    } else {
        "None"
    };

    Warranty {
        manufacturer_months_remaining: months,
        extended_warranty,
        warranty_type: warranty_type.to_string(),
    }
}

/// Estado de matriculación a partir de la ciudad
pub fn registration_state(location: &str) -> &'static str {
    match location {
        "Bangalore" => "Karnataka (KA)",
        "Delhi" => "Delhi (DL)",
        "Mumbai" | "Pune" => "Maharashtra (MH)",
        "Chennai" => "Tamil Nadu (TN)",
        "Hyderabad" => "Telangana (TS)",
        "Kolkata" => "West Bengal (WB)",
        _ => "Unknown",
    }
}

fn seller_info<R: Rng + ?Sized>(rng: &mut R, seller_type: &str) -> SellerInfo {
    if seller_type.eq_ignore_ascii_case("Individual") {
        SellerInfo {
            name: pick(rng, &["Rajesh Kumar", "Priya Sharma", "Amit Patel", "Sunita Singh"]),
            rating: round_one(rng.gen_range(4.0..=5.0)),
            total_listings: rng.gen_range(1..=5),
            member_since: rng.gen_range(2018..=2023),
            verified: rng.gen_bool(0.5),
            response_time_hours: rng.gen_range(1..=24),
            location_verified: true,
            phone_verified: true,
            business_license: None,
            showroom_address: None,
        }
    } else {
        SellerInfo {
            name: pick(rng, &["AutoMax Motors", "Prime Cars", "Elite Automobiles", "City Cars"]),
            rating: round_one(rng.gen_range(4.2..=4.9)),
            total_listings: rng.gen_range(50..=200),
            member_since: rng.gen_range(2015..=2020),
            verified: true,
            response_time_hours: rng.gen_range(1..=6),
            location_verified: true,
            phone_verified: true,
            business_license: Some(format!("DL{}", rng.gen_range(100_000..=999_999))),
            showroom_address: Some("Main Road, Commercial Complex".to_string()),
        }
    }
}

fn car_details<R: Rng + ?Sized>(rng: &mut R, new: &NewListing) -> CarDetails {
    let trim = pick(rng, &["LXi", "VXi", "ZXi", "Base", "Top"]);
    CarDetails {
        engine_capacity_cc: rng.gen_range(1000..=3000),
        max_power_bhp: rng.gen_range(70..=300),
        max_torque_nm: rng.gen_range(100..=400),
        mileage_kmpl: rng.gen_range(12..=25),
        seats: [5u8, 7, 8].choose(rng).copied().unwrap_or(5),
        body_type: pick(rng, &["Hatchback", "Sedan", "SUV", "Crossover"]),
        color: pick(rng, &["White", "Silver", "Black", "Red", "Blue", "Grey"]),
        variant: format!("{} {}", new.model, trim),
        ownership: pick(rng, &["First Owner", "Second Owner", "Third Owner"]),
        registration_year: new.year,
        chassis_number: format!("ABC{}", rng.gen_range(1_000_000..=9_999_999)),
        engine_number: format!("ENG{}", rng.gen_range(100_000..=999_999)),
    }
}

fn image_urls(brand: &str, model: &str, count: usize) -> Vec<String> {
    let slug = format!("{}-{}", brand, model).to_lowercase().replace(' ', "-");
    (1..=count)
        .map(|i| format!("{}{}-{}.jpg", IMAGE_BASE_URL, slug, i))
        .collect()
}

/// 1 a 5 puntos con deriva acumulada, ordenados por fecha
fn price_history<R: Rng + ?Sized>(rng: &mut R, current_price: i64, today: NaiveDate) -> Vec<PricePoint> {
    let reasons = ["Initial listing", "Price reduced", "Market adjustment"];
    let mut price = current_price;
    let mut history: Vec<PricePoint> = (0..rng.gen_range(1..=5))
        .map(|_| {
            let date = days_before(today, rng.gen_range(1..=60));
            price += rng.gen_range(-20_000..=10_000);
            PricePoint {
                date,
                price,
                reason: pick(rng, &reasons),
            }
        })
        .collect();
    history.sort_by_key(|point| point.date);
    history
}

fn accident_history<R: Rng + ?Sized>(rng: &mut R, today: NaiveDate) -> Option<AccidentRecord> {
    if !rng.gen_bool(0.5) {
        return None;
    }
    Some(AccidentRecord {
        total_accidents: rng.gen_range(1..=2),
        severity: pick(rng, &["Minor", "Moderate"]),
        last_accident_date: days_before(today, rng.gen_range(180..=1095)),
        insurance_claimed: rng.gen_bool(0.5),
        repaired_at: pick(rng, &["Authorized Center", "Local Garage"]),
    })
}

fn modifications<R: Rng + ?Sized>(rng: &mut R) -> Option<Modifications> {
    if !rng.gen_bool(0.5) {
        return None;
    }
    let amount = rng.gen_range(1..=3);
    Some(Modifications {
        items: MODIFICATION_OPTIONS
            .choose_multiple(rng, amount)
            .map(|s| s.to_string())
            .collect(),
        cost: rng.gen_range(10_000..=50_000),
        professionally_done: rng.gen_bool(0.5),
    })
}

fn pick<R: Rng + ?Sized>(rng: &mut R, options: &[&str]) -> String {
    options.choose(rng).copied().unwrap_or_default().to_string()
}

fn round_one(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn days_before(date: NaiveDate, days: i64) -> NaiveDate {
    date - Duration::days(days)
}

fn days_after(date: NaiveDate, days: i64) -> NaiveDate {
    date + Duration::days(days)
}


#[cfg(test)]
mod tests {
    use super::tests_support::fixed_now;
    use super::*;

    fn new_listing(brand: &str, year: i32, km_driven: u32, seller_type: &str) -> NewListing {
        NewListing {
            brand: brand.to_string(),
            model: "Test Model".to_string(),
            year,
            fuel: "Petrol".to_string(),
            km_driven,
            price: 900_000,
            location: "Bangalore".to_string(),
            seller_type: seller_type.to_string(),
            transmission: "Manual".to_string(),
            status: Default::default(),
        }
    }

    #[test]
    fn test_condition_bands() {
        assert_eq!(condition_band(1, 10_000).0, ConditionGrade::Excellent);
        assert_eq!(condition_band(2, 30_000).0, ConditionGrade::Good);
        assert_eq!(condition_band(4, 59_999).0, ConditionGrade::Good);
        assert_eq!(condition_band(7, 99_999).0, ConditionGrade::Fair);
        assert_eq!(condition_band(8, 5_000).0, ConditionGrade::Average);

        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..20 {
            let report = assess_condition(&mut rng, 2023, 10_000);
            assert!((90..=95).contains(&report.score));
        }
    }

    #[test]
    fn test_feature_pool_by_brand_and_year() {
        assert_eq!(feature_pool("Maruti", 2015).len(), 4);
        assert_eq!(feature_pool("Maruti", 2018).len(), 7);
        assert_eq!(feature_pool("Maruti", 2021).len(), 10);
        assert_eq!(feature_pool("BMW", 2021).len(), 17);
    }

    #[test]
    fn test_generated_features_are_distinct_subset() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..20 {
            let features = generate_features(&mut rng, "Audi", 2022);
            let pool = feature_pool("Audi", 2022);
            assert!((6..=12).contains(&features.len()));
            assert!(features.iter().all(|f| pool.contains(f)));
            let mut dedup = features.clone();
            dedup.sort();
            dedup.dedup();
            assert_eq!(dedup.len(), features.len());
        }
        // catálogo de 4: nunca más de 4
        assert_eq!(generate_features(&mut rng, "Tata", 2010).len(), 4);
    }

    #[test]
    fn test_warranty_months() {
        assert_eq!(warranty_months(0), 36);
        assert_eq!(warranty_months(2), 12);
        assert_eq!(warranty_months(3), 0);
        assert_eq!(warranty_months(6), 0);

        let mut rng = StdRng::seed_from_u64(1);
        let warranty = calculate_warranty(&mut rng, 2022);
        assert_eq!(warranty.manufacturer_months_remaining, 12);
        assert_eq!(warranty.warranty_type, "Comprehensive");
    }

    #[test]
    fn test_registration_state_lookup() {
        assert_eq!(registration_state("Pune"), "Maharashtra (MH)");
        assert_eq!(registration_state("Jaipur"), "Unknown");
    }

    #[test]
    fn test_random_generator_ranges() {
        let generator = RandomDetailGenerator::seeded(2024);
        for _ in 0..25 {
            let generated = generator.generate(&new_listing("Honda", 2019, 35_000, "Dealer"), fixed_now());
            assert!((50..=500).contains(&generated.views));
            assert!((5..=50).contains(&generated.favorites));

            let details = generated.details;
            assert!((8..=15).contains(&details.images.len()));
            assert!((1..=5).contains(&details.price_history.len()));
            assert!(details
                .price_history
                .windows(2)
                .all(|w| w[0].date <= w[1].date));
            assert!(details.seller_info.verified);
            assert!(details.seller_info.business_license.is_some());
            assert_eq!(details.registration_state, "Karnataka (KA)");
            assert!(details.test_drive_available);
            if let Some(mods) = &details.modifications {
                assert!((1..=3).contains(&mods.items.len()));
            }
        }
    }

    #[test]
    fn test_seeded_generators_are_reproducible() {
        let a = RandomDetailGenerator::seeded(99);
        let b = RandomDetailGenerator::seeded(99);
        let input = new_listing("Toyota", 2022, 12_000, "Individual");
        assert_eq!(a.generate(&input, fixed_now()), b.generate(&input, fixed_now()));
    }
}
