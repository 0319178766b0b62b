//! Servicio del marketplace
//!
//! Orquesta el almacén de anuncios, la estrategia de enriquecimiento, la
//! búsqueda y la similitud. Es lo que consumen los controllers y la tarea
//! de actividad.

use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::models::{Listing, ListingStatus, ListingUpdate, NewListing};
use crate::repositories::{Counter, ListingRepository, UserRepository};
use crate::services::enrichment_service::DetailGenerator;
use crate::services::search_service::ListingFilters;
use crate::services::similarity_service::{similar_listings, ScoredListing};
use crate::utils::errors::{not_found_error, AppError, AppResult};

pub const DEFAULT_FEATURED_LIMIT: usize = 6;
const LATEST_LISTINGS: usize = 5;
const ID_ATTEMPTS: usize = 3;

/// Estadísticas agregadas del marketplace
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketplaceStats {
    pub total_listings: usize,
    pub total_value: i64,
    pub average_price: i64,
    pub brands_distribution: BTreeMap<String, u64>,
    pub fuel_types_distribution: BTreeMap<String, u64>,
    pub locations_distribution: BTreeMap<String, u64>,
    pub status_counts: BTreeMap<String, u64>,
    pub latest_listings: Vec<Listing>,
    pub total_users: u64,
}

impl MarketplaceStats {
    pub fn from_listings(listings: Vec<Listing>, total_users: u64) -> Self {
        let total_listings = listings.len();
        let total_value: i64 = listings.iter().map(|l| l.price).sum();
        let average_price = if total_listings > 0 {
            total_value / total_listings as i64
        } else {
            0
        };

        let mut brands = BTreeMap::new();
        let mut fuels = BTreeMap::new();
        let mut locations = BTreeMap::new();
        let mut statuses = BTreeMap::new();
        for listing in &listings {
            *brands.entry(listing.brand.clone()).or_insert(0) += 1;
            *fuels.entry(listing.fuel.clone()).or_insert(0) += 1;
            *locations.entry(listing.location.clone()).or_insert(0) += 1;
            *statuses.entry(listing.status.to_string()).or_insert(0) += 1;
        }

        let mut latest = listings;
        latest.sort_by_key(|l| Reverse(l.posted_date));
        latest.truncate(LATEST_LISTINGS);

        Self {
            total_listings,
            total_value,
            average_price,
            brands_distribution: brands,
            fuel_types_distribution: fuels,
            locations_distribution: locations,
            status_counts: statuses,
            latest_listings: latest,
            total_users,
        }
    }
}

/// Servicio del marketplace
pub struct MarketplaceService {
    listings: Arc<dyn ListingRepository>,
    users: Arc<dyn UserRepository>,
    generator: Arc<dyn DetailGenerator>,
}

impl MarketplaceService {
    pub fn new(
        listings: Arc<dyn ListingRepository>,
        users: Arc<dyn UserRepository>,
        generator: Arc<dyn DetailGenerator>,
    ) -> Self {
        Self {
            listings,
            users,
            generator,
        }
    }

    /// Enriquece, asigna id de 8 caracteres e inserta
    pub async fn add_listing(&self, new: NewListing) -> AppResult<Listing> {
        for _ in 0..ID_ATTEMPTS {
            let now = Utc::now();
            let generated = self.generator.generate(&new, now);
            let listing = Listing::assemble(short_id(), new.clone(), generated, now);

            match self.listings.insert(listing).await {
                Ok(stored) => {
                    info!("🚗 Anuncio {} creado: {} {} ({})", stored.id, stored.brand, stored.model, stored.year);
                    return Ok(stored);
                }
                Err(AppError::Conflict(msg)) => debug!("Colisión de id, reintentando: {}", msg),
                Err(e) => return Err(e),
            }
        }
        Err(AppError::Internal("Could not allocate a unique listing id".to_string()))
    }

    pub async fn get_listing(&self, id: &str) -> AppResult<Listing> {
        self.listings
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("Listing", id))
    }

    pub async fn all_listings(&self) -> AppResult<Vec<Listing>> {
        self.listings.find_all().await
    }

    /// +1 vista
    pub async fn view_listing(&self, id: &str) -> AppResult<Listing> {
        self.bump(id, Counter::Views).await
    }

    /// +1 favorito
    pub async fn favorite_listing(&self, id: &str) -> AppResult<Listing> {
        self.bump(id, Counter::Favorites).await
    }

    async fn bump(&self, id: &str, counter: Counter) -> AppResult<Listing> {
        self.listings
            .increment(id, counter)
            .await?
            .ok_or_else(|| not_found_error("Listing", id))
    }

    pub async fn search(&self, filters: &ListingFilters) -> AppResult<Vec<Listing>> {
        self.listings.find_filtered(filters).await
    }

    /// Anuncios más populares (`views + 2·favorites`)
    pub async fn featured(&self, limit: usize) -> AppResult<Vec<Listing>> {
        let mut all = self.listings.find_all().await?;
        all.sort_by_key(|l| Reverse(l.popularity()));
        all.truncate(limit);
        Ok(all)
    }

    /// Similares a `id`; id desconocido devuelve lista vacía
    pub async fn similar(&self, id: &str, limit: usize) -> AppResult<Vec<ScoredListing>> {
        let all = self.listings.find_all().await?;
        Ok(match all.iter().find(|l| l.id == id) {
            Some(target) => similar_listings(target, &all, limit),
            None => Vec::new(),
        })
    }

    pub async fn update_listing(&self, id: &str, update: &ListingUpdate) -> AppResult<Listing> {
        let updated = self
            .listings
            .update(id, update)
            .await?
            .ok_or_else(|| not_found_error("Listing", id))?;
        info!("✏️ Anuncio {} actualizado", id);
        Ok(updated)
    }

    pub async fn delete_listing(&self, id: &str) -> AppResult<()> {
        if !self.listings.delete(id).await? {
            return Err(not_found_error("Listing", id));
        }
        info!("🗑️ Anuncio {} eliminado", id);
        Ok(())
    }

    pub async fn stats(&self) -> AppResult<MarketplaceStats> {
        let listings = self.listings.find_all().await?;
        let users = self.users.count().await?;
        Ok(MarketplaceStats::from_listings(listings, users))
    }

    pub async fn distinct_brands(&self) -> AppResult<Vec<String>> {
        let all = self.listings.find_all().await?;
        Ok(distinct(all.iter().map(|l| l.brand.as_str())))
    }

    pub async fn distinct_locations(&self) -> AppResult<Vec<String>> {
        let all = self.listings.find_all().await?;
        Ok(distinct(all.iter().map(|l| l.location.as_str())))
    }

    /// Inserta los anuncios de ejemplo si el almacén está vacío.
    /// Devuelve cuántos se insertaron.
    pub async fn seed_sample_data(&self) -> AppResult<usize> {
        if self.listings.count().await? > 0 {
            debug!("Almacén con datos, no se siembran ejemplos");
            return Ok(0);
        }

        let samples = sample_listings();
        let inserted = samples.len();
        for new in samples {
            self.add_listing(new).await?;
        }
        info!("🌱 {} anuncios de ejemplo insertados", inserted);
        Ok(inserted)
    }
}

fn short_id() -> String {
    Uuid::new_v4().simple().to_string()[..8].to_string()
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    values
        .filter(|v| !v.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

#[allow(clippy::too_many_arguments)]
fn sample(
    brand: &str,
    model: &str,
    year: i32,
    fuel: &str,
    km_driven: u32,
    price: i64,
    location: &str,
    seller_type: &str,
    transmission: &str,
) -> NewListing {
    NewListing {
        brand: brand.to_string(),
        model: model.to_string(),
        year,
        fuel: fuel.to_string(),
        km_driven,
        price,
        location: location.to_string(),
        seller_type: seller_type.to_string(),
        transmission: transmission.to_string(),
        status: ListingStatus::Available,
    }
}

/// Los seis anuncios de referencia
pub fn sample_listings() -> Vec<NewListing> {
    vec![
        sample("Maruti", "Swift", 2020, "Petrol", 25_000, 650_000, "Bangalore", "Individual", "Manual"),
        sample("Hyundai", "Creta", 2021, "Diesel", 18_000, 1_250_000, "Delhi", "Dealer", "Automatic"),
        sample("Honda", "City", 2019, "Petrol", 35_000, 850_000, "Mumbai", "Individual", "Manual"),
        sample("Toyota", "Innova", 2022, "Diesel", 12_000, 1_850_000, "Chennai", "Dealer", "Manual"),
        sample("BMW", "X1", 2020, "Petrol", 22_000, 3_200_000, "Bangalore", "Individual", "Automatic"),
        sample("Tata", "Nexon", 2021, "Electric", 15_000, 1_100_000, "Pune", "Dealer", "Automatic"),
    ]
}
