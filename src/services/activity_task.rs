//! Actividad simulada del mercado
//!
//! Tarea de fondo que en cada tick publica un anuncio nuevo (probabilidad
//! 0.3) o suma una vista a un anuncio existente. Se arranca en `main` y se
//! detiene con `ActivityHandle::shutdown` al apagar el servidor.

use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::models::{ListingStatus, NewListing};
use crate::services::marketplace_service::MarketplaceService;
use crate::utils::errors::AppResult;

pub const NEW_LISTING_PROBABILITY: f64 = 0.3;

const BRANDS: [&str; 25] = [
    "BMW", "Mercedes-Benz", "Audi", "Jaguar", "Lexus", "Porsche",
    "Honda", "Toyota", "Hyundai", "Volkswagen", "Skoda", "Nissan",
    "Maruti", "Tata", "Mahindra", "Datsun", "Renault",
    "Ferrari", "Lamborghini", "Maserati", "Bentley",
    "Ford", "Chevrolet", "Jeep", "Land Rover",
];
const MODELS: [&str; 6] = ["Swift", "Creta", "City", "Innova", "X1", "Nexon"];
const FUELS: [&str; 3] = ["Petrol", "Diesel", "Electric"];
const LOCATIONS: [&str; 5] = ["Bangalore", "Delhi", "Mumbai", "Chennai", "Pune"];
const SELLER_TYPES: [&str; 2] = ["Individual", "Dealer"];
const TRANSMISSIONS: [&str; 2] = ["Manual", "Automatic"];

/// Lo que hizo un tick
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivityEvent {
    Listed(String),
    Viewed(String),
    Idle,
}

/// Anuncio aleatorio con las categorías del mercado
pub fn random_new_listing<R: Rng + ?Sized>(rng: &mut R) -> NewListing {
    NewListing {
        brand: pick(rng, &BRANDS),
        model: pick(rng, &MODELS),
        year: rng.gen_range(2018..=2023),
        fuel: pick(rng, &FUELS),
        km_driven: rng.gen_range(5_000..=50_000),
        price: rng.gen_range(500_000..=4_000_000),
        location: pick(rng, &LOCATIONS),
        seller_type: pick(rng, &SELLER_TYPES),
        transmission: pick(rng, &TRANSMISSIONS),
        status: ListingStatus::Available,
    }
}

fn pick<R: Rng + ?Sized>(rng: &mut R, values: &[&str]) -> String {
    values.choose(rng).copied().unwrap_or_default().to_string()
}

/// Un tick de actividad
pub async fn tick<R: Rng + ?Sized>(service: &MarketplaceService, rng: &mut R) -> AppResult<ActivityEvent> {
    if rng.gen_bool(NEW_LISTING_PROBABILITY) {
        let new = random_new_listing(rng);
        let listing = service.add_listing(new).await?;
        return Ok(ActivityEvent::Listed(listing.id));
    }

    let all = service.all_listings().await?;
    let Some(id) = all.choose(rng).map(|l| l.id.clone()) else {
        return Ok(ActivityEvent::Idle);
    };
    service.view_listing(&id).await?;
    Ok(ActivityEvent::Viewed(id))
}

/// Handle exclusivo de la tarea de actividad
pub struct ActivityHandle {
    shutdown_tx: watch::Sender<bool>,
    join: JoinHandle<()>,
}

impl ActivityHandle {
    /// Señala la parada y espera a que la tarea termine
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(true);
        if let Err(e) = self.join.await {
            warn!("⚠️ La tarea de actividad terminó con error: {}", e);
        }
        info!("🛑 Tarea de actividad detenida");
    }
}

pub struct MarketActivityTask;

impl MarketActivityTask {
    pub fn spawn(service: Arc<MarketplaceService>, period: Duration, mut rng: StdRng) -> ActivityHandle {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

        let join = tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // el primer tick es inmediato
            ticker.tick().await;

            info!("⏱️ Tarea de actividad cada {:?}", period);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        match tick(&service, &mut rng).await {
                            Ok(event) => debug!("Actividad: {:?}", event),
                            Err(e) => warn!("⚠️ Error en tick de actividad: {}", e),
                        }
                    }
                    changed = shutdown_rx.changed() => {
                        if changed.is_err() || *shutdown_rx.borrow() {
                            break;
                        }
                    }
                }
            }
        });

        ActivityHandle { shutdown_tx, join }
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;
    use crate::repositories::{MemoryListingRepository, MemoryUserRepository};
    use crate::services::enrichment_service::FixedDetailGenerator;

    fn service() -> Arc<MarketplaceService> {
        Arc::new(MarketplaceService::new(
            Arc::new(MemoryListingRepository::new()),
            Arc::new(MemoryUserRepository::new()),
            Arc::new(FixedDetailGenerator),
        ))
    }

    #[test]
    fn test_random_listing_within_ranges() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..50 {
            let new = random_new_listing(&mut rng);
            assert!((2018..=2023).contains(&new.year));
            assert!((5_000..=50_000).contains(&new.km_driven));
            assert!((500_000..=4_000_000).contains(&new.price));
            assert!(BRANDS.contains(&new.brand.as_str()));
            assert!(MODELS.contains(&new.model.as_str()));
            assert!(LOCATIONS.contains(&new.location.as_str()));
        }
    }

    #[tokio::test]
    async fn test_ticks_only_grow_the_market() {
        let service = service();
        service.seed_sample_data().await.unwrap();
        let views_before: u64 = service.all_listings().await.unwrap().iter().map(|l| l.views).sum();

        let mut rng = StdRng::seed_from_u64(3);
        let mut listed = 0;
        let mut viewed = 0;
        for _ in 0..20 {
            match tick(&service, &mut rng).await.unwrap() {
                ActivityEvent::Listed(_) => listed += 1,
                ActivityEvent::Viewed(_) => viewed += 1,
                ActivityEvent::Idle => panic!("market is not empty"),
            }
        }

        let all = service.all_listings().await.unwrap();
        assert_eq!(all.len(), 6 + listed);
        let views_after: u64 = all.iter().map(|l| l.views).sum();
        let new_listing_views = listed as u64 * 100;
        assert_eq!(views_after, views_before + viewed as u64 + new_listing_views);
    }

    #[tokio::test]
    async fn test_shutdown_stops_task() {
        let service = service();
        let handle = MarketActivityTask::spawn(
            service.clone(),
            Duration::from_millis(5),
            StdRng::seed_from_u64(1),
        );
        tokio::time::sleep(Duration::from_millis(40)).await;
        handle.shutdown().await;

        let count = service.all_listings().await.unwrap().len();
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(service.all_listings().await.unwrap().len(), count);
    }
}
