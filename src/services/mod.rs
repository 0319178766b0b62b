//! Services module
//!
//! Este módulo contiene la lógica de negocio del marketplace: búsqueda,
//! similitud, enriquecimiento de anuncios, autenticación, predicción de
//! precios e información de vehículos.

pub mod activity_task;
pub mod auth_service;
pub mod enrichment_service;
pub mod marketplace_service;
pub mod price_predictor;
pub mod search_service;
pub mod similarity_service;
pub mod vehicle_info_service;

pub use activity_task::{ActivityHandle, MarketActivityTask};
pub use auth_service::AuthService;
pub use enrichment_service::{DetailGenerator, FixedDetailGenerator, RandomDetailGenerator};
pub use marketplace_service::{MarketplaceService, MarketplaceStats};
pub use price_predictor::PricePredictor;
pub use vehicle_info_service::VehicleInfoService;
