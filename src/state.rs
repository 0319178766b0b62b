//! Shared application state
//!
//! Este módulo define el estado compartido de la aplicación que se pasa
//! a través del router de Axum. Todo se construye en `main` (o en los tests)
//! y se inyecta aquí; no hay singletons globales.

use std::sync::Arc;

use crate::config::environment::EnvironmentConfig;
use crate::repositories::{ListingRepository, UserRepository};
use crate::services::{
    AuthService, DetailGenerator, MarketplaceService, PricePredictor, VehicleInfoService,
};
use crate::utils::jwt::JwtConfig;

#[derive(Clone)]
pub struct AppState {
    pub config: EnvironmentConfig,
    pub marketplace: Arc<MarketplaceService>,
    pub auth: Arc<AuthService>,
    /// `None` si el artefacto del modelo no se pudo cargar
    pub predictor: Option<Arc<PricePredictor>>,
    pub vehicle_info: Arc<VehicleInfoService>,
}

impl AppState {
    pub fn new(
        config: EnvironmentConfig,
        listings: Arc<dyn ListingRepository>,
        users: Arc<dyn UserRepository>,
        generator: Arc<dyn DetailGenerator>,
        predictor: Option<PricePredictor>,
        vehicle_info: VehicleInfoService,
    ) -> Self {
        let jwt = JwtConfig::from(&config);
        Self {
            marketplace: Arc::new(MarketplaceService::new(listings, users.clone(), generator)),
            auth: Arc::new(AuthService::new(users, jwt)),
            predictor: predictor.map(Arc::new),
            vehicle_info: Arc::new(vehicle_info),
            config,
        }
    }

    /// Sustituye el servicio de autenticación (p.ej. coste de bcrypt en tests)
    pub fn with_auth(mut self, auth: AuthService) -> Self {
        self.auth = Arc::new(auth);
        self
    }

    pub fn jwt_config(&self) -> &JwtConfig {
        self.auth.jwt_config()
    }

    pub fn model_loaded(&self) -> bool {
        self.predictor.is_some()
    }
}
