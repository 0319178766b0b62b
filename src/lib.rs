//! Marketplace de coches de segunda mano
//!
//! Anuncios con datos enriquecidos, búsqueda y similitud, autenticación,
//! predicción de precios e información de cumplimiento de vehículos.

pub mod config;
pub mod controllers;
pub mod database;
pub mod dto;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;

pub use routes::create_router;
pub use state::AppState;
