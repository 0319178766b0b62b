//! Controllers HTTP
//!
//! Handlers de Axum que traducen requests a llamadas de servicio y envuelven
//! el resultado en `ApiResponse`.

pub mod auth_controller;
pub mod car_controller;
pub mod listing_controller;
pub mod prediction_controller;
