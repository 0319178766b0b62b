//! DTOs de la API
//!
//! Requests y responses de los endpoints JSON y de formulario.

pub mod api_response;
pub mod auth_dto;
pub mod listing_dto;
pub mod prediction_dto;

pub use api_response::ApiResponse;
