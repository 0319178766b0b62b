//! Utilidades del sistema
//!
//! Este módulo contiene utilidades para manejo de errores, validación,
//! JWT y formateo de precios.

pub mod errors;
pub mod format;
pub mod jwt;
pub mod validation;
