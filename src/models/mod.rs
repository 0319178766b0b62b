//! Modelos del sistema
//!
//! Este módulo contiene los modelos de datos que se almacenan como documentos
//! (anuncios y usuarios).

pub mod listing;
pub mod user;

pub use listing::*;
pub use user::*;
