//! Repositorios
//!
//! Acceso a las colecciones de documentos (anuncios y usuarios) detrás de
//! traits async, con una implementación en memoria y otra en PostgreSQL.

pub mod listing_repository;
pub mod user_repository;

pub use listing_repository::{Counter, ListingRepository, MemoryListingRepository, PgListingRepository};
pub use user_repository::{MemoryUserRepository, PgUserRepository, UserRepository};
