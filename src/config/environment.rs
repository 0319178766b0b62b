//! Configuración de variables de entorno
//!
//! Este módulo maneja la configuración del entorno y variables de configuración.
//! Todas las variables tienen un valor por defecto razonable para desarrollo.

use std::env;
use std::str::FromStr;

/// Backend de almacenamiento de anuncios y usuarios
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Memory,
    Postgres,
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "memory" | "in-memory" => Ok(StorageBackend::Memory),
            "postgres" | "postgresql" => Ok(StorageBackend::Postgres),
            other => Err(format!("Unknown storage backend '{}'", other)),
        }
    }
}

/// Configuración del entorno
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    pub environment: String,
    pub port: u16,
    pub host: String,
    pub jwt_secret: String,
    pub jwt_expiration: u64,
    pub cors_origins: Vec<String>,
    pub storage_backend: StorageBackend,
    pub database_url: Option<String>,
    pub model_path: String,
    pub activity_interval_secs: u64,
    pub seed_sample_data: bool,
}

fn var_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn parsed_or<T: FromStr>(name: &str, default: T) -> T {
    match env::var(name) {
        Ok(raw) => match raw.parse() {
            Ok(value) => value,
            Err(_) => {
                tracing::warn!("⚠️ {} inválido ('{}'), usando valor por defecto", name, raw);
                default
            }
        },
        Err(_) => default,
    }
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            port: 5000,
            host: "0.0.0.0".to_string(),
            jwt_secret: "change-me-in-production".to_string(),
            jwt_expiration: 86_400,
            cors_origins: Vec::new(),
            storage_backend: StorageBackend::Memory,
            database_url: None,
            model_path: "car_price_model.json".to_string(),
            activity_interval_secs: 60,
            seed_sample_data: true,
        }
    }
}

impl EnvironmentConfig {
    /// Leer la configuración desde variables de entorno
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            environment: var_or("ENVIRONMENT", &defaults.environment),
            port: parsed_or("PORT", defaults.port),
            host: var_or("HOST", &defaults.host),
            jwt_secret: var_or("JWT_SECRET", &defaults.jwt_secret),
            jwt_expiration: parsed_or("JWT_EXPIRATION", defaults.jwt_expiration),
            cors_origins: env::var("CORS_ORIGINS")
                .map(|raw| {
                    raw.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
            storage_backend: parsed_or("STORAGE_BACKEND", defaults.storage_backend),
            database_url: env::var("DATABASE_URL").ok(),
            model_path: var_or("MODEL_PATH", &defaults.model_path),
            activity_interval_secs: parsed_or("ACTIVITY_INTERVAL_SECS", defaults.activity_interval_secs),
            seed_sample_data: parsed_or("SEED_SAMPLE_DATA", defaults.seed_sample_data),
        }
    }

    /// Verificar si estamos en modo desarrollo
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// Verificar si estamos en modo producción
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Obtener la dirección de escucha del servidor
    pub fn server_url(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_backend_parse() {
        assert_eq!("memory".parse::<StorageBackend>(), Ok(StorageBackend::Memory));
        assert_eq!("PostgreSQL".parse::<StorageBackend>(), Ok(StorageBackend::Postgres));
        assert!("mongo".parse::<StorageBackend>().is_err());
    }

    #[test]
    fn test_defaults() {
        let config = EnvironmentConfig::default();
        assert!(config.is_development());
        assert!(!config.is_production());
        assert_eq!(config.server_url(), "0.0.0.0:5000");
        assert_eq!(config.activity_interval_secs, 60);
    }
}
