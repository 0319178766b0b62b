//! Configuración de conexión a PostgreSQL
//!
//! Este módulo abre el pool de conexiones del almacén de documentos y aplica
//! las migraciones de `migrations/`.

use anyhow::Result;
use sqlx::PgPool;
use tracing::info;

use crate::config::database::DatabaseConfig;

/// Conexión a la base de datos con su pool
#[derive(Clone)]
pub struct DatabaseConnection {
    pool: PgPool,
}

impl DatabaseConnection {
    /// Conectar y aplicar migraciones
    pub async fn connect(database_url: &str) -> Result<Self> {
        info!("🔗 Conectando a PostgreSQL: {}", mask_database_url(database_url));

        let pool = DatabaseConfig::new(database_url).create_pool().await?;
        run_migrations(&pool).await?;

        info!("✅ PostgreSQL conectado y migrado");
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Cerrar el pool al apagar el servidor
    pub async fn close(&self) {
        self.pool.close().await;
        info!("🔌 Pool de PostgreSQL cerrado");
    }
}

/// Ejecutar migraciones de la base de datos
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

/// Función helper para enmascarar la URL de la base de datos en logs
fn mask_database_url(url: &str) -> String {
    match (url.find("://"), url.rfind('@')) {
        (Some(scheme_end), Some(at_pos)) if at_pos > scheme_end => {
            format!("{}***:***@{}", &url[..scheme_end + 3], &url[at_pos + 1..])
        }
        _ => url.to_string(),
    }
}
