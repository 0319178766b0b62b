use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use dotenvy::dotenv;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use used_car_marketplace::config::environment::{EnvironmentConfig, StorageBackend};
use used_car_marketplace::create_router;
use used_car_marketplace::database::DatabaseConnection;
use used_car_marketplace::repositories::{
    ListingRepository, MemoryListingRepository, MemoryUserRepository, PgListingRepository,
    PgUserRepository, UserRepository,
};
use used_car_marketplace::services::{
    MarketActivityTask, PricePredictor, RandomDetailGenerator, VehicleInfoService,
};
use used_car_marketplace::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();

    // Configurar logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("🚗 Used Car Marketplace - API");
    info!("================================================");

    let config = EnvironmentConfig::from_env();

    // Almacén de anuncios y usuarios
    let mut database: Option<DatabaseConnection> = None;
    let (listings, users): (Arc<dyn ListingRepository>, Arc<dyn UserRepository>) =
        match config.storage_backend {
            StorageBackend::Memory => {
                info!("💾 Almacén en memoria");
                (
                    Arc::new(MemoryListingRepository::new()),
                    Arc::new(MemoryUserRepository::new()),
                )
            }
            StorageBackend::Postgres => {
                let url = config
                    .database_url
                    .clone()
                    .ok_or_else(|| anyhow::anyhow!("DATABASE_URL es obligatorio con STORAGE_BACKEND=postgres"))?;
                let connection = match DatabaseConnection::connect(&url).await {
                    Ok(conn) => conn,
                    Err(e) => {
                        error!("❌ Error conectando a la base de datos: {}", e);
                        return Err(anyhow::anyhow!("Error de base de datos: {}", e));
                    }
                };
                let pool = connection.pool().clone();
                database = Some(connection);
                (
                    Arc::new(PgListingRepository::new(pool.clone())),
                    Arc::new(PgUserRepository::new(pool)),
                )
            }
        };

    // Modelo de predicción: si falta, el servidor arranca igual
    let predictor = match PricePredictor::load(&config.model_path) {
        Ok(predictor) => Some(predictor),
        Err(e) => {
            warn!("⚠️ Modelo no disponible ({}): {}", config.model_path, e);
            None
        }
    };

    let state = AppState::new(
        config.clone(),
        listings,
        users,
        Arc::new(RandomDetailGenerator::from_entropy()),
        predictor,
        VehicleInfoService::from_entropy(),
    );

    if config.seed_sample_data {
        if let Err(e) = state.marketplace.seed_sample_data().await {
            warn!("⚠️ No se pudieron insertar los datos de ejemplo: {}", e);
        }
    }

    let activity = MarketActivityTask::spawn(
        state.marketplace.clone(),
        Duration::from_secs(config.activity_interval_secs.max(1)),
        StdRng::from_entropy(),
    );

    let app = create_router(state);

    let addr: SocketAddr = config.server_url().parse()?;
    info!("🌐 Servidor iniciando en http://{}", addr);
    info!("🔍 Endpoints disponibles:");
    info!("   GET  /health, /model-info");
    info!("   GET  /api/listings, /api/listings/featured, /api/listings/:id");
    info!("   POST /api/listings/:id/favorite   GET /api/listings/:id/similar");
    info!("   GET  /api/search, /api/stats, /api/brands, /api/locations");
    info!("   GET|POST /api/car   GET|PUT|DELETE /api/car/:id   POST /api/car/seed");
    info!("   POST /register, /login, /api/auth/register, /api/auth/login");
    info!("   PUT  /api/auth/password   GET /api/auth/me");
    info!("   POST /predict, /api/predict   GET /api/vehicle-info/:registration_number");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    activity.shutdown().await;
    if let Some(database) = database {
        database.close().await;
    }

    if let Err(e) = served {
        error!("❌ Error del servidor: {}", e);
        return Err(e.into());
    }

    info!("👋 Servidor terminado");
    Ok(())
}

/// Señal de apagado graceful
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("❌ No se pudo instalar el handler de Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("❌ No se pudo instalar el handler de SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("🛑 Señal Ctrl+C recibida, apagando servidor...");
        },
        _ = terminate => {
            info!("🛑 Señal de terminación recibida, apagando servidor...");
        },
    }
}
