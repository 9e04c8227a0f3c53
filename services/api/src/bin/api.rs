//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{Argon2Hasher, DbAdapter, GoogleIdentityAdapter, InMemoryDatabase, InMemoryKeyValueStore},
    config::{Config, StorageBackend},
    error::ApiError,
    web::{router, state::AppState},
};
use medilog_core::ports::{DatabaseService, ExternalIdentityProvider, KeyValueStore};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Connect to Storage & Run Migrations ---
    let (db, kv): (Arc<dyn DatabaseService>, Arc<dyn KeyValueStore>) = match &config.storage {
        StorageBackend::Memory => {
            warn!("Using in-memory storage; nothing survives a restart.");
            let db: Arc<dyn DatabaseService> = Arc::new(InMemoryDatabase::new());
            let kv: Arc<dyn KeyValueStore> = Arc::new(InMemoryKeyValueStore::new());
            (db, kv)
        }
        StorageBackend::Postgres(url) => {
            info!("Connecting to database...");
            let db_pool = PgPoolOptions::new().max_connections(5).connect(url).await?;
            let db_adapter = Arc::new(DbAdapter::new(db_pool));
            info!("Running database migrations...");
            db_adapter.run_migrations().await?;
            info!("Database migrations complete.");
            let db: Arc<dyn DatabaseService> = db_adapter.clone();
            let kv: Arc<dyn KeyValueStore> = db_adapter;
            (db, kv)
        }
    };

    // --- 3. Initialize Service Adapters ---
    let external: Option<Arc<dyn ExternalIdentityProvider>> = match &config.google_client_id {
        Some(client_id) => {
            let google: Arc<dyn ExternalIdentityProvider> =
                Arc::new(GoogleIdentityAdapter::new(client_id.clone())?);
            Some(google)
        }
        None => {
            info!("GOOGLE_CLIENT_ID not set; Google sign-in is disabled.");
            None
        }
    };

    // --- 4. Build the Shared AppState ---
    let app_state = Arc::new(AppState::new(
        config.clone(),
        db,
        kv,
        Arc::new(Argon2Hasher::default()),
        external,
    ));

    // --- 5. Create the Web Router ---
    let app = router(app_state)?;

    // --- 6. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
