use std::sync::Arc;

use reservo_config::{CorsConfig, DatabaseConfig, JwtConfig, StoreBackend};
use reservo_db::{MemoryStore, PgStore, Store, StoreError, init_db_pool, run_migrations};
use tracing::{info, warn};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub jwt_config: JwtConfig,
    pub cors_config: CorsConfig,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            store,
            jwt_config: JwtConfig::from_env(),
            cors_config: CorsConfig::from_env(),
        }
    }
}

/// Connects to PostgreSQL and applies migrations. The in-memory store is only
/// used when `RESERVO_STORE=memory` asks for it.
pub async fn init_app_state(db_config: &DatabaseConfig) -> Result<AppState, StoreError> {
    let store: Arc<dyn Store> = match db_config.backend {
        StoreBackend::Postgres => {
            let url = db_config
                .url
                .as_deref()
                .ok_or(StoreError::MissingDatabaseUrl)?;
            let pool = init_db_pool(url, db_config).await?;
            run_migrations(&pool).await?;
            Arc::new(PgStore::new(pool))
        }
        StoreBackend::Memory => {
            warn!("Running on the in-memory store, data will not outlive the process");
            Arc::new(MemoryStore::new())
        }
    };
    info!(backend = ?db_config.backend, "Application state initialized");
    Ok(AppState::new(store))
}
