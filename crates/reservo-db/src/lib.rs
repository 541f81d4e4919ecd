//! # Reservo DB
//!
//! The entity store port ([`Store`]) and its two adapters:
//!
//! - [`PgStore`]: PostgreSQL through `sqlx`, used by the server and the CLI
//! - [`MemoryStore`]: in-process tables, used by tests and database-less runs

pub mod error;
pub mod memory;
pub mod postgres;
pub mod store;

use reservo_config::DatabaseConfig;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::info;

pub use error::StoreError;
pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use store::{BuildingStore, ClassroomStore, DepartmentStore, RequestStore, Store, UserStore};

/// Brings every store trait into scope so their methods resolve on
/// `&dyn Store` and on concrete adapters alike.
pub mod prelude {
    pub use crate::store::{
        BuildingStore, ClassroomStore, DepartmentStore, RequestStore, Store, UserStore,
    };
}

pub async fn init_db_pool(url: &str, config: &DatabaseConfig) -> Result<PgPool, StoreError> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(url)
        .await?;
    info!(
        max_connections = config.max_connections,
        "Database pool ready"
    );
    Ok(pool)
}

pub async fn run_migrations(pool: &PgPool) -> Result<(), StoreError> {
    sqlx::migrate!("../../migrations").run(pool).await?;
    info!("Database migrations applied");
    Ok(())
}
