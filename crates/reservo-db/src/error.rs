use anyhow::anyhow;
use reservo_core::AppError;
use thiserror::Error;

/// Failure reported by a store adapter.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
    /// A unique key collided. Services check keys up front, so this is only
    /// reached by a concurrent writer or an update that collides.
    #[error("{0}")]
    Conflict(String),
    #[error("DATABASE_URL must be set unless RESERVO_STORE=memory")]
    MissingDatabaseUrl,
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(message) => AppError::conflict(anyhow!(message)),
            other => AppError::internal(other),
        }
    }
}

pub(crate) const BUILDING_CONFLICT: &str = "A building with this name and address already exists.";
pub(crate) const DEPARTMENT_CONFLICT: &str =
    "A department with this full name and code name already exists.";
pub(crate) const MANAGER_CONFLICT: &str = "The user already manages another department.";
pub(crate) const LOGIN_CONFLICT: &str =
    "The login is already in use. Please choose a different login.";

/// Message for a violated unique constraint, keyed by the constraint names in
/// `migrations/`.
pub(crate) fn conflict_message(constraint: Option<&str>) -> &'static str {
    match constraint {
        Some("buildings_name_address_key") => BUILDING_CONFLICT,
        Some("departments_full_name_code_name_key") => DEPARTMENT_CONFLICT,
        Some("departments_manager_id_key") => MANAGER_CONFLICT,
        Some("users_login_key") => LOGIN_CONFLICT,
        _ => "A record with the same unique key already exists.",
    }
}
