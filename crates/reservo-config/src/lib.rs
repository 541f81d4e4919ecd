//! # Reservo Config
//!
//! Configuration structures loaded from environment variables:
//!
//! - [`jwt`]: token signing secret and lifetimes
//! - [`cors`]: allowed browser origins
//! - [`server`]: listener and database settings
//!
//! # Example
//!
//! ```ignore
//! use reservo_config::{CorsConfig, JwtConfig, ServerConfig};
//!
//! let jwt_config = JwtConfig::from_env();
//! let cors_config = CorsConfig::from_env();
//! let server_config = ServerConfig::from_env();
//! ```

pub mod cors;
pub mod jwt;
pub mod server;

pub use cors::CorsConfig;
pub use jwt::JwtConfig;
pub use server::{DatabaseConfig, ServerConfig, StoreBackend};

use std::env;
use std::str::FromStr;

/// `key` parsed from the environment, or `default` when it is unset or does
/// not parse.
pub(crate) fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_or_falls_back_when_unset() {
        assert_eq!(env_or("RESERVO_TEST_UNSET_PORT", 3000u16), 3000);
        assert_eq!(
            env_or("RESERVO_TEST_UNSET_HOST", "0.0.0.0".to_string()),
            "0.0.0.0"
        );
    }
}
