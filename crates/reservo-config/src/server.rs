use std::env;

use crate::env_or;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub metrics_port: u16,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self {
            host: env_or("HOST", "0.0.0.0".to_string()),
            port: env_or("PORT", 3000),
            metrics_port: env_or("METRICS_PORT", 9100),
        }
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Which store adapter the server runs on.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StoreBackend {
    #[default]
    Postgres,
    /// Volatile in-process tables. Only chosen by `RESERVO_STORE=memory`.
    Memory,
}

impl StoreBackend {
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(value) if value.eq_ignore_ascii_case("memory") => Self::Memory,
            _ => Self::Postgres,
        }
    }
}

#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub backend: StoreBackend,
    /// `None` when `DATABASE_URL` is unset.
    pub url: Option<String>,
    pub max_connections: u32,
}

impl DatabaseConfig {
    pub fn from_env() -> Self {
        Self {
            backend: StoreBackend::parse(env::var("RESERVO_STORE").ok().as_deref()),
            url: env::var("DATABASE_URL").ok(),
            max_connections: env_or("DATABASE_MAX_CONNECTIONS", 5),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_is_opt_in() {
        assert_eq!(StoreBackend::parse(None), StoreBackend::Postgres);
        assert_eq!(StoreBackend::parse(Some("postgres")), StoreBackend::Postgres);
        assert_eq!(StoreBackend::parse(Some("memroy")), StoreBackend::Postgres);
        assert_eq!(StoreBackend::parse(Some("memory")), StoreBackend::Memory);
        assert_eq!(StoreBackend::parse(Some(" Memory ")), StoreBackend::Memory);
    }
}
