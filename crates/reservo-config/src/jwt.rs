use crate::env_or;

const ACCESS_TOKEN_TTL_SECS: i64 = 30 * 60;
const REFRESH_TOKEN_TTL_SECS: i64 = 24 * 60 * 60;

/// Token signing settings. Lifetimes are in seconds.
#[derive(Clone, Debug)]
pub struct JwtConfig {
    pub secret: String,
    pub access_token_expiry: i64,
    pub refresh_token_expiry: i64,
}

impl JwtConfig {
    pub fn from_env() -> Self {
        Self {
            secret: env_or("JWT_SECRET", "reservo-dev-secret-change-me".to_string()),
            access_token_expiry: env_or("JWT_ACCESS_EXPIRY", ACCESS_TOKEN_TTL_SECS),
            refresh_token_expiry: env_or("JWT_REFRESH_EXPIRY", REFRESH_TOKEN_TTL_SECS),
        }
    }
}
