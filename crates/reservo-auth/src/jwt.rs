//! Token creation and verification.
//!
//! Access and refresh tokens are HS256 JWTs signed with
//! [`JwtConfig::secret`]. A refresh token is rejected where an access token is
//! expected because its claims carry a `jti`, and vice versa because the access
//! claims lack one.

use anyhow::anyhow;
use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use uuid::Uuid;

use reservo_config::JwtConfig;
use reservo_core::AppError;

use crate::claims::{Claims, RefreshTokenClaims};

pub fn create_access_token(login: &str, jwt_config: &JwtConfig) -> Result<String, AppError> {
    let now = Utc::now().timestamp();
    let exp = now + jwt_config.access_token_expiry;

    let claims = Claims {
        sub: login.to_string(),
        exp: exp as usize,
        iat: now as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt_config.secret.as_bytes()),
    )
    .map_err(|e| AppError::internal(anyhow!("Failed to create token: {}", e)))
}

/// Verifies signature and expiry of an access token.
pub fn verify_token(token: &str, jwt_config: &JwtConfig) -> Result<Claims, AppError> {
    let mut validation = Validation::default();
    validation.required_spec_claims.insert("sub".to_string());

    let claims = decode::<serde_json::Value>(
        token,
        &DecodingKey::from_secret(jwt_config.secret.as_bytes()),
        &validation,
    )
    .map_err(|_| AppError::unauthenticated(anyhow!("Invalid or expired token")))?
    .claims;

    if claims.get("jti").is_some() {
        return Err(AppError::unauthenticated(anyhow!("Invalid or expired token")));
    }

    serde_json::from_value(claims)
        .map_err(|_| AppError::unauthenticated(anyhow!("Invalid or expired token")))
}

pub fn create_refresh_token(login: &str, jwt_config: &JwtConfig) -> Result<String, AppError> {
    let now = Utc::now().timestamp();
    let exp = now + jwt_config.refresh_token_expiry;

    let claims = RefreshTokenClaims {
        sub: login.to_string(),
        exp: exp as usize,
        iat: now as usize,
        jti: Uuid::new_v4().to_string(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt_config.secret.as_bytes()),
    )
    .map_err(|e| AppError::internal(anyhow!("Failed to create refresh token: {}", e)))
}

pub fn verify_refresh_token(
    token: &str,
    jwt_config: &JwtConfig,
) -> Result<RefreshTokenClaims, AppError> {
    decode::<RefreshTokenClaims>(
        token,
        &DecodingKey::from_secret(jwt_config.secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::unauthenticated(anyhow!("Invalid refresh token.")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use reservo_core::ErrorKind;

    fn get_test_jwt_config() -> JwtConfig {
        JwtConfig {
            secret: "test-secret-key-at-least-32-characters-long".to_string(),
            access_token_expiry: 1800,
            refresh_token_expiry: 86400,
        }
    }

    #[test]
    fn test_access_token_round_trip_carries_login() {
        let config = get_test_jwt_config();
        let token = create_access_token("jdoe", &config).unwrap();

        let claims = verify_token(&token, &config).unwrap();
        assert_eq!(claims.sub, "jdoe");
        assert_eq!(claims.exp - claims.iat, 1800);
    }

    #[test]
    fn test_verify_token_invalid() {
        let config = get_test_jwt_config();
        let err = verify_token("invalid-token", &config).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Unauthorized);
    }

    #[test]
    fn test_verify_token_wrong_secret() {
        let config = get_test_jwt_config();
        let token = create_access_token("jdoe", &config).unwrap();

        let wrong_config = JwtConfig {
            secret: "different-secret-key-at-least-32-characters".to_string(),
            ..config
        };

        assert!(verify_token(&token, &wrong_config).is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let config = JwtConfig {
            access_token_expiry: -3600,
            ..get_test_jwt_config()
        };
        let token = create_access_token("jdoe", &config).unwrap();

        assert!(verify_token(&token, &config).is_err());
    }

    #[test]
    fn test_refresh_token_round_trip() {
        let config = get_test_jwt_config();
        let token = create_refresh_token("jdoe", &config).unwrap();

        let claims = verify_refresh_token(&token, &config).unwrap();
        assert_eq!(claims.sub, "jdoe");
        assert!(!claims.jti.is_empty());
    }

    #[test]
    fn test_refresh_tokens_are_unique() {
        let config = get_test_jwt_config();
        let first = create_refresh_token("jdoe", &config).unwrap();
        let second = create_refresh_token("jdoe", &config).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_refresh_token_not_accepted_as_access_token() {
        let config = get_test_jwt_config();
        let refresh = create_refresh_token("jdoe", &config).unwrap();
        assert!(verify_token(&refresh, &config).is_err());
    }

    #[test]
    fn test_access_token_not_accepted_as_refresh_token() {
        let config = get_test_jwt_config();
        let access = create_access_token("jdoe", &config).unwrap();
        assert!(verify_refresh_token(&access, &config).is_err());
    }
}
