//! # Reservo Auth
//!
//! Bearer credentials for the Reservo API. Tokens carry the caller's login
//! as their subject; the login is the only identity the rest of the system
//! consumes.
//!
//! - [`claims`]: access and refresh token claims
//! - [`jwt`]: issuing and verifying tokens
//!
//! # Example
//!
//! ```ignore
//! use reservo_auth::{create_access_token, verify_token};
//! use reservo_config::JwtConfig;
//!
//! let config = JwtConfig::from_env();
//! let token = create_access_token("jdoe", &config)?;
//! let claims = verify_token(&token, &config)?;
//! assert_eq!(claims.sub, "jdoe");
//! ```

pub mod claims;
pub mod jwt;

pub use claims::{Claims, RefreshTokenClaims};
pub use jwt::{create_access_token, create_refresh_token, verify_refresh_token, verify_token};
