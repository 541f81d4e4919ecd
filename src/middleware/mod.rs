//! Request extractors for cross-cutting concerns.
//!
//! - [`auth`]: the [`auth::AuthUser`] bearer-token extractor
//!
//! # Authentication Flow
//!
//! 1. Client sends `Authorization: Bearer <token>`
//! 2. `AuthUser` verifies the JWT and exposes the caller's login
//! 3. The handler asks the [`crate::access`] resolver whether that login may act
//! 4. The service runs only when the gate passes
//!
//! A missing or invalid token is answered with 401 before any domain logic runs.

pub mod auth;
