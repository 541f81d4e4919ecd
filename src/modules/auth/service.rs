use anyhow::anyhow;
use tracing::{info, instrument, warn};

use reservo_auth::{create_access_token, create_refresh_token, verify_refresh_token};
use reservo_config::JwtConfig;
use reservo_core::AppError;
use reservo_db::prelude::*;
use reservo_models::{AccessTokenResponse, LoginRequest, LoginResponse, MessageResponse};

use crate::metrics::track_login;
use crate::modules::users::UserService;

pub struct AuthService;

impl AuthService {
    /// Issues a token pair for an existing login. There are no passwords;
    /// knowing the login is the credential.
    #[instrument(skip(store, dto, jwt_config), fields(login = %dto.login))]
    pub async fn login_user(
        store: &dyn Store,
        dto: LoginRequest,
        jwt_config: &JwtConfig,
    ) -> Result<LoginResponse, AppError> {
        let Some(user) = store.user_by_login(&dto.login).await? else {
            warn!("Login attempt for unknown user");
            track_login(false);
            return Err(AppError::unauthenticated(anyhow!("Invalid login.")));
        };

        let access_token = create_access_token(&user.login, jwt_config)?;
        let refresh_token = create_refresh_token(&user.login, jwt_config)?;
        info!(user.id = %user.id, "User logged in");
        track_login(true);

        Ok(LoginResponse {
            user: UserService::view(store, user).await?,
            access_token,
            refresh_token,
        })
    }

    #[instrument(skip(store, refresh_token, jwt_config))]
    pub async fn refresh_access_token(
        store: &dyn Store,
        refresh_token: &str,
        jwt_config: &JwtConfig,
    ) -> Result<AccessTokenResponse, AppError> {
        let claims = verify_refresh_token(refresh_token, jwt_config)?;
        let user = store
            .user_by_login(&claims.sub)
            .await?
            .ok_or_else(|| AppError::unauthenticated(anyhow!("User not found.")))?;

        let access_token = create_access_token(&user.login, jwt_config)?;
        info!(user.id = %user.id, "Access token refreshed");

        Ok(AccessTokenResponse { access_token })
    }

    /// Tokens are stateless; logging out only confirms the caller still exists.
    #[instrument(skip(store))]
    pub async fn logout_user(store: &dyn Store, login: &str) -> Result<MessageResponse, AppError> {
        if store.user_by_login(login).await?.is_none() {
            return Err(AppError::unauthenticated(anyhow!("Invalid login.")));
        }
        info!("User logged out");

        Ok(MessageResponse {
            message: "Logout successful.".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use chrono::Utc;
    use reservo_auth::verify_token;
    use reservo_db::MemoryStore;
    use reservo_models::NewUser;

    fn jwt_config() -> JwtConfig {
        JwtConfig {
            secret: "test-secret".to_string(),
            access_token_expiry: 1800,
            refresh_token_expiry: 86400,
        }
    }

    async fn store_with(login: &str) -> MemoryStore {
        let store = MemoryStore::new();
        store
            .insert_user(&NewUser {
                first_name: "Test".to_string(),
                last_name: "User".to_string(),
                login: login.to_string(),
                is_admin: false,
                registration_date: Utc::now().naive_utc(),
            })
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn test_login_issues_verifiable_tokens() {
        let store = store_with("ada").await;
        let config = jwt_config();

        let response = AuthService::login_user(
            &store,
            LoginRequest {
                login: "ada".to_string(),
            },
            &config,
        )
        .await
        .unwrap();

        assert_eq!(response.user.login, "ada");
        let claims = verify_token(&response.access_token, &config).unwrap();
        assert_eq!(claims.sub, "ada");
        assert!(verify_token(&response.refresh_token, &config).is_err());
    }

    #[tokio::test]
    async fn test_unknown_login_is_401() {
        let store = MemoryStore::new();
        let err = AuthService::login_user(
            &store,
            LoginRequest {
                login: "ghost".to_string(),
            },
            &jwt_config(),
        )
        .await
        .unwrap_err();

        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
        assert_eq!(err.message(), "Invalid login.");
    }

    #[tokio::test]
    async fn test_refresh_rejects_access_token() {
        let store = store_with("ada").await;
        let config = jwt_config();
        let access = create_access_token("ada", &config).unwrap();
        let refresh = create_refresh_token("ada", &config).unwrap();

        assert!(
            AuthService::refresh_access_token(&store, &access, &config)
                .await
                .is_err()
        );
        let refreshed = AuthService::refresh_access_token(&store, &refresh, &config)
            .await
            .unwrap();
        assert_eq!(
            verify_token(&refreshed.access_token, &config).unwrap().sub,
            "ada"
        );
    }
}
