//! Administrative operations behind the `reservo-cli` binary.
//!
//! Everything here goes through the domain services, so the CLI obeys the
//! same validation and uniqueness rules as the HTTP API.

pub mod seeder;

use reservo_core::AppError;
use reservo_db::Store;
use reservo_models::{CreateUserDto, UserResponse};
use tracing::info;

use crate::modules::users::UserService;

pub async fn create_admin(
    store: &dyn Store,
    first_name: &str,
    last_name: &str,
    login: &str,
) -> Result<UserResponse, AppError> {
    let user = UserService::create_user(
        store,
        CreateUserDto {
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            login: login.to_string(),
            is_admin: true,
        },
    )
    .await?;
    info!(user.id = %user.id, "Administrator created from CLI");
    Ok(user)
}
