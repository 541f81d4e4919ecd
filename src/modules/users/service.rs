use anyhow::anyhow;
use chrono::Utc;
use tracing::{debug, info, instrument};

use reservo_core::{AppError, rules};
use reservo_db::prelude::*;
use reservo_models::{
    CreateUserDto, NewUser, UpdateUserDto, User, UserChanges, UserId, UserResponse,
    UsersResponse,
};

use crate::metrics::track_entity_created;

pub struct UserService;

impl UserService {
    #[instrument(skip(store, dto), fields(user.login = %dto.login))]
    pub async fn create_user(
        store: &dyn Store,
        dto: CreateUserDto,
    ) -> Result<UserResponse, AppError> {
        rules::user_first_name(&dto.first_name)?;
        rules::user_last_name(&dto.last_name)?;
        rules::user_login(&dto.login)?;

        if store.user_by_login(&dto.login).await?.is_some() {
            return Err(AppError::conflict(anyhow!(
                "The login '{}' is already in use. Please choose a different login.",
                dto.login
            )));
        }

        let user = store
            .insert_user(&NewUser {
                first_name: dto.first_name,
                last_name: dto.last_name,
                login: dto.login,
                is_admin: dto.is_admin,
                registration_date: Utc::now().naive_utc(),
            })
            .await?;
        info!(user.id = %user.id, is_admin = user.is_admin, "User created");
        track_entity_created("user");

        Self::view(store, user).await
    }

    /// Every referenced department and classroom is resolved before the
    /// single write. `new_occupied_classroom_ids` replaces the whole set.
    #[instrument(skip(store, dto))]
    pub async fn update_user(
        store: &dyn Store,
        id: UserId,
        dto: UpdateUserDto,
    ) -> Result<UserResponse, AppError> {
        Self::load(store, id).await?;
        let mut changes = UserChanges::default();

        if let Some(first_name) = dto.new_first_name.into_required("first name")? {
            rules::user_first_name(&first_name)?;
            changes.first_name = Some(first_name);
        }
        if let Some(last_name) = dto.new_last_name.into_required("last name")? {
            rules::user_last_name(&last_name)?;
            changes.last_name = Some(last_name);
        }
        if let Some(department_id) = dto.new_department_id.into_change() {
            if let Some(department_id) = department_id
                && store.department_by_id(department_id).await?.is_none()
            {
                return Err(AppError::not_found(anyhow!(
                    "No department found with ID: {}",
                    department_id
                )));
            }
            changes.department_id = Some(department_id);
        }

        if let Some(ids) = dto.new_occupied_classroom_ids.into_change() {
            let mut ids = ids.unwrap_or_default();
            for classroom_id in &ids {
                if store.classroom_by_id(*classroom_id).await?.is_none() {
                    return Err(AppError::not_found(anyhow!(
                        "No classroom found with ID: {}",
                        classroom_id
                    )));
                }
            }
            ids.sort();
            ids.dedup();
            debug!(user.id = %id, count = ids.len(), "Replacing occupied classrooms");
            changes.occupied_classrooms = Some(ids);
        }

        let user = Self::stored(store.update_user(id, &changes).await?, id)?;
        info!(user.id = %user.id, "User updated");

        Self::view(store, user).await
    }

    #[instrument(skip(store))]
    pub async fn find_user(store: &dyn Store, id: UserId) -> Result<UserResponse, AppError> {
        let user = Self::load(store, id).await?;
        Self::view(store, user).await
    }

    #[instrument(skip(store))]
    pub async fn find_user_by_login(
        store: &dyn Store,
        login: &str,
    ) -> Result<UserResponse, AppError> {
        let user = store.user_by_login(login).await?.ok_or_else(|| {
            AppError::not_found(anyhow!("No user found with login: {}", login))
        })?;
        Self::view(store, user).await
    }

    #[instrument(skip(store))]
    pub async fn find_all_users(store: &dyn Store) -> Result<UsersResponse, AppError> {
        let users = store.all_users().await?;
        if users.is_empty() {
            return Err(AppError::empty_result(anyhow!(
                "No users found in the database."
            )));
        }
        let mut views = Vec::with_capacity(users.len());
        for user in users {
            views.push(Self::view(store, user).await?);
        }
        Ok(UsersResponse { users: views })
    }

    async fn load(store: &dyn Store, id: UserId) -> Result<User, AppError> {
        Self::stored(store.user_by_id(id).await?, id)
    }

    fn stored(user: Option<User>, id: UserId) -> Result<User, AppError> {
        user.ok_or_else(|| AppError::not_found(anyhow!("No user found with ID: {}", id)))
    }

    pub(crate) async fn view(store: &dyn Store, user: User) -> Result<UserResponse, AppError> {
        let managed_department = store
            .department_managed_by(user.id)
            .await?
            .map(|department| department.id);
        let managed_classrooms = store.classroom_ids_managed_by(user.id).await?;
        let occupied_classrooms = store.occupied_classroom_ids(user.id).await?;
        let authored_requests = store
            .requests_by_author(user.id)
            .await?
            .into_iter()
            .map(|request| request.id)
            .collect();
        let requests = store.request_ids_joined_by(user.id).await?;

        Ok(UserResponse {
            id: user.id,
            first_name: user.first_name,
            last_name: user.last_name,
            login: user.login,
            registration_date: user.registration_date,
            is_admin: user.is_admin,
            department: user.department_id,
            managed_department,
            managed_classrooms,
            occupied_classrooms,
            authored_requests,
            requests,
        })
    }
}
