//! Primitive access predicates.
//!
//! Each predicate answers `Ok(true)` / `Ok(false)` once its preconditions
//! hold (caller exists, target exists) and fails with an
//! [`ErrorKind::Unauthorized`](reservo_core::ErrorKind::Unauthorized) error
//! naming the first precondition that does not. Store failures surface as
//! `Internal`.

use anyhow::anyhow;
use tracing::instrument;

use reservo_core::AppError;
use reservo_db::prelude::*;
use reservo_models::{
    Classroom, ClassroomId, Department, DepartmentId, Request, RequestId, User, UserId,
};

const INVALID_LOGIN: &str = "Invalid login.";
const UNKNOWN_LOGIN: &str = "User with such login does not exist.";
const UNKNOWN_MANAGER: &str = "Manager with such login does not exist.";
const UNKNOWN_USER: &str = "User with such ID does not exist.";
const MISSING_DEPARTMENT: &str = "Department does not exist.";
const MISSING_USER_DEPARTMENT: &str = "Department for the given user does not exist.";
const MISSING_CLASSROOM: &str = "Classroom does not exist.";
const MISSING_REQUEST: &str = "Request does not exist.";

async fn caller(store: &dyn Store, login: &str, missing: &'static str) -> Result<User, AppError> {
    store
        .user_by_login(login)
        .await?
        .ok_or_else(|| AppError::unauthorized(anyhow!(missing)))
}

async fn department(
    store: &dyn Store,
    id: Option<DepartmentId>,
    missing: &'static str,
) -> Result<Department, AppError> {
    let department = match id {
        Some(id) => store.department_by_id(id).await?,
        None => None,
    };
    department.ok_or_else(|| AppError::unauthorized(anyhow!(missing)))
}

async fn classroom(store: &dyn Store, id: Option<ClassroomId>) -> Result<Classroom, AppError> {
    let classroom = match id {
        Some(id) => store.classroom_by_id(id).await?,
        None => None,
    };
    classroom.ok_or_else(|| AppError::unauthorized(anyhow!(MISSING_CLASSROOM)))
}

async fn request(store: &dyn Store, id: RequestId) -> Result<Request, AppError> {
    store
        .request_by_id(id)
        .await?
        .ok_or_else(|| AppError::unauthorized(anyhow!(MISSING_REQUEST)))
}

fn manages(department: &Department, user: &User) -> bool {
    department.manager_id == Some(user.id)
}

#[instrument(skip(store))]
pub async fn is_authenticated(store: &dyn Store, login: &str) -> Result<bool, AppError> {
    caller(store, login, UNKNOWN_LOGIN).await?;
    Ok(true)
}

/// `Ok(false)` for an existing non-admin; gates turn that into a denial.
#[instrument(skip(store))]
pub async fn is_admin(store: &dyn Store, login: &str) -> Result<bool, AppError> {
    let user = caller(store, login, UNKNOWN_LOGIN).await?;
    Ok(user.is_admin)
}

#[instrument(skip(store))]
pub async fn is_classroom_occupant(
    store: &dyn Store,
    login: &str,
    classroom_id: ClassroomId,
) -> Result<bool, AppError> {
    let user = caller(store, login, INVALID_LOGIN).await?;
    let occupied = store.occupied_classroom_ids(user.id).await?;
    Ok(occupied.contains(&classroom_id))
}

#[instrument(skip(store))]
pub async fn is_classroom_manager(
    store: &dyn Store,
    login: &str,
    classroom_id: ClassroomId,
) -> Result<bool, AppError> {
    let user = caller(store, login, INVALID_LOGIN).await?;
    let managed = store.classroom_ids_managed_by(user.id).await?;
    Ok(managed.contains(&classroom_id))
}

#[instrument(skip(store))]
pub async fn is_department_occupant(
    store: &dyn Store,
    login: &str,
    department_id: DepartmentId,
) -> Result<bool, AppError> {
    let user = caller(store, login, INVALID_LOGIN).await?;
    Ok(user.department_id == Some(department_id))
}

#[instrument(skip(store))]
pub async fn is_department_manager(
    store: &dyn Store,
    login: &str,
    department_id: DepartmentId,
) -> Result<bool, AppError> {
    let user = caller(store, login, INVALID_LOGIN).await?;
    let department = department(store, Some(department_id), MISSING_DEPARTMENT).await?;
    Ok(manages(&department, &user))
}

#[instrument(skip(store))]
pub async fn is_manager_of_department_by_classroom(
    store: &dyn Store,
    login: &str,
    classroom_id: ClassroomId,
) -> Result<bool, AppError> {
    let user = caller(store, login, INVALID_LOGIN).await?;
    let classroom = classroom(store, Some(classroom_id)).await?;
    let department = department(store, classroom.department_id, MISSING_DEPARTMENT).await?;
    Ok(manages(&department, &user))
}

#[instrument(skip(store))]
pub async fn is_manager_of_another_users_department(
    store: &dyn Store,
    manager_login: &str,
    user_id: UserId,
) -> Result<bool, AppError> {
    let manager = caller(store, manager_login, UNKNOWN_MANAGER).await?;
    let user = store
        .user_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::unauthorized(anyhow!(UNKNOWN_USER)))?;
    let department = department(store, user.department_id, MISSING_USER_DEPARTMENT).await?;
    Ok(manages(&department, &manager))
}

/// A request without a classroom has no classroom manager: `Ok(false)`.
#[instrument(skip(store))]
pub async fn is_classroom_manager_in_request(
    store: &dyn Store,
    login: &str,
    request_id: RequestId,
) -> Result<bool, AppError> {
    let user = caller(store, login, INVALID_LOGIN).await?;
    let request = request(store, request_id).await?;
    let Some(classroom_id) = request.classroom_id else {
        return Ok(false);
    };
    let managed = store.classroom_ids_managed_by(user.id).await?;
    Ok(managed.contains(&classroom_id))
}

/// Checks the manager of the department that owns the request's classroom.
#[instrument(skip(store))]
pub async fn is_department_manager_in_request(
    store: &dyn Store,
    login: &str,
    request_id: RequestId,
) -> Result<bool, AppError> {
    let user = caller(store, login, INVALID_LOGIN).await?;
    let request = request(store, request_id).await?;
    let classroom = classroom(store, request.classroom_id).await?;
    let department = department(store, classroom.department_id, MISSING_DEPARTMENT).await?;
    Ok(manages(&department, &user))
}
