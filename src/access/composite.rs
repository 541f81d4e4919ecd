//! Composite access gates.
//!
//! A gate is an ordered list of [`Rule`]s. Rules are tried in order and the
//! first one answering `Ok(true)` grants access. `Ok(false)` and unmet
//! preconditions fall through to the next rule; when none is left the gate
//! fails with one `AccessDenied` error and the individual reasons are dropped.
//! A store failure aborts the walk instead of counting as a refusal.

use anyhow::anyhow;
use tracing::{debug, instrument, warn};

use reservo_core::{AppError, ErrorKind};
use reservo_db::Store;
use reservo_models::{ClassroomId, RequestId, UserId};

use super::predicates;
use crate::metrics::track_access_decision;

const DEPARTMENT_DENIAL: &str =
    "Access denied. User is neither an administrator nor a manager of the specified department.";
const REQUEST_DENIAL: &str =
    "Access denied. User does not have the necessary administrative or managerial rights for the request.";
const ADMIN_DENIAL: &str = "Access denied. User is not an administrator.";

/// One way a caller can be entitled to act.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    Admin,
    ManagerOfDepartmentByClassroom(ClassroomId),
    ManagerOfAnotherUsersDepartment(UserId),
    ClassroomManagerInRequest(RequestId),
    DepartmentManagerInRequest(RequestId),
}

impl Rule {
    pub fn name(&self) -> &'static str {
        match self {
            Rule::Admin => "admin",
            Rule::ManagerOfDepartmentByClassroom(_) => "manager_of_department_by_classroom",
            Rule::ManagerOfAnotherUsersDepartment(_) => "manager_of_another_users_department",
            Rule::ClassroomManagerInRequest(_) => "classroom_manager_in_request",
            Rule::DepartmentManagerInRequest(_) => "department_manager_in_request",
        }
    }

    pub async fn holds(&self, store: &dyn Store, login: &str) -> Result<bool, AppError> {
        match *self {
            Rule::Admin => predicates::is_admin(store, login).await,
            Rule::ManagerOfDepartmentByClassroom(classroom_id) => {
                predicates::is_manager_of_department_by_classroom(store, login, classroom_id).await
            }
            Rule::ManagerOfAnotherUsersDepartment(user_id) => {
                predicates::is_manager_of_another_users_department(store, login, user_id).await
            }
            Rule::ClassroomManagerInRequest(request_id) => {
                predicates::is_classroom_manager_in_request(store, login, request_id).await
            }
            Rule::DepartmentManagerInRequest(request_id) => {
                predicates::is_department_manager_in_request(store, login, request_id).await
            }
        }
    }
}

/// Returns the first rule that holds.
pub async fn first_granted(
    store: &dyn Store,
    login: &str,
    rules: &[Rule],
    denial: &'static str,
) -> Result<Rule, AppError> {
    for rule in rules {
        match rule.holds(store, login).await {
            Ok(true) => {
                debug!(login, rule = rule.name(), "Access granted");
                track_access_decision(rule.name(), true);
                return Ok(*rule);
            }
            Ok(false) => debug!(login, rule = rule.name(), "Rule does not hold"),
            Err(err) if err.kind == ErrorKind::Internal => return Err(err),
            Err(err) => debug!(login, rule = rule.name(), reason = %err, "Rule not applicable"),
        }
    }

    warn!(login, rules = rules.len(), "Access denied");
    track_access_decision("none", false);
    Err(AppError::access_denied(anyhow!(denial)))
}

#[instrument(skip(store))]
pub async fn is_admin_or_manager_of_department_by_classroom(
    store: &dyn Store,
    login: &str,
    classroom_id: ClassroomId,
) -> Result<Rule, AppError> {
    first_granted(
        store,
        login,
        &[
            Rule::Admin,
            Rule::ManagerOfDepartmentByClassroom(classroom_id),
        ],
        DEPARTMENT_DENIAL,
    )
    .await
}

#[instrument(skip(store))]
pub async fn is_admin_or_manager_of_another_users_department(
    store: &dyn Store,
    login: &str,
    user_id: UserId,
) -> Result<Rule, AppError> {
    first_granted(
        store,
        login,
        &[Rule::Admin, Rule::ManagerOfAnotherUsersDepartment(user_id)],
        DEPARTMENT_DENIAL,
    )
    .await
}

#[instrument(skip(store))]
pub async fn is_admin_or_manager_in_request(
    store: &dyn Store,
    login: &str,
    request_id: RequestId,
) -> Result<Rule, AppError> {
    first_granted(
        store,
        login,
        &[
            Rule::Admin,
            Rule::ClassroomManagerInRequest(request_id),
            Rule::DepartmentManagerInRequest(request_id),
        ],
        REQUEST_DENIAL,
    )
    .await
}

/// Gate for admin-only routes. An unknown caller keeps its `Unauthorized`
/// error; a known non-admin is denied.
#[instrument(skip(store))]
pub async fn require_admin(store: &dyn Store, login: &str) -> Result<(), AppError> {
    if predicates::is_admin(store, login).await? {
        track_access_decision(Rule::Admin.name(), true);
        Ok(())
    } else {
        warn!(login, "Access denied, caller is not an administrator");
        track_access_decision("none", false);
        Err(AppError::access_denied(anyhow!(ADMIN_DENIAL)))
    }
}

/// Gate for routes open to any registered user.
pub async fn require_authenticated(store: &dyn Store, login: &str) -> Result<(), AppError> {
    predicates::is_authenticated(store, login).await.map(|_| ())
}
