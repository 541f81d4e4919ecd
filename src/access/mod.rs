//! Authorization resolver.
//!
//! Decides whether a caller (identified by login) may act on a target by
//! walking the entity graph: user → department → classroom → request.
//! Nothing is cached; every decision reads the current store.
//!
//! - [`predicates`]: single relationship checks returning `Result<bool, _>`
//! - [`composite`]: ordered rule lists used as route gates
//!
//! ```ignore
//! use crate::access;
//!
//! access::is_admin_or_manager_in_request(store, auth_user.login(), request_id).await?;
//! RequestService::approve_request(store, request_id, dto).await
//! ```

pub mod composite;
pub mod predicates;

pub use composite::{
    Rule, first_granted, is_admin_or_manager_in_request,
    is_admin_or_manager_of_another_users_department,
    is_admin_or_manager_of_department_by_classroom, require_admin, require_authenticated,
};
