//! # Reservo Core
//!
//! Foundational types shared by every Reservo crate:
//!
//! - [`errors`]: the [`AppError`] / [`ErrorKind`] taxonomy and its HTTP mapping
//! - [`rules`]: pure field constraints (lengths, date ordering)
//! - [`patch`]: the [`Patch`] wrapper used by partial updates
//!
//! # Example
//!
//! ```ignore
//! use reservo_core::{AppError, rules};
//!
//! rules::building_name(&dto.name)?;
//! let error = AppError::not_found(anyhow::anyhow!("No building found with ID: 4"));
//! ```

pub mod errors;
pub mod patch;
pub mod rules;

pub use errors::{AppError, ErrorKind};
pub use patch::Patch;
pub use rules::RuleViolation;
