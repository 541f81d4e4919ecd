//! Field-presence wrapper for partial updates.
//!
//! A JSON update body has three states per field: the key is absent, the key
//! is `null`, or the key carries a value. [`Patch`] keeps all three apart so an
//! explicit `false`, `0` or `null` is applied instead of being mistaken for
//! "not supplied".
//!
//! ```ignore
//! #[derive(Deserialize)]
//! struct UpdateClassroomDto {
//!     #[serde(default)]
//!     new_is_private: Patch<bool>,
//! }
//! ```

use serde::{Deserialize, Deserializer};

use crate::rules::RuleViolation;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Patch<T> {
    /// The field was not present in the body.
    #[default]
    Missing,
    /// The field was present and `null`.
    Null,
    /// The field was present with a value.
    Value(T),
}

impl<T> Patch<T> {
    pub fn is_missing(&self) -> bool {
        matches!(self, Patch::Missing)
    }

    pub fn as_ref(&self) -> Patch<&T> {
        match self {
            Patch::Missing => Patch::Missing,
            Patch::Null => Patch::Null,
            Patch::Value(value) => Patch::Value(value),
        }
    }

    /// `None` when untouched, `Some(None)` when cleared, `Some(Some(v))` when set.
    pub fn into_change(self) -> Option<Option<T>> {
        match self {
            Patch::Missing => None,
            Patch::Null => Some(None),
            Patch::Value(value) => Some(Some(value)),
        }
    }

    /// For non-nullable fields: `null` is rejected instead of clearing.
    pub fn into_required(self, field: &'static str) -> Result<Option<T>, RuleViolation> {
        match self {
            Patch::Missing => Ok(None),
            Patch::Null => Err(RuleViolation::Required { field }),
            Patch::Value(value) => Ok(Some(value)),
        }
    }
}

impl<T> From<Option<T>> for Patch<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Patch::Value(value),
            None => Patch::Null,
        }
    }
}

// Only reached when the key is present; absent keys come from `#[serde(default)]`.
impl<'de, T> Deserialize<'de> for Patch<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Patch::from)
    }
}
