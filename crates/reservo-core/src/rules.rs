//! Field constraints shared by every entry point that writes entities.
//!
//! Lengths are counted in characters, not bytes.

use chrono::NaiveDateTime;
use thiserror::Error;
use validator::ValidateLength;

pub const SHORT_TEXT_MAX: u64 = 50;
pub const LONG_TEXT_MAX: u64 = 100;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleViolation {
    #[error("Invalid {field} length. {label} must be {min}-{max} characters long.")]
    Length {
        field: &'static str,
        label: &'static str,
        min: u64,
        max: u64,
    },
    #[error("Invalid dates. The end date must be after the start date.")]
    DateOrder,
    #[error("Invalid {field}. The {field} cannot be cleared.")]
    Required { field: &'static str },
}

fn length(
    value: &str,
    field: &'static str,
    label: &'static str,
    max: u64,
) -> Result<(), RuleViolation> {
    if value.validate_length(Some(1), Some(max), None) {
        Ok(())
    } else {
        Err(RuleViolation::Length {
            field,
            label,
            min: 1,
            max,
        })
    }
}

pub fn building_name(value: &str) -> Result<(), RuleViolation> {
    length(value, "name", "Name", SHORT_TEXT_MAX)
}

pub fn building_address(value: &str) -> Result<(), RuleViolation> {
    length(value, "address", "Address", LONG_TEXT_MAX)
}

pub fn classroom_name(value: &str) -> Result<(), RuleViolation> {
    length(value, "name", "Name", SHORT_TEXT_MAX)
}

pub fn department_full_name(value: &str) -> Result<(), RuleViolation> {
    length(value, "full name", "Full name", LONG_TEXT_MAX)
}

pub fn department_code_name(value: &str) -> Result<(), RuleViolation> {
    length(value, "code name", "Code name", SHORT_TEXT_MAX)
}

pub fn user_first_name(value: &str) -> Result<(), RuleViolation> {
    length(value, "first name", "Name", LONG_TEXT_MAX)
}

pub fn user_last_name(value: &str) -> Result<(), RuleViolation> {
    length(value, "last name", "Name", LONG_TEXT_MAX)
}

pub fn user_login(value: &str) -> Result<(), RuleViolation> {
    length(value, "login", "Login", SHORT_TEXT_MAX)
}

/// A reservation must end strictly after it starts.
pub fn request_dates(start: NaiveDateTime, end: NaiveDateTime) -> Result<(), RuleViolation> {
    if start < end {
        Ok(())
    } else {
        Err(RuleViolation::DateOrder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_short_text_bounds() {
        assert!(building_name("A").is_ok());
        assert!(building_name(&"a".repeat(50)).is_ok());
        assert!(building_name("").is_err());
        assert!(building_name(&"a".repeat(51)).is_err());
    }

    #[test]
    fn test_long_text_bounds() {
        assert!(building_address(&"a".repeat(100)).is_ok());
        assert!(building_address(&"a".repeat(101)).is_err());
        assert!(department_full_name(&"a".repeat(100)).is_ok());
        assert!(user_first_name(&"a".repeat(101)).is_err());
    }

    #[test]
    fn test_length_counts_characters() {
        // 50 two-byte characters is still 50 characters
        assert!(user_login(&"é".repeat(50)).is_ok());
    }

    #[test]
    fn test_violation_names_field_and_bound() {
        let err = department_code_name("").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid code name length. Code name must be 1-50 characters long."
        );

        let err = user_last_name("").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid last name length. Name must be 1-100 characters long."
        );
    }

    #[test]
    fn test_dates_must_be_strictly_ordered() {
        assert!(request_dates(at(9), at(10)).is_ok());
        assert_eq!(request_dates(at(10), at(10)), Err(RuleViolation::DateOrder));
        assert_eq!(request_dates(at(11), at(10)), Err(RuleViolation::DateOrder));
    }
}
