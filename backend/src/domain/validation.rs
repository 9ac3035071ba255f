//! Input checks shared by the domain services.

use shared::dates;

use super::errors::{DomainError, DomainResult};

pub const MAX_DESCRIPTION_LEN: usize = 256;

/// A strictly positive, finite amount
pub fn positive_amount(field: &str, value: f64) -> DomainResult<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(DomainError::validation(format!("{} must be greater than 0", field)));
    }
    Ok(())
}

/// A finite amount that may be zero
pub fn non_negative_amount(field: &str, value: f64) -> DomainResult<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(DomainError::validation(format!("{} cannot be negative", field)));
    }
    Ok(())
}

pub fn non_empty(field: &str, value: &str) -> DomainResult<()> {
    if value.trim().is_empty() {
        return Err(DomainError::validation(format!("{} cannot be empty", field)));
    }
    Ok(())
}

pub fn description(value: &str) -> DomainResult<()> {
    non_empty("Description", value)?;
    if value.chars().count() > MAX_DESCRIPTION_LEN {
        return Err(DomainError::validation(format!(
            "Description cannot exceed {} characters",
            MAX_DESCRIPTION_LEN
        )));
    }
    Ok(())
}

/// `YYYY-MM-DD`
pub fn date(field: &str, value: &str) -> DomainResult<()> {
    if dates::parse_date(value).is_none() {
        return Err(DomainError::validation(format!(
            "{} must be a valid date (YYYY-MM-DD)",
            field
        )));
    }
    Ok(())
}

/// `YYYY-MM`
pub fn month(value: &str) -> DomainResult<()> {
    if dates::parse_month(value).is_none() {
        return Err(DomainError::validation("Month must be in YYYY-MM format"));
    }
    Ok(())
}

pub fn salary_day(value: u32) -> DomainResult<()> {
    if !(1..=31).contains(&value) {
        return Err(DomainError::validation("Salary day must be between 1 and 31"));
    }
    Ok(())
}
