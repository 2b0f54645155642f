use crate::utils::error::{Result, TrekError};
use regex::Regex;
use std::sync::OnceLock;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

fn email_pattern() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| {
        Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern is a valid regex")
    })
}

fn username_pattern() -> &'static Regex {
    static USERNAME: OnceLock<Regex> = OnceLock::new();
    USERNAME.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9_.-]{3,32}$").expect("username pattern is a valid regex")
    })
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(TrekError::validation(
            field_name,
            "Value cannot be empty or whitespace-only",
        ));
    }
    Ok(())
}

/// Values end up as `Key: Value` lines, so they must stay on one line.
pub fn validate_single_line(field_name: &str, value: &str) -> Result<()> {
    if value.contains('\n') || value.contains('\r') {
        return Err(TrekError::validation(field_name, "Value must fit on one line"));
    }
    Ok(())
}

pub fn validate_username(field_name: &str, value: &str) -> Result<()> {
    if !username_pattern().is_match(value) {
        return Err(TrekError::validation(
            field_name,
            format!(
                "'{}' must be 3-32 characters of letters, digits, '_', '.' or '-'",
                value
            ),
        ));
    }
    Ok(())
}

pub fn validate_email(field_name: &str, value: &str) -> Result<()> {
    if !email_pattern().is_match(value) {
        return Err(TrekError::validation(
            field_name,
            format!("'{}' is not a valid email address", value),
        ));
    }
    Ok(())
}

pub fn validate_positive_amount(field_name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(TrekError::validation(
            field_name,
            format!("Amount must be positive, got {}", value),
        ));
    }
    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: usize, min_value: usize) -> Result<()> {
    if value < min_value {
        return Err(TrekError::validation(
            field_name,
            format!("Value must be at least {}", min_value),
        ));
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(TrekError::validation(
            field_name,
            format!("Value must be between {} and {}", min, max),
        ));
    }
    Ok(())
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(TrekError::validation(field_name, "Path cannot be empty"));
    }

    if path.contains('\0') {
        return Err(TrekError::validation(field_name, "Path contains null bytes"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_username() {
        assert!(validate_username("username", "ram_guide").is_ok());
        assert!(validate_username("username", "ab").is_err());
        assert!(validate_username("username", "has space").is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("email", "ram@guide.com").is_ok());
        assert!(validate_email("email", "ram.guide.com").is_err());
        assert!(validate_email("email", "").is_err());
    }

    #[test]
    fn test_validate_positive_amount() {
        assert!(validate_positive_amount("base_price", 1000.0).is_ok());
        assert!(validate_positive_amount("base_price", 0.0).is_err());
        assert!(validate_positive_amount("base_price", f64::NAN).is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("experience", 8u32, 0, 50).is_ok());
        assert!(validate_range("experience", 51u32, 0, 50).is_err());
    }

    #[test]
    fn test_validate_single_line() {
        assert!(validate_single_line("full_name", "Ram Bahadur").is_ok());
        assert!(validate_single_line("full_name", "Ram\nBahadur").is_err());
    }
}
