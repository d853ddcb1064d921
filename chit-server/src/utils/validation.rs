//! Input validation helpers
//!
//! Centralized text length constants and validation functions.
//! SQLite TEXT has no built-in length enforcement, so handlers
//! validate before the repository layer sees the payload.

use crate::utils::AppError;

// ── Text length limits ──────────────────────────────────────────────

/// Entity names: fund name, member name
pub const MAX_NAME_LEN: usize = 200;

/// Short identifiers: phone, join code
pub const MAX_SHORT_TEXT_LEN: usize = 100;

/// ISO dates (YYYY-MM-DD)
pub const MAX_DATE_LEN: usize = 10;

// ── Validation helpers (CRUD handlers) ──────────────────────────────

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{field} must not be empty")));
    }
    if value.len() > max_len {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.len()
        )));
    }
    Ok(())
}

/// Validate that an optional string, if present, is within the length limit.
pub fn validate_optional_text(
    value: &Option<String>,
    field: &str,
    max_len: usize,
) -> Result<(), AppError> {
    if let Some(v) = value {
        if v.len() > max_len {
            return Err(AppError::validation(format!(
                "{field} is too long ({} chars, max {max_len})",
                v.len()
            )));
        }
    }
    Ok(())
}

/// Validate an optional ISO date string (YYYY-MM-DD).
pub fn validate_optional_date(value: &Option<String>, field: &str) -> Result<(), AppError> {
    if let Some(v) = value {
        if chrono::NaiveDate::parse_from_str(v, "%Y-%m-%d").is_err() {
            return Err(AppError::validation(format!(
                "{field} must be an ISO date (YYYY-MM-DD), got {v}"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_text_rejects_blank_and_oversized() {
        assert!(validate_required_text("Fund A", "name", MAX_NAME_LEN).is_ok());
        assert!(validate_required_text("   ", "name", MAX_NAME_LEN).is_err());
        let long = "x".repeat(MAX_NAME_LEN + 1);
        assert!(validate_required_text(&long, "name", MAX_NAME_LEN).is_err());
    }

    #[test]
    fn test_optional_date_accepts_iso_only() {
        assert!(validate_optional_date(&None, "start_date").is_ok());
        assert!(validate_optional_date(&Some("2026-08-24".into()), "start_date").is_ok());
        assert!(validate_optional_date(&Some("24/08/2026".into()), "start_date").is_err());
        assert!(validate_optional_date(&Some("2026-13-01".into()), "start_date").is_err());
    }
}
