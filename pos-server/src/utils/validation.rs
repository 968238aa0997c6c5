//! Input validation helpers
//!
//! Centralized text length constants and validation functions.
//! SQLite TEXT has no built-in length enforcement, so limits live here.

use crate::utils::AppError;

// ── Text length limits ──────────────────────────────────────────────

/// Table numbers, payment methods, device ids
pub const MAX_SHORT_TEXT_LEN: usize = 100;

/// Delivery address / pickup time remark
pub const MAX_REMARK_LEN: usize = 500;

// ── Cart limits ─────────────────────────────────────────────────────

/// Maximum quantity per line
pub const MAX_QUANTITY: i64 = 999;

/// Maximum lines per cart
pub const MAX_CART_LINES: usize = 100;

// ── Validation helpers ──────────────────────────────────────────────

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(
    value: Option<&str>,
    field: &str,
    message: &str,
    max_len: usize,
) -> Result<(), AppError> {
    let Some(value) = value.filter(|v| !v.trim().is_empty()) else {
        return Err(AppError::required(field, message));
    };
    check_len(value, field, max_len)
}

/// Validate that an optional string, if present, is within the length limit.
pub fn validate_optional_text(
    value: Option<&str>,
    field: &str,
    max_len: usize,
) -> Result<(), AppError> {
    match value {
        Some(v) => check_len(v, field, max_len),
        None => Ok(()),
    }
}

fn check_len(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    let len = value.chars().count();
    if len > max_len {
        return Err(AppError::validation(format!(
            "{field} is too long ({len} chars, max {max_len})"
        ))
        .with_detail("field", field));
    }
    Ok(())
}
