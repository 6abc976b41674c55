//! Input validation helpers
//!
//! Centralized length limits and field checks for request payloads.
//! SQLite TEXT has no built-in length enforcement, so limits live here.

use crate::utils::error::FieldError;
use crate::utils::AppError;

// ── Text length limits ──────────────────────────────────────────────

/// Entity names, receiver names.
pub const MAX_NAME_LEN: usize = 200;

/// Addresses (street, neighborhood, complement).
pub const MAX_ADDRESS_LEN: usize = 500;

/// Short identifiers: phone, document, zip, ids.
pub const MAX_SHORT_TEXT_LEN: usize = 100;

/// URLs (image, payment links).
pub const MAX_URL_LEN: usize = 2048;

/// Cancel reasons, notes.
pub const MAX_NOTE_LEN: usize = 500;

// ── Validation helpers ──────────────────────────────────────────────

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{field} não pode ser vazio")));
    }
    if value.len() > max_len {
        return Err(AppError::validation(format!(
            "{field} é longo demais ({} caracteres, máximo {max_len})",
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
                "{field} é longo demais ({} caracteres, máximo {max_len})",
                v.len()
            )));
        }
    }
    Ok(())
}

/// Validate that a monetary amount is finite and positive.
pub fn validate_amount(amount: f64, field: &str) -> Result<(), AppError> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(AppError::validation(format!(
            "{field} deve ser um valor positivo"
        )));
    }
    Ok(())
}

/// Normalize a Brazilian CEP to its 8-digit form.
///
/// Accepts "01310-100" or "01310100"; anything else is a field error.
pub fn normalize_zip(zip: &str) -> Result<String, AppError> {
    let digits: String = zip.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() != 8 {
        return Err(AppError::ValidationFields(vec![FieldError {
            field: "zip".into(),
            message: "CEP deve conter 8 dígitos".into(),
        }]));
    }
    Ok(digits)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zip_normalization() {
        assert_eq!(normalize_zip("01310-100").unwrap(), "01310100");
        assert_eq!(normalize_zip("01310100").unwrap(), "01310100");
        assert!(normalize_zip("1310-100").is_err());
        assert!(normalize_zip("abc").is_err());
    }

    #[test]
    fn amount_must_be_positive() {
        assert!(validate_amount(10.0, "valor").is_ok());
        assert!(validate_amount(0.0, "valor").is_err());
        assert!(validate_amount(-1.0, "valor").is_err());
        assert!(validate_amount(f64::NAN, "valor").is_err());
    }
}
