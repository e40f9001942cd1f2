//! Validation helpers
//!
//! Small checks shared by the ledger, the trip controller and the auth flow.

use num_traits::FromPrimitive;
use rust_decimal::Decimal;

use crate::utils::errors::{AppError, AppResult};

/// Converts a user-supplied cost into a `Decimal`.
///
/// Rejects NaN, infinities and negative values.
pub fn validate_cost(value: f64) -> AppResult<Decimal> {
    if !value.is_finite() {
        return Err(AppError::InvalidInput(
            "Cost must be a finite number".to_string(),
        ));
    }
    if value < 0.0 {
        return Err(AppError::InvalidInput(
            "Cost cannot be negative".to_string(),
        ));
    }
    Decimal::from_f64(value)
        .ok_or_else(|| AppError::InvalidInput(format!("Cost {} is out of range", value)))
}

/// Converts an optional monetary/numeric trip field.
pub fn validate_amount(field: &str, value: Option<f64>) -> AppResult<Option<Decimal>> {
    match value {
        None => Ok(None),
        Some(v) if !v.is_finite() => Err(AppError::InvalidInput(format!(
            "{} must be a finite number",
            field
        ))),
        Some(v) => Decimal::from_f64(v)
            .map(Some)
            .ok_or_else(|| AppError::InvalidInput(format!("{} is out of range", field))),
    }
}

/// Trims a required text field, failing when nothing is left.
pub fn require_text(field: &str, value: &str) -> AppResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::InvalidInput(format!("{} is required", field)));
    }
    Ok(trimmed.to_string())
}

/// Emails are compared case-insensitively everywhere.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::prelude::*;

    #[test]
    fn test_validate_cost_accepts_zero_and_positive() {
        assert_eq!(validate_cost(0.0).unwrap(), Decimal::ZERO);
        assert_eq!(validate_cost(75.5).unwrap(), Decimal::from_str("75.5").unwrap());
    }

    #[test]
    fn test_validate_cost_rejects_bad_values() {
        assert!(matches!(validate_cost(-1.0), Err(AppError::InvalidInput(_))));
        assert!(matches!(validate_cost(f64::NAN), Err(AppError::InvalidInput(_))));
        assert!(matches!(
            validate_cost(f64::INFINITY),
            Err(AppError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_validate_amount_allows_negative_and_none() {
        assert_eq!(validate_amount("RATE", None).unwrap(), None);
        assert_eq!(
            validate_amount("RATE", Some(-20.0)).unwrap(),
            Some(Decimal::from(-20))
        );
        assert!(validate_amount("FUEL", Some(f64::NAN)).is_err());
    }

    #[test]
    fn test_require_text() {
        assert_eq!(require_text("origin", "  Manila ").unwrap(), "Manila");
        assert!(require_text("origin", "   ").is_err());
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email(" A@B.com "), "a@b.com");
    }
}
