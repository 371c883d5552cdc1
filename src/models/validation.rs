//! Field rules shared by every model
//!
//! Text is trimmed on the way in and empty optional text becomes `None`, so
//! the stored form never carries stray whitespace.

use std::fmt;

use super::money::Money;

/// Longest accepted name, in characters
pub const MAX_NAME_LEN: usize = 100;

/// Validation errors for model fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    EmptyField(&'static str),
    TooLong { field: &'static str, len: usize },
    NegativeAmount(&'static str),
    NonPositiveAmount(&'static str),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyField(field) => write!(f, "{} is required", field),
            Self::TooLong { field, len } => {
                write!(f, "{} too long ({} chars, max {})", field, len, MAX_NAME_LEN)
            }
            Self::NegativeAmount(field) => write!(f, "{} cannot be negative", field),
            Self::NonPositiveAmount(field) => write!(f, "{} must be greater than zero", field),
        }
    }
}

impl std::error::Error for ValidationError {}

impl From<ValidationError> for crate::error::GestionError {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err.to_string())
    }
}

/// Trim a required name and check it is non-empty and not too long
pub fn required_name(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    check_name(field, trimmed)?;
    Ok(trimmed.to_string())
}

/// Check an already-trimmed name
pub fn check_name(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::EmptyField(field));
    }
    let len = value.chars().count();
    if len > MAX_NAME_LEN {
        return Err(ValidationError::TooLong { field, len });
    }
    Ok(())
}

/// Trim optional text; blank becomes `None`
pub fn optional_text(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let trimmed = v.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

pub fn check_positive(field: &'static str, amount: Money) -> Result<(), ValidationError> {
    if amount.is_positive() {
        Ok(())
    } else {
        Err(ValidationError::NonPositiveAmount(field))
    }
}

pub fn check_non_negative(field: &'static str, amount: Money) -> Result<(), ValidationError> {
    if amount.is_negative() {
        Err(ValidationError::NegativeAmount(field))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_name_trims() {
        assert_eq!(required_name("Name", "  Acme ").unwrap(), "Acme");
        assert_eq!(
            required_name("Name", "   "),
            Err(ValidationError::EmptyField("Name"))
        );
    }

    #[test]
    fn test_name_too_long() {
        let long = "x".repeat(MAX_NAME_LEN + 1);
        assert!(matches!(
            required_name("Name", &long),
            Err(ValidationError::TooLong { len: 101, .. })
        ));
    }

    #[test]
    fn test_optional_text_blank_is_none() {
        assert_eq!(optional_text(Some("  ".into())), None);
        assert_eq!(optional_text(Some(" note ".into())), Some("note".into()));
        assert_eq!(optional_text(None), None);
    }

    #[test]
    fn test_amount_rules() {
        assert!(check_positive("Amount", Money::from_cents(1)).is_ok());
        assert!(check_positive("Amount", Money::zero()).is_err());
        assert!(check_non_negative("Price", Money::zero()).is_ok());
        assert!(check_non_negative("Price", Money::from_cents(-1)).is_err());
    }
}
