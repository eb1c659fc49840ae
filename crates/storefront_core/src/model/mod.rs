//! Storefront domain model.
//!
//! # Responsibility
//! - Define typed records for every table of the storefront schema.
//! - Mirror database check constraints as write-side validation.
//!
//! # Invariants
//! - Monetary values are integer minor units (`Money`), never floats.
//! - `validate()` rejects exactly what the schema's CHECK constraints reject,
//!   so a validated record only fails on FK/UNIQUE conflicts.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod catalog;
pub mod customer;
pub mod order;

/// Monetary amount in minor currency units (e.g. cents).
pub type Money = i64;

/// Validation failures for domain records before persistence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelValidationError {
    /// Required text field is empty after trimming spaces.
    BlankField(&'static str),
    /// Amount or count field is below zero.
    Negative { field: &'static str, value: i64 },
    /// Email does not match [`customer::EMAIL_PATTERN`].
    InvalidEmail(String),
    /// Order line quantity must be strictly positive.
    NonPositiveQuantity(i64),
}

impl Display for ModelValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankField(field) => write!(f, "`{field}` must not be blank"),
            Self::Negative { field, value } => {
                write!(f, "`{field}` must be >= 0, got {value}")
            }
            Self::InvalidEmail(email) => write!(f, "invalid email address `{email}`"),
            Self::NonPositiveQuantity(value) => {
                write!(f, "quantity must be > 0, got {value}")
            }
        }
    }
}

impl Error for ModelValidationError {}

/// Blank means empty after stripping spaces, the same set SQLite's
/// one-argument `trim()` removes in the `length(trim(x)) > 0` checks.
pub(crate) fn require_text(field: &'static str, value: &str) -> Result<(), ModelValidationError> {
    if value.trim_matches(' ').is_empty() {
        return Err(ModelValidationError::BlankField(field));
    }
    Ok(())
}

pub(crate) fn require_non_negative(
    field: &'static str,
    value: i64,
) -> Result<(), ModelValidationError> {
    if value < 0 {
        return Err(ModelValidationError::Negative { field, value });
    }
    Ok(())
}
