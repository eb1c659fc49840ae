//! Customer record.
//!
//! # Invariants
//! - `customer_id` is a generated UUID v4 and is never reused.
//! - `email` matches [`EMAIL_PATTERN`]; the same pattern backs the
//!   `customer.email` CHECK constraint in the schema.
//! - `password` is never serialized.

use super::{require_text, ModelValidationError};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable customer identifier.
pub type CustomerId = Uuid;

/// Email validation pattern shared with the schema check constraint.
pub const EMAIL_PATTERN: &str = r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$";

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(EMAIL_PATTERN).expect("valid email regex"));

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub customer_id: CustomerId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    /// Opaque credential supplied by the caller, stored as given.
    #[serde(skip_serializing, default)]
    pub password: String,
}

impl Customer {
    /// Creates a customer with a generated stable ID.
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            customer_id: Uuid::new_v4(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: email.into(),
            password: password.into(),
        }
    }

    pub fn validate(&self) -> Result<(), ModelValidationError> {
        require_text("first_name", &self.first_name)?;
        require_text("last_name", &self.last_name)?;
        require_text("password", &self.password)?;
        if !is_valid_email(&self.email) {
            return Err(ModelValidationError::InvalidEmail(self.email.clone()));
        }
        Ok(())
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Returns whether `email` matches the configured email pattern.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Canonical email form used for storage and lookups.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
