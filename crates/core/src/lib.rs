//! Shared primitives for all Rust crates in usermgmt.

#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type used across usermgmt crates.
pub type AppResult<T> = Result<T, AppError>;

/// A validated non-empty UTF-8 string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NonEmptyString(String);

impl NonEmptyString {
    /// Creates a validated non-empty string.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "value must not be empty or whitespace".to_owned(),
            ));
        }

        Ok(Self(value))
    }

    /// Returns the underlying string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<NonEmptyString> for String {
    fn from(value: NonEmptyString) -> Self {
        value.0
    }
}

/// Common application error categories.
#[derive(Debug, Error)]
pub enum AppError {
    /// Malformed input rejected before it reaches storage.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Write would break a uniqueness constraint.
    #[error("duplicate key: {0}")]
    DuplicateKey(String),

    /// Requested resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Write would break a business invariant spanning several rows.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    /// Underlying connection or schema failure.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),
}

impl AppError {
    /// Returns whether the operator can fix the failure by changing input.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        !matches!(self, Self::StorageUnavailable(_))
    }
}

#[cfg(test)]
mod tests {
    use super::{AppError, NonEmptyString};

    #[test]
    fn non_empty_string_rejects_whitespace() {
        let result = NonEmptyString::new("   ");
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }

    #[test]
    fn non_empty_string_keeps_original_value() {
        let value = NonEmptyString::new(" READ ").unwrap_or_else(|_| panic!("test"));
        assert_eq!(value.as_str(), " READ ");
    }

    #[test]
    fn storage_errors_are_not_client_errors() {
        assert!(!AppError::StorageUnavailable("disk".to_owned()).is_client_error());
        assert!(AppError::InvariantViolation("admin".to_owned()).is_client_error());
    }

    #[test]
    fn error_messages_carry_category_prefix() {
        let error = AppError::DuplicateKey("username 'admin' already exists".to_owned());
        assert_eq!(
            error.to_string(),
            "duplicate key: username 'admin' already exists"
        );
    }
}
