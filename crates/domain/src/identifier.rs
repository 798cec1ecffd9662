//! Integer identifiers generated by the store.

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use usermgmt_core::{AppError, AppResult};

/// Parses an identifier typed by the operator.
pub fn parse_identifier(value: &str) -> AppResult<i64> {
    let trimmed = value.trim();
    trimmed
        .parse::<i64>()
        .map_err(|_| AppError::InvalidInput(format!("'{trimmed}' is not a valid identifier")))
}

/// Unique identifier for a user record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UserId(i64);

impl UserId {
    /// Creates a user identifier from a stored row id.
    #[must_use]
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    /// Parses a user identifier from free text.
    pub fn parse(value: &str) -> AppResult<Self> {
        parse_identifier(value).map(Self)
    }

    /// Returns the underlying row id.
    #[must_use]
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for UserId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Unique identifier for a role record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RoleId(i64);

impl RoleId {
    /// Creates a role identifier from a stored row id.
    #[must_use]
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    /// Parses a role identifier from free text.
    pub fn parse(value: &str) -> AppResult<Self> {
        parse_identifier(value).map(Self)
    }

    /// Returns the underlying row id.
    #[must_use]
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for RoleId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Unique identifier for a permission record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PermissionId(i64);

impl PermissionId {
    /// Creates a permission identifier from a stored row id.
    #[must_use]
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    /// Parses a permission identifier from free text.
    pub fn parse(value: &str) -> AppResult<Self> {
        parse_identifier(value).map(Self)
    }

    /// Returns the underlying row id.
    #[must_use]
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for PermissionId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use usermgmt_core::AppError;

    use super::*;

    #[test]
    fn numeric_text_is_parsed() {
        assert_eq!(parse_identifier(" 42 ").ok(), Some(42));
        assert_eq!(UserId::parse("7").ok(), Some(UserId::new(7)));
    }

    #[test]
    fn non_numeric_text_is_rejected() {
        assert!(matches!(
            parse_identifier("abc"),
            Err(AppError::InvalidInput(_))
        ));
        assert!(matches!(RoleId::parse(""), Err(AppError::InvalidInput(_))));
        assert!(matches!(
            PermissionId::parse("1.5"),
            Err(AppError::InvalidInput(_))
        ));
    }
}
