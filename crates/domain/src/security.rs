use serde::{Deserialize, Serialize};
use usermgmt_core::{AppError, AppResult, NonEmptyString};

use crate::{PermissionId, RoleId};

/// Roles seeded by every schema initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WellKnownRole {
    /// Administrator role. At least one user must always hold it.
    Admin,
    /// Default role for regular accounts.
    User,
}

impl WellKnownRole {
    /// Returns the stored role name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "ADMIN",
            Self::User => "USER",
        }
    }

    /// Returns all seeded roles in insertion order.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[WellKnownRole] = &[WellKnownRole::Admin, WellKnownRole::User];

        ALL
    }
}

/// Validated role name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoleName(NonEmptyString);

impl RoleName {
    /// Creates a role name, rejecting empty and whitespace-only values.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        NonEmptyString::new(value)
            .map(Self)
            .map_err(|_| AppError::InvalidInput("role name must not be empty".to_owned()))
    }

    /// Returns the validated role name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Named capability that can be granted to roles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    /// Store-generated identifier.
    pub id: PermissionId,
    /// Unique permission name.
    pub name: String,
    /// Free-text description.
    pub description: Option<String>,
}

/// Named permission bundle. Permissions are only populated when explicitly loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    /// Store-generated identifier.
    pub id: RoleId,
    /// Unique role name.
    pub name: String,
    /// Granted permissions, empty unless loaded with the role.
    pub permissions: Vec<Permission>,
}

impl Role {
    /// Returns whether this is the administrator role.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.name == WellKnownRole::Admin.as_str()
    }
}

/// Role-permission association projected with names for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RolePermission {
    /// Granting role.
    pub role_id: RoleId,
    /// Granting role name.
    pub role_name: String,
    /// Granted permission.
    pub permission_id: PermissionId,
    /// Granted permission name.
    pub permission_name: String,
}
