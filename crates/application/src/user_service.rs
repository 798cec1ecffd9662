//! User management ports and application service.
//!
//! Validates operator input before it reaches storage. Uniqueness and the
//! last-admin rule are enforced again by the repository; the service adds
//! only an early username check.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use usermgmt_core::{AppError, AppResult};
use usermgmt_domain::{EmailAddress, RoleId, User, UserId, Username};

// ---------------------------------------------------------------------------
// Ports
// ---------------------------------------------------------------------------

/// Validated payload for inserting a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    /// Unique login name.
    pub username: String,
    /// Unique email address.
    pub email: String,
    /// Role to assign.
    pub role_id: RoleId,
}

/// Validated full-record replacement for an existing user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserUpdate {
    /// User to modify.
    pub id: UserId,
    /// New login name.
    pub username: String,
    /// New email address.
    pub email: String,
    /// New role.
    pub role_id: RoleId,
}

/// Repository port for user persistence.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Inserts a user and returns the stored record.
    ///
    /// Fails with `DuplicateKey` when the username or email is taken.
    async fn create(&self, user: NewUser) -> AppResult<User>;

    /// Finds a user by identifier.
    async fn find_by_id(&self, user_id: UserId) -> AppResult<Option<User>>;

    /// Finds a user by exact username.
    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>>;

    /// Lists all users by ascending identifier.
    async fn list(&self) -> AppResult<Vec<User>>;

    /// Replaces username, email and role of a user.
    ///
    /// Fails with `InvariantViolation` when the last administrator would lose
    /// the administrator role.
    async fn update(&self, update: UserUpdate) -> AppResult<User>;

    /// Deletes a user.
    ///
    /// Fails with `InvariantViolation` when the user is the last administrator.
    async fn delete(&self, user_id: UserId) -> AppResult<()>;

    /// Counts users holding the administrator role.
    async fn count_admins(&self) -> AppResult<u64>;
}

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Raw operator input for creating a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateUserInput {
    /// Requested login name.
    pub username: String,
    /// Requested email address.
    pub email: String,
    /// Selected role, if any.
    pub role_id: Option<RoleId>,
}

/// Raw operator input for editing a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateUserInput {
    /// User to modify.
    pub user_id: UserId,
    /// New login name.
    pub username: String,
    /// New email address.
    pub email: String,
    /// New role, if any.
    pub role_id: Option<RoleId>,
}

// ---------------------------------------------------------------------------
// Service
// ---------------------------------------------------------------------------

/// Application service for user administration.
#[derive(Clone)]
pub struct UserService {
    user_repository: Arc<dyn UserRepository>,
}

impl UserService {
    /// Creates a new user service.
    #[must_use]
    pub fn new(user_repository: Arc<dyn UserRepository>) -> Self {
        Self { user_repository }
    }

    /// Lists all users by ascending identifier.
    pub async fn list_users(&self) -> AppResult<Vec<User>> {
        self.user_repository.list().await
    }

    /// Returns the number of administrators.
    pub async fn admin_count(&self) -> AppResult<u64> {
        self.user_repository.count_admins().await
    }
}

mod lifecycle;
mod retrieval;
