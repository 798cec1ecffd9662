use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use usermgmt_core::{AppError, AppResult, NonEmptyString};
use usermgmt_domain::{Permission, PermissionId, RoleId, RolePermission};

/// Repository port for permissions and role grants.
#[async_trait]
pub trait PermissionRepository: Send + Sync {
    /// Inserts a permission. Fails with `DuplicateKey` when the name is taken.
    async fn create(&self, name: &str, description: Option<&str>) -> AppResult<Permission>;

    /// Lists all permissions by ascending identifier.
    async fn list(&self) -> AppResult<Vec<Permission>>;

    /// Grants a permission to a role. Granting an existing pair is a no-op.
    async fn link(&self, role_id: RoleId, permission_id: PermissionId) -> AppResult<()>;

    /// Revokes a permission from a role. Revoking a missing pair is a no-op.
    async fn unlink(&self, role_id: RoleId, permission_id: PermissionId) -> AppResult<()>;

    /// Lists every role grant with role and permission names.
    async fn list_role_permissions(&self) -> AppResult<Vec<RolePermission>>;
}

/// Application service for permission administration.
#[derive(Clone)]
pub struct PermissionService {
    repository: Arc<dyn PermissionRepository>,
}

impl PermissionService {
    /// Creates a new service from required dependencies.
    #[must_use]
    pub fn new(repository: Arc<dyn PermissionRepository>) -> Self {
        Self { repository }
    }

    /// Validates the name and creates a permission.
    pub async fn create_permission(
        &self,
        name: &str,
        description: Option<&str>,
    ) -> AppResult<Permission> {
        let name = NonEmptyString::new(name).map_err(|_| {
            AppError::InvalidInput("permission name must not be empty".to_owned())
        })?;

        let permission = self.repository.create(name.as_str(), description).await?;

        info!(permission_id = %permission.id, permission = %permission.name, "permission created");
        Ok(permission)
    }

    /// Lists all permissions.
    pub async fn list_permissions(&self) -> AppResult<Vec<Permission>> {
        self.repository.list().await
    }

    /// Grants a permission to a role.
    pub async fn assign_permission(
        &self,
        role_id: RoleId,
        permission_id: PermissionId,
    ) -> AppResult<()> {
        self.repository.link(role_id, permission_id).await?;

        info!(role_id = %role_id, permission_id = %permission_id, "permission granted");
        Ok(())
    }

    /// Revokes a permission from a role.
    pub async fn revoke_permission(
        &self,
        role_id: RoleId,
        permission_id: PermissionId,
    ) -> AppResult<()> {
        self.repository.unlink(role_id, permission_id).await?;

        info!(role_id = %role_id, permission_id = %permission_id, "permission revoked");
        Ok(())
    }

    /// Lists all role grants.
    pub async fn list_role_permissions(&self) -> AppResult<Vec<RolePermission>> {
        self.repository.list_role_permissions().await
    }
}
