use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use usermgmt_core::{AppError, AppResult};
use usermgmt_domain::{Role, RoleId, RoleName};

/// Repository port for role persistence.
#[async_trait]
pub trait RoleRepository: Send + Sync {
    /// Inserts a role. Fails with `DuplicateKey` when the name is taken.
    async fn create(&self, name: &str) -> AppResult<Role>;

    /// Lists all roles by ascending identifier, without permissions.
    async fn list(&self) -> AppResult<Vec<Role>>;

    /// Finds a role by identifier, without permissions.
    async fn find_by_id(&self, role_id: RoleId) -> AppResult<Option<Role>>;

    /// Finds a role by identifier with its granted permissions loaded.
    async fn find_with_permissions(&self, role_id: RoleId) -> AppResult<Option<Role>>;
}

/// Application service for role administration.
#[derive(Clone)]
pub struct RoleService {
    repository: Arc<dyn RoleRepository>,
}

impl RoleService {
    /// Creates a new service from required dependencies.
    #[must_use]
    pub fn new(repository: Arc<dyn RoleRepository>) -> Self {
        Self { repository }
    }

    /// Validates the name and creates a role.
    pub async fn create_role(&self, name: &str) -> AppResult<Role> {
        let name = RoleName::new(name)?;
        let role = self.repository.create(name.as_str()).await?;

        info!(role_id = %role.id, role = %role.name, "role created");
        Ok(role)
    }

    /// Lists all roles by ascending identifier.
    pub async fn list_roles(&self) -> AppResult<Vec<Role>> {
        self.repository.list().await
    }

    /// Returns a role by identifier, if it exists.
    pub async fn find_role(&self, role_id: RoleId) -> AppResult<Option<Role>> {
        self.repository.find_by_id(role_id).await
    }

    /// Returns a role with its permissions or fails with `NotFound`.
    pub async fn get_role_with_permissions(&self, role_id: RoleId) -> AppResult<Role> {
        self.repository
            .find_with_permissions(role_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("role {role_id} was not found")))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use tokio::sync::Mutex;

    use usermgmt_core::{AppError, AppResult};
    use usermgmt_domain::{Permission, PermissionId, Role, RoleId};

    use super::{RoleRepository, RoleService};

    #[derive(Default)]
    struct FakeRoleRepository {
        roles: Mutex<Vec<Role>>,
    }

    #[async_trait]
    impl RoleRepository for FakeRoleRepository {
        async fn create(&self, name: &str) -> AppResult<Role> {
            let mut roles = self.roles.lock().await;
            if roles.iter().any(|role| role.name == name) {
                return Err(AppError::DuplicateKey(format!(
                    "role '{name}' already exists"
                )));
            }

            let role = Role {
                id: RoleId::new(i64::try_from(roles.len()).unwrap_or_default() + 1),
                name: name.to_owned(),
                permissions: Vec::new(),
            };
            roles.push(role.clone());
            Ok(role)
        }

        async fn list(&self) -> AppResult<Vec<Role>> {
            Ok(self.roles.lock().await.clone())
        }

        async fn find_by_id(&self, role_id: RoleId) -> AppResult<Option<Role>> {
            Ok(self
                .roles
                .lock()
                .await
                .iter()
                .find(|role| role.id == role_id)
                .cloned())
        }

        async fn find_with_permissions(&self, role_id: RoleId) -> AppResult<Option<Role>> {
            Ok(self.find_by_id(role_id).await?.map(|mut role| {
                role.permissions.push(Permission {
                    id: PermissionId::new(1),
                    name: "READ".to_owned(),
                    description: Some("Daten lesen".to_owned()),
                });
                role
            }))
        }
    }

    fn service() -> (RoleService, Arc<FakeRoleRepository>) {
        let repository = Arc::new(FakeRoleRepository::default());
        (RoleService::new(repository.clone()), repository)
    }

    #[tokio::test]
    async fn create_role_rejects_blank_names() {
        let (service, repository) = service();

        for name in ["", " ", "  \t  "] {
            let result = service.create_role(name).await;
            assert!(matches!(result, Err(AppError::InvalidInput(_))));
        }
        assert!(repository.roles.lock().await.is_empty());
    }

    #[tokio::test]
    async fn create_role_persists_name() {
        let (service, _) = service();

        let role = service
            .create_role("AUDITOR")
            .await
            .unwrap_or_else(|error| panic!("create failed: {error}"));

        assert_eq!(role.name, "AUDITOR");
        assert_eq!(service.list_roles().await.unwrap_or_default(), vec![role]);
    }

    #[tokio::test]
    async fn get_role_with_permissions_loads_grants() {
        let (service, _) = service();
        let role = service.create_role("ADMIN").await;
        assert!(role.is_ok());

        let loaded = service
            .get_role_with_permissions(RoleId::new(1))
            .await
            .unwrap_or_else(|error| panic!("lookup failed: {error}"));

        assert_eq!(loaded.name, "ADMIN");
        assert_eq!(loaded.permissions.len(), 1);
    }

    #[tokio::test]
    async fn get_role_with_permissions_reports_missing_role() {
        let (service, _) = service();

        let result = service.get_role_with_permissions(RoleId::new(42)).await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn find_role_returns_role_without_permissions() {
        let (service, _) = service();
        let created = service
            .create_role("AUDITOR")
            .await
            .unwrap_or_else(|error| panic!("create failed: {error}"));

        let found = service.find_role(created.id).await.ok().flatten();
        let missing = service.find_role(RoleId::new(42)).await;

        assert_eq!(found, Some(created));
        assert!(matches!(missing, Ok(None)));
    }
}
