use async_trait::async_trait;
use sqlx::{FromRow, SqlitePool};
use tracing::debug;

use usermgmt_application::PermissionRepository;
use usermgmt_core::AppResult;
use usermgmt_domain::{Permission, PermissionId, RoleId, RolePermission};

use crate::sqlite_errors::{storage_error, write_error};

/// SQLite-backed repository for permissions and their role grants.
#[derive(Clone)]
pub struct SqlitePermissionRepository {
    pool: SqlitePool,
}

impl SqlitePermissionRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct PermissionRow {
    id: i64,
    name: String,
    description: Option<String>,
}

impl From<PermissionRow> for Permission {
    fn from(row: PermissionRow) -> Self {
        Self {
            id: PermissionId::new(row.id),
            name: row.name,
            description: row.description,
        }
    }
}

#[derive(Debug, FromRow)]
struct RolePermissionRow {
    role_id: i64,
    role_name: String,
    permission_id: i64,
    permission_name: String,
}

impl From<RolePermissionRow> for RolePermission {
    fn from(row: RolePermissionRow) -> Self {
        Self {
            role_id: RoleId::new(row.role_id),
            role_name: row.role_name,
            permission_id: PermissionId::new(row.permission_id),
            permission_name: row.permission_name,
        }
    }
}

#[async_trait]
impl PermissionRepository for SqlitePermissionRepository {
    async fn create(&self, name: &str, description: Option<&str>) -> AppResult<Permission> {
        let conflict = format!("permission '{name}' already exists");
        let row = sqlx::query_as::<_, PermissionRow>(
            r#"
            INSERT INTO permissions (name, description)
            VALUES (?, ?)
            RETURNING id, name, description
            "#,
        )
        .bind(name)
        .bind(description)
        .fetch_one(&self.pool)
        .await
        .map_err(|error| write_error(error, "create permission", conflict.as_str()))?;

        Ok(Permission::from(row))
    }

    async fn list(&self) -> AppResult<Vec<Permission>> {
        let rows = sqlx::query_as::<_, PermissionRow>(
            "SELECT id, name, description FROM permissions ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|error| storage_error(error, "list permissions"))?;

        Ok(rows.into_iter().map(Permission::from).collect())
    }

    async fn link(&self, role_id: RoleId, permission_id: PermissionId) -> AppResult<()> {
        // OR IGNORE covers the primary key only; foreign key failures still surface.
        let result = sqlx::query(
            "INSERT OR IGNORE INTO role_permissions (role_id, permission_id) VALUES (?, ?)",
        )
        .bind(role_id.as_i64())
        .bind(permission_id.as_i64())
        .execute(&self.pool)
        .await
        .map_err(|error| write_error(error, "grant permission", "permission already granted"))?;

        if result.rows_affected() == 0 {
            debug!(role_id = %role_id, permission_id = %permission_id, "grant already present");
        }

        Ok(())
    }

    async fn unlink(&self, role_id: RoleId, permission_id: PermissionId) -> AppResult<()> {
        sqlx::query("DELETE FROM role_permissions WHERE role_id = ? AND permission_id = ?")
            .bind(role_id.as_i64())
            .bind(permission_id.as_i64())
            .execute(&self.pool)
            .await
            .map_err(|error| storage_error(error, "revoke permission"))?;

        Ok(())
    }

    async fn list_role_permissions(&self) -> AppResult<Vec<RolePermission>> {
        let rows = sqlx::query_as::<_, RolePermissionRow>(
            r#"
            SELECT
                roles.id AS role_id,
                roles.name AS role_name,
                permissions.id AS permission_id,
                permissions.name AS permission_name
            FROM role_permissions
            INNER JOIN roles ON roles.id = role_permissions.role_id
            INNER JOIN permissions ON permissions.id = role_permissions.permission_id
            ORDER BY roles.id, permissions.id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|error| storage_error(error, "list role permissions"))?;

        Ok(rows.into_iter().map(RolePermission::from).collect())
    }
}
