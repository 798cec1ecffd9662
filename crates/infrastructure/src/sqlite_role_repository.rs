use async_trait::async_trait;
use sqlx::{FromRow, SqlitePool};

use usermgmt_application::RoleRepository;
use usermgmt_core::AppResult;
use usermgmt_domain::{Permission, PermissionId, Role, RoleId};

use crate::sqlite_errors::{storage_error, write_error};

/// SQLite-backed repository for roles.
#[derive(Clone)]
pub struct SqliteRoleRepository {
    pool: SqlitePool,
}

impl SqliteRoleRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct RoleRow {
    id: i64,
    name: String,
}

impl From<RoleRow> for Role {
    fn from(row: RoleRow) -> Self {
        Self {
            id: RoleId::new(row.id),
            name: row.name,
            permissions: Vec::new(),
        }
    }
}

#[derive(Debug, FromRow)]
struct RoleGrantRow {
    role_id: i64,
    role_name: String,
    permission_id: Option<i64>,
    permission_name: Option<String>,
    permission_description: Option<String>,
}

#[async_trait]
impl RoleRepository for SqliteRoleRepository {
    async fn create(&self, name: &str) -> AppResult<Role> {
        let conflict = format!("role '{name}' already exists");
        let row = sqlx::query_as::<_, RoleRow>(
            r#"
            INSERT INTO roles (name)
            VALUES (?)
            RETURNING id, name
            "#,
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await
        .map_err(|error| write_error(error, "create role", conflict.as_str()))?;

        Ok(Role::from(row))
    }

    async fn list(&self) -> AppResult<Vec<Role>> {
        let rows = sqlx::query_as::<_, RoleRow>("SELECT id, name FROM roles ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(|error| storage_error(error, "list roles"))?;

        Ok(rows.into_iter().map(Role::from).collect())
    }

    async fn find_by_id(&self, role_id: RoleId) -> AppResult<Option<Role>> {
        let row = sqlx::query_as::<_, RoleRow>("SELECT id, name FROM roles WHERE id = ?")
            .bind(role_id.as_i64())
            .fetch_optional(&self.pool)
            .await
            .map_err(|error| storage_error(error, "find role"))?;

        Ok(row.map(Role::from))
    }

    async fn find_with_permissions(&self, role_id: RoleId) -> AppResult<Option<Role>> {
        let rows = sqlx::query_as::<_, RoleGrantRow>(
            r#"
            SELECT
                roles.id AS role_id,
                roles.name AS role_name,
                permissions.id AS permission_id,
                permissions.name AS permission_name,
                permissions.description AS permission_description
            FROM roles
            LEFT JOIN role_permissions
                ON role_permissions.role_id = roles.id
            LEFT JOIN permissions
                ON permissions.id = role_permissions.permission_id
            WHERE roles.id = ?
            ORDER BY permissions.id
            "#,
        )
        .bind(role_id.as_i64())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| storage_error(error, "load role permissions"))?;

        Ok(aggregate_role(rows))
    }
}

/// Folds one row per grant into a single role. A role without grants yields one row with null permission columns.
fn aggregate_role(rows: Vec<RoleGrantRow>) -> Option<Role> {
    let mut rows = rows.into_iter();
    let first = rows.next()?;

    let mut role = Role {
        id: RoleId::new(first.role_id),
        name: first.role_name.clone(),
        permissions: Vec::new(),
    };

    for row in std::iter::once(first).chain(rows) {
        if let (Some(permission_id), Some(permission_name)) =
            (row.permission_id, row.permission_name)
        {
            role.permissions.push(Permission {
                id: PermissionId::new(permission_id),
                name: permission_name,
                description: row.permission_description,
            });
        }
    }

    Some(role)
}
