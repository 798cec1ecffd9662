//! Example permissions, grants and accounts loaded by an explicit reset.

use sqlx::{SqliteConnection, SqlitePool};
use tracing::info;

use usermgmt_core::{AppError, AppResult};
use usermgmt_domain::{PermissionId, RoleId, WellKnownRole};

use crate::sqlite_errors::{storage_error, write_error};

const DEMO_PERMISSIONS: &[(&str, &str)] = &[
    ("READ", "Daten lesen"),
    ("WRITE", "Daten schreiben"),
    ("DELETE", "Daten löschen"),
    ("ADMIN", "Administrative Rechte"),
];

const USER_PERMISSIONS: &[&str] = &["READ", "WRITE"];

const DEMO_USERS: &[(&str, &str, WellKnownRole)] = &[
    ("admin", "admin@test.com", WellKnownRole::Admin),
    ("user", "user@test.com", WellKnownRole::User),
];

/// Loads demo data into a freshly reset store.
///
/// Expects the well-known roles to exist and the permission and user tables to
/// be empty. Either every demo row is written or none is.
pub async fn seed_demo_data(pool: &SqlitePool) -> AppResult<()> {
    let mut transaction = pool
        .begin()
        .await
        .map_err(|error| storage_error(error, "begin transaction"))?;

    seed_demo_rows(&mut transaction).await?;

    transaction
        .commit()
        .await
        .map_err(|error| storage_error(error, "commit transaction"))
}

/// Writes demo rows on a connection the caller owns, typically an open transaction.
pub(crate) async fn seed_demo_rows(connection: &mut SqliteConnection) -> AppResult<()> {
    let admin_role = resolve_role(connection, WellKnownRole::Admin).await?;
    let user_role = resolve_role(connection, WellKnownRole::User).await?;

    for (name, description) in DEMO_PERMISSIONS.iter().copied() {
        let permission_id = insert_permission(connection, name, description).await?;

        grant(connection, admin_role, permission_id).await?;
        if USER_PERMISSIONS.contains(&name) {
            grant(connection, user_role, permission_id).await?;
        }
    }

    for (username, email, role) in DEMO_USERS.iter().copied() {
        let role_id = match role {
            WellKnownRole::Admin => admin_role,
            WellKnownRole::User => user_role,
        };
        insert_user(connection, username, email, role_id).await?;
    }

    info!(
        permissions = DEMO_PERMISSIONS.len(),
        users = DEMO_USERS.len(),
        "demo data loaded"
    );
    Ok(())
}

async fn resolve_role(connection: &mut SqliteConnection, role: WellKnownRole) -> AppResult<RoleId> {
    sqlx::query_scalar::<_, i64>("SELECT id FROM roles WHERE name = ?")
        .bind(role.as_str())
        .fetch_optional(&mut *connection)
        .await
        .map_err(|error| storage_error(error, "resolve seed role"))?
        .map(RoleId::new)
        .ok_or_else(|| {
            AppError::NotFound(format!(
                "seed role '{}' is missing, initialize the schema first",
                role.as_str()
            ))
        })
}

async fn insert_permission(
    connection: &mut SqliteConnection,
    name: &str,
    description: &str,
) -> AppResult<PermissionId> {
    let conflict = format!("permission '{name}' already exists");
    sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO permissions (name, description)
        VALUES (?, ?)
        RETURNING id
        "#,
    )
    .bind(name)
    .bind(description)
    .fetch_one(&mut *connection)
    .await
    .map(PermissionId::new)
    .map_err(|error| write_error(error, "seed permission", conflict.as_str()))
}

async fn grant(
    connection: &mut SqliteConnection,
    role_id: RoleId,
    permission_id: PermissionId,
) -> AppResult<()> {
    sqlx::query("INSERT OR IGNORE INTO role_permissions (role_id, permission_id) VALUES (?, ?)")
        .bind(role_id.as_i64())
        .bind(permission_id.as_i64())
        .execute(&mut *connection)
        .await
        .map_err(|error| write_error(error, "seed grant", "permission already granted"))?;

    Ok(())
}

async fn insert_user(
    connection: &mut SqliteConnection,
    username: &str,
    email: &str,
    role_id: RoleId,
) -> AppResult<()> {
    let conflict = format!("username '{username}' or email '{email}' already exists");
    sqlx::query("INSERT INTO users (username, email, role_id) VALUES (?, ?, ?)")
        .bind(username)
        .bind(email)
        .bind(role_id.as_i64())
        .execute(&mut *connection)
        .await
        .map_err(|error| write_error(error, "seed user", conflict.as_str()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use usermgmt_application::{NewUser, RoleRepository, UserRepository};

    use super::*;
    use crate::schema::memory_pool;
    use crate::{SqliteRoleRepository, SqliteUserRepository};

    async fn count(pool: &SqlitePool, table: &str) -> i64 {
        sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(pool)
            .await
            .unwrap_or_else(|error| panic!("failed to count {table}: {error}"))
    }

    async fn usernames(pool: &SqlitePool) -> Vec<String> {
        SqliteUserRepository::new(pool.clone())
            .list()
            .await
            .unwrap_or_default()
            .into_iter()
            .map(|user| user.username)
            .collect()
    }

    #[tokio::test]
    async fn demo_grants_follow_role_split() {
        let pool = memory_pool().await;
        assert!(seed_demo_data(&pool).await.is_ok());

        let roles = SqliteRoleRepository::new(pool.clone());
        let names = |role: Option<usermgmt_domain::Role>| -> Vec<String> {
            role.map(|role| role.permissions.into_iter().map(|p| p.name).collect())
                .unwrap_or_default()
        };

        let admin = roles.find_with_permissions(RoleId::new(1)).await.ok().flatten();
        let user = roles.find_with_permissions(RoleId::new(2)).await.ok().flatten();

        assert_eq!(names(admin), vec!["READ", "WRITE", "DELETE", "ADMIN"]);
        assert_eq!(names(user), vec!["READ", "WRITE"]);
    }

    #[tokio::test]
    async fn demo_users_reference_seeded_roles() {
        let pool = memory_pool().await;
        assert!(seed_demo_data(&pool).await.is_ok());

        let users = SqliteUserRepository::new(pool)
            .list()
            .await
            .unwrap_or_default();

        let summary: Vec<(&str, &str, &str)> = users
            .iter()
            .map(|user| {
                (
                    user.username.as_str(),
                    user.email.as_str(),
                    user.role_name.as_str(),
                )
            })
            .collect();
        assert_eq!(
            summary,
            vec![
                ("admin", "admin@test.com", "ADMIN"),
                ("user", "user@test.com", "USER"),
            ]
        );
    }

    #[tokio::test]
    async fn failed_seed_leaves_no_partial_rows() {
        let pool = memory_pool().await;
        let existing = SqliteUserRepository::new(pool.clone())
            .create(NewUser {
                username: "user".to_owned(),
                email: "other@x.com".to_owned(),
                role_id: RoleId::new(2),
            })
            .await;
        assert!(existing.is_ok());

        let result = seed_demo_data(&pool).await;

        assert!(matches!(result, Err(AppError::DuplicateKey(_))));
        assert_eq!(count(&pool, "permissions").await, 0);
        assert_eq!(count(&pool, "role_permissions").await, 0);
        assert_eq!(usernames(&pool).await, vec!["user"]);
    }

    #[tokio::test]
    async fn seeding_twice_keeps_first_seed_intact() {
        let pool = memory_pool().await;
        assert!(seed_demo_data(&pool).await.is_ok());

        let second = seed_demo_data(&pool).await;

        assert!(matches!(second, Err(AppError::DuplicateKey(_))));
        assert_eq!(count(&pool, "permissions").await, 4);
        assert_eq!(count(&pool, "role_permissions").await, 6);
        assert_eq!(usernames(&pool).await, vec!["admin", "user"]);
    }
}
