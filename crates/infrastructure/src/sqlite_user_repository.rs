//! SQLite-backed user repository.

use async_trait::async_trait;
use sqlx::{Executor, Sqlite, SqlitePool};

use usermgmt_application::{NewUser, UserRepository, UserUpdate};
use usermgmt_core::{AppError, AppResult};
use usermgmt_domain::{RoleId, User, UserId, WellKnownRole};

use crate::sqlite_errors::{storage_error, write_error};

/// SQLite implementation of the user repository port.
#[derive(Clone)]
pub struct SqliteUserRepository {
    pool: SqlitePool,
}

impl SqliteUserRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: i64,
    username: String,
    email: String,
    role_id: i64,
    role_name: String,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: UserId::new(row.id),
            username: row.username,
            email: row.email,
            role_id: RoleId::new(row.role_id),
            role_name: row.role_name,
        }
    }
}

mod account;
mod lookup;


#[async_trait]
impl UserRepository for SqliteUserRepository {
    async fn create(&self, user: NewUser) -> AppResult<User> {
        self.create_impl(user).await
    }

    async fn find_by_id(&self, user_id: UserId) -> AppResult<Option<User>> {
        fetch_user(&self.pool, user_id).await
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        self.find_by_username_impl(username).await
    }

    async fn list(&self) -> AppResult<Vec<User>> {
        self.list_impl().await
    }

    async fn update(&self, update: UserUpdate) -> AppResult<User> {
        self.update_impl(update).await
    }

    async fn delete(&self, user_id: UserId) -> AppResult<()> {
        self.delete_impl(user_id).await
    }

    async fn count_admins(&self) -> AppResult<u64> {
        let count = count_admins(&self.pool).await?;
        Ok(u64::try_from(count).unwrap_or_default())
    }
}

async fn fetch_user<'e, E>(executor: E, user_id: UserId) -> AppResult<Option<User>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let row = sqlx::query_as::<_, UserRow>(
        r#"
        SELECT users.id, users.username, users.email, users.role_id, roles.name AS role_name
        FROM users
        INNER JOIN roles ON roles.id = users.role_id
        WHERE users.id = ?
        "#,
    )
    .bind(user_id.as_i64())
    .fetch_optional(executor)
    .await
    .map_err(|error| storage_error(error, "find user by id"))?;

    Ok(row.map(User::from))
}

async fn count_admins<'e, E>(executor: E) -> AppResult<i64>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*)
        FROM users
        INNER JOIN roles ON roles.id = users.role_id
        WHERE roles.name = ?
        "#,
    )
    .bind(WellKnownRole::Admin.as_str())
    .fetch_one(executor)
    .await
    .map_err(|error| storage_error(error, "count administrators"))
}

fn user_conflict_or_storage(error: sqlx::Error, operation: &str) -> AppError {
    write_error(error, operation, "username or email already exists")
}
