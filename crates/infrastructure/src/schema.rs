//! Schema lifecycle for the SQLite store.

use std::str::FromStr;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tracing::{info, warn};

use usermgmt_core::{AppError, AppResult};
use usermgmt_domain::WellKnownRole;

use crate::demo_seed::seed_demo_rows;
use crate::sqlite_errors::storage_error;

/// Junction first so foreign keys never dangle while dropping.
const DROP_STATEMENTS: &[&str] = &[
    "DROP TABLE IF EXISTS role_permissions",
    "DROP TABLE IF EXISTS users",
    "DROP TABLE IF EXISTS permissions",
    "DROP TABLE IF EXISTS roles",
];

const CREATE_STATEMENTS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS roles (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS permissions (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE,
        description TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        username TEXT NOT NULL UNIQUE,
        email TEXT NOT NULL UNIQUE,
        role_id INTEGER REFERENCES roles(id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS role_permissions (
        role_id INTEGER REFERENCES roles(id),
        permission_id INTEGER REFERENCES permissions(id),
        PRIMARY KEY (role_id, permission_id)
    )
    "#,
];

/// How the schema is prepared before the store is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitMode {
    /// Create missing tables and seed roles; existing data is kept.
    Preserve,
    /// Drop and recreate every table, then seed roles.
    Reset,
    /// Reset, then load example permissions, grants and users.
    ResetWithDemo,
}

impl InitMode {
    /// Returns the configuration string for this mode.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Preserve => "preserve",
            Self::Reset => "reset",
            Self::ResetWithDemo => "reset_with_demo",
        }
    }

    /// Parses a configuration string into an init mode.
    pub fn parse(value: &str) -> AppResult<Self> {
        match value {
            "preserve" => Ok(Self::Preserve),
            "reset" => Ok(Self::Reset),
            "reset_with_demo" => Ok(Self::ResetWithDemo),
            _ => Err(AppError::InvalidInput(format!(
                "unknown init mode '{value}', expected preserve, reset or reset_with_demo"
            ))),
        }
    }

    /// Returns whether the mode discards existing data.
    #[must_use]
    pub fn is_destructive(&self) -> bool {
        !matches!(self, Self::Preserve)
    }
}

/// Opens a pool for the given SQLite URL, creating the database file if missing.
///
/// In-memory databases are private to their connection, so their pool is held
/// at one connection whatever `max_connections` asks for.
pub async fn connect(database_url: &str, max_connections: u32) -> AppResult<SqlitePool> {
    let max_connections = pool_size(database_url, max_connections)?;
    let options = SqliteConnectOptions::from_str(database_url)
        .map_err(|error| {
            AppError::InvalidInput(format!("invalid DATABASE_URL '{database_url}': {error}"))
        })?
        .create_if_missing(true)
        .foreign_keys(true);

    // In-memory databases live only as long as their connection.
    SqlitePoolOptions::new()
        .max_connections(max_connections)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .map_err(|error| storage_error(error, "connect to database"))
}

fn pool_size(database_url: &str, requested: u32) -> AppResult<u32> {
    if requested == 0 {
        return Err(AppError::InvalidInput(
            "pool size must be greater than zero".to_owned(),
        ));
    }

    if requested > 1 && is_in_memory(database_url) {
        warn!(requested, "in-memory database limited to one connection");
        return Ok(1);
    }

    Ok(requested)
}

fn is_in_memory(database_url: &str) -> bool {
    database_url.contains(":memory:") || database_url.contains("mode=memory")
}

/// Prepares the schema according to `mode` in a single transaction.
pub async fn initialize(pool: &SqlitePool, mode: InitMode) -> AppResult<()> {
    let mut transaction = pool
        .begin()
        .await
        .map_err(|error| storage_error(error, "begin transaction"))?;

    if mode.is_destructive() {
        warn!(mode = mode.as_str(), "dropping all tables");
        for statement in DROP_STATEMENTS.iter().copied() {
            sqlx::query(statement)
                .execute(&mut *transaction)
                .await
                .map_err(|error| storage_error(error, "drop table"))?;
        }
    }

    for statement in CREATE_STATEMENTS.iter().copied() {
        sqlx::query(statement)
            .execute(&mut *transaction)
            .await
            .map_err(|error| storage_error(error, "create table"))?;
    }

    for role in WellKnownRole::all() {
        sqlx::query("INSERT OR IGNORE INTO roles (name) VALUES (?)")
            .bind(role.as_str())
            .execute(&mut *transaction)
            .await
            .map_err(|error| storage_error(error, "seed role"))?;
    }

    if mode == InitMode::ResetWithDemo {
        seed_demo_rows(&mut transaction).await?;
    }

    transaction
        .commit()
        .await
        .map_err(|error| storage_error(error, "commit transaction"))?;

    info!(mode = mode.as_str(), "database initialized");
    Ok(())
}

#[cfg(test)]
pub(crate) async fn memory_pool() -> SqlitePool {
    let pool = match connect("sqlite::memory:", 1).await {
        Ok(pool) => pool,
        Err(error) => panic!("failed to open in-memory database in test: {error}"),
    };

    if let Err(error) = initialize(&pool, InitMode::Reset).await {
        panic!("failed to initialize in-memory database in test: {error}");
    }

    pool
}
