//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod demo_seed;
mod schema;
mod sqlite_errors;
mod sqlite_permission_repository;
mod sqlite_role_repository;
mod sqlite_user_repository;

pub use demo_seed::seed_demo_data;
pub use schema::{InitMode, connect, initialize};
pub use sqlite_permission_repository::SqlitePermissionRepository;
pub use sqlite_role_repository::SqliteRoleRepository;
pub use sqlite_user_repository::SqliteUserRepository;
