use std::sync::Arc;

use sqlx::SqlitePool;
use usermgmt_application::{PermissionService, RoleService, UserService};
use usermgmt_infrastructure::{
    SqlitePermissionRepository, SqliteRoleRepository, SqliteUserRepository,
};

use crate::shell::ShellServices;

pub fn build_shell_services(pool: SqlitePool) -> ShellServices {
    let user_repository = Arc::new(SqliteUserRepository::new(pool.clone()));
    let role_repository = Arc::new(SqliteRoleRepository::new(pool.clone()));
    let permission_repository = Arc::new(SqlitePermissionRepository::new(pool.clone()));

    ShellServices {
        users: UserService::new(user_repository),
        roles: RoleService::new(role_repository),
        permissions: PermissionService::new(permission_repository),
        pool,
    }
}
