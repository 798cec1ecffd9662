//! Application services and ports.

#![forbid(unsafe_code)]

mod permission_service;
mod role_service;
mod user_service;

pub use permission_service::{PermissionRepository, PermissionService};
pub use role_service::{RoleRepository, RoleService};
pub use user_service::{
    CreateUserInput, NewUser, UpdateUserInput, UserRepository, UserService, UserUpdate,
};
