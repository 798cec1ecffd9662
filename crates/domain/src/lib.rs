//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod identifier;
mod security;
mod user;

pub use identifier::{PermissionId, RoleId, UserId, parse_identifier};
pub use security::{Permission, Role, RoleName, RolePermission, WellKnownRole};
pub use user::{EmailAddress, User, Username};
