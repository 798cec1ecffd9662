//! Interactive administration menu.
//!
//! The shell reads one line per prompt from any `BufRead` and writes plain
//! text to any `Write`, so the same code drives the terminal and the tests.
//! Errors raised by an action are printed and the menu continues; only
//! console I/O failures end the session. End of input behaves like quit.

use std::io::{BufRead, Write};

use sqlx::SqlitePool;
use tracing::{error, info, warn};

use usermgmt_application::{CreateUserInput, PermissionService, RoleService, UserService};
use usermgmt_core::AppError;
use usermgmt_domain::{Permission, Role, RoleId, User};
use usermgmt_infrastructure::{InitMode, initialize};

use crate::error::{CliError, CliResult};

mod permissions;
mod users;

#[cfg(test)]
mod tests;

/// Services the shell operates on.
#[derive(Clone)]
pub struct ShellServices {
    pub users: UserService,
    pub roles: RoleService,
    pub permissions: PermissionService,
    /// Store handle for the destructive reset action.
    pub pool: SqlitePool,
}

pub struct Shell<R, W> {
    input: R,
    output: W,
    services: ShellServices,
}

impl<R, W> Shell<R, W>
where
    R: BufRead,
    W: Write,
{
    pub fn new(input: R, output: W, services: ShellServices) -> Self {
        Self {
            input,
            output,
            services,
        }
    }

    /// Runs the main menu until the operator quits or input ends.
    pub async fn run(&mut self) -> CliResult<()> {
        loop {
            writeln!(self.output, "\n=== User Management ===")?;
            writeln!(self.output, "1. List users")?;
            writeln!(self.output, "2. Database overview")?;
            writeln!(self.output, "3. Create user")?;
            writeln!(self.output, "4. Manage users")?;
            writeln!(self.output, "5. Manage permissions")?;
            writeln!(self.output, "6. Reset database")?;
            writeln!(self.output, "7. Quit")?;

            let Some(choice) = self.prompt("\nChoice (1-7): ")? else {
                break;
            };

            let outcome = match choice.trim() {
                "1" => self.show_users().await,
                "2" => self.show_overview().await,
                "3" => self.create_user().await,
                "4" => self.manage_users().await,
                "5" => self.manage_permissions().await,
                "6" => self.reset_database().await,
                "7" => break,
                _ => self.say("Invalid choice, please try again."),
            };
            self.settle(outcome)?;
        }

        writeln!(self.output, "Goodbye.")?;
        self.output.flush()?;
        Ok(())
    }

    /// Prints an application error and keeps the session alive.
    fn settle(&mut self, outcome: CliResult<()>) -> CliResult<()> {
        match outcome {
            Err(CliError::App(app_error)) => {
                if app_error.is_client_error() {
                    warn!(error = %app_error, "action rejected");
                } else {
                    error!(error = %app_error, "action failed");
                }
                writeln!(self.output, "Error: {app_error}")?;
                Ok(())
            }
            other => other,
        }
    }

    fn prompt(&mut self, label: &str) -> CliResult<Option<String>> {
        write!(self.output, "{label}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }

        Ok(Some(line.trim_end_matches(['\r', '\n']).to_owned()))
    }

    fn say(&mut self, message: &str) -> CliResult<()> {
        writeln!(self.output, "{message}")?;
        Ok(())
    }

    async fn show_users(&mut self) -> CliResult<()> {
        let users = self.services.users.list_users().await?;

        writeln!(self.output, "\n=== Users ===")?;
        if users.is_empty() {
            return self.say("No users found.");
        }

        for user in &users {
            self.write_user(user)?;
        }
        Ok(())
    }

    async fn show_overview(&mut self) -> CliResult<()> {
        let roles = self.services.roles.list_roles().await?;
        let users = self.services.users.list_users().await?;
        let permissions = self.services.permissions.list_permissions().await?;
        let grants = self.services.permissions.list_role_permissions().await?;
        let admin_count = self.services.users.admin_count().await?;

        writeln!(self.output, "\n=== Database overview ===")?;
        writeln!(self.output, "\nRoles:")?;
        for role in &roles {
            writeln!(self.output, "ID: {}, Name: {}", role.id, role.name)?;
        }

        writeln!(self.output, "\nUsers:")?;
        for user in &users {
            writeln!(
                self.output,
                "ID: {}, Username: {}, Email: {}, Role: {}",
                user.id, user.username, user.email, user.role_name
            )?;
        }

        writeln!(self.output, "\nPermissions:")?;
        for permission in &permissions {
            writeln!(
                self.output,
                "ID: {}, Name: {}, Description: {}",
                permission.id,
                permission.name,
                describe(permission)
            )?;
        }

        writeln!(self.output, "\nRole permissions:")?;
        for grant in &grants {
            writeln!(
                self.output,
                "Role: {}, Permission: {}",
                grant.role_name, grant.permission_name
            )?;
        }

        writeln!(self.output, "\nAdministrators: {admin_count}")?;
        Ok(())
    }

    async fn create_user(&mut self) -> CliResult<()> {
        writeln!(self.output, "\n=== Create user ===")?;
        let Some(username) = self.prompt("Username: ")? else {
            return Ok(());
        };
        let Some(email) = self.prompt("Email: ")? else {
            return Ok(());
        };

        let roles = self.services.roles.list_roles().await?;
        self.write_role_choices(&roles)?;
        let Some(role) = self.prompt("Role ID: ")? else {
            return Ok(());
        };
        let role_id = optional_role_id(&role)?;

        let user = self
            .services
            .users
            .create_user(CreateUserInput {
                username,
                email,
                role_id,
            })
            .await?;

        writeln!(self.output, "\nUser created:")?;
        self.write_user(&user)
    }

    async fn reset_database(&mut self) -> CliResult<()> {
        writeln!(self.output, "\n=== Reset database ===")?;
        let Some(answer) = self.prompt("All data will be deleted. Continue? (j/n): ")? else {
            return Ok(());
        };

        if !confirmed(&answer) {
            return self.say("Cancelled.");
        }

        initialize(&self.services.pool, InitMode::ResetWithDemo).await?;
        info!("database reset from console");

        writeln!(self.output, "Database reset and initialized.")?;
        writeln!(self.output, "\nDefault users:")?;
        writeln!(self.output, "1. admin/admin@test.com (ADMIN)")?;
        writeln!(self.output, "2. user/user@test.com (USER)")?;
        Ok(())
    }

    fn write_user(&mut self, user: &User) -> CliResult<()> {
        writeln!(self.output, "\nID: {}", user.id)?;
        writeln!(self.output, "Username: {}", user.username)?;
        writeln!(self.output, "Email: {}", user.email)?;
        writeln!(self.output, "Role: {}", user.role_name)?;
        writeln!(self.output, "------------------------")?;
        Ok(())
    }

    fn write_user_choices(&mut self, users: &[User]) -> CliResult<()> {
        writeln!(self.output, "\nUsers:")?;
        for user in users {
            writeln!(
                self.output,
                "{}. {} ({}, {})",
                user.id, user.username, user.email, user.role_name
            )?;
        }
        Ok(())
    }

    fn write_role_choices(&mut self, roles: &[Role]) -> CliResult<()> {
        writeln!(self.output, "\nRoles:")?;
        for role in roles {
            writeln!(self.output, "{}. {}", role.id, role.name)?;
        }
        Ok(())
    }

    fn write_permission_choices(&mut self, permissions: &[Permission]) -> CliResult<()> {
        writeln!(self.output, "\nPermissions:")?;
        for permission in permissions {
            writeln!(self.output, "{}. {}", permission.id, permission.name)?;
        }
        Ok(())
    }
}

/// Accepts the German and English affirmatives.
fn confirmed(answer: &str) -> bool {
    matches!(
        answer.trim().to_ascii_lowercase().as_str(),
        "j" | "ja" | "y" | "yes"
    )
}

fn optional_role_id(value: &str) -> Result<Option<RoleId>, AppError> {
    if value.trim().is_empty() {
        return Ok(None);
    }

    RoleId::parse(value).map(Some)
}

fn describe(permission: &Permission) -> &str {
    permission.description.as_deref().unwrap_or("-")
}
