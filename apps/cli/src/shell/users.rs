use usermgmt_application::UpdateUserInput;
use usermgmt_domain::UserId;

use super::*;

impl<R, W> Shell<R, W>
where
    R: BufRead,
    W: Write,
{
    pub(super) async fn manage_users(&mut self) -> CliResult<()> {
        loop {
            writeln!(self.output, "\n=== Manage users ===")?;
            writeln!(self.output, "1. Edit user")?;
            writeln!(self.output, "2. Delete user")?;
            writeln!(self.output, "3. Change user role")?;
            writeln!(self.output, "4. Back")?;

            let Some(choice) = self.prompt("\nChoice (1-4): ")? else {
                return Ok(());
            };

            let outcome = match choice.trim() {
                "1" => self.edit_user().await,
                "2" => self.delete_user().await,
                "3" => self.change_user_role().await,
                "4" => return Ok(()),
                _ => self.say("Invalid choice."),
            };
            self.settle(outcome)?;
        }
    }

    /// Lists users and reads the chosen id. `None` when there is nothing to pick or input ended.
    async fn pick_user(&mut self, label: &str) -> CliResult<Option<UserId>> {
        let users = self.services.users.list_users().await?;
        if users.is_empty() {
            self.say("No users available.")?;
            return Ok(None);
        }

        self.write_user_choices(&users)?;
        let Some(answer) = self.prompt(label)? else {
            return Ok(None);
        };

        Ok(Some(UserId::parse(&answer)?))
    }

    async fn edit_user(&mut self) -> CliResult<()> {
        writeln!(self.output, "\n=== Edit user ===")?;
        let Some(user_id) = self.pick_user("\nUser ID to edit: ").await? else {
            return Ok(());
        };
        let Some(user) = self.services.users.find_user(user_id).await? else {
            return self.say("User not found.");
        };

        writeln!(self.output, "\nCurrent values:")?;
        writeln!(self.output, "Username: {}", user.username)?;
        writeln!(self.output, "Email: {}", user.email)?;

        let Some(username) = self.prompt("\nNew username (Enter keeps current): ")? else {
            return Ok(());
        };
        let Some(email) = self.prompt("New email (Enter keeps current): ")? else {
            return Ok(());
        };

        let updated = self
            .services
            .users
            .update_user(UpdateUserInput {
                user_id: user.id,
                username: keep_or_replace(user.username, username),
                email: keep_or_replace(user.email, email),
                role_id: Some(user.role_id),
            })
            .await?;

        writeln!(self.output, "\nUser updated:")?;
        self.write_user(&updated)
    }

    async fn delete_user(&mut self) -> CliResult<()> {
        writeln!(self.output, "\n=== Delete user ===")?;
        let Some(user_id) = self.pick_user("\nUser ID to delete: ").await? else {
            return Ok(());
        };
        let Some(user) = self.services.users.find_user(user_id).await? else {
            return self.say("User not found.");
        };

        let question = format!("Delete user '{}'? (j/n): ", user.username);
        let Some(answer) = self.prompt(&question)? else {
            return Ok(());
        };
        if !confirmed(&answer) {
            return self.say("Deletion cancelled.");
        }

        self.services.users.delete_user(user.id).await?;
        self.say("User deleted.")
    }

    async fn change_user_role(&mut self) -> CliResult<()> {
        writeln!(self.output, "\n=== Change user role ===")?;
        let Some(user_id) = self.pick_user("\nUser ID: ").await? else {
            return Ok(());
        };
        if self.services.users.find_user(user_id).await?.is_none() {
            return self.say("User not found.");
        }

        let roles = self.services.roles.list_roles().await?;
        self.write_role_choices(&roles)?;
        let Some(answer) = self.prompt("\nNew role ID: ")? else {
            return Ok(());
        };
        let role_id = RoleId::parse(&answer)?;
        let Some(role) = self.services.roles.find_role(role_id).await? else {
            return self.say("Role not found.");
        };

        let updated = self.services.users.change_role(user_id, role.id).await?;
        writeln!(
            self.output,
            "\nRole of '{}' is now {}.",
            updated.username, updated.role_name
        )?;
        Ok(())
    }
}

fn keep_or_replace(current: String, replacement: String) -> String {
    if replacement.trim().is_empty() {
        current
    } else {
        replacement
    }
}
