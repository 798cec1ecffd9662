use usermgmt_domain::PermissionId;

use super::*;

impl<R, W> Shell<R, W>
where
    R: BufRead,
    W: Write,
{
    pub(super) async fn manage_permissions(&mut self) -> CliResult<()> {
        loop {
            writeln!(self.output, "\n=== Manage permissions ===")?;
            writeln!(self.output, "1. List permissions")?;
            writeln!(self.output, "2. Show role permissions")?;
            writeln!(self.output, "3. Add permission to role")?;
            writeln!(self.output, "4. Remove permission from role")?;
            writeln!(self.output, "5. Create permission")?;
            writeln!(self.output, "6. Create role")?;
            writeln!(self.output, "7. Back")?;

            let Some(choice) = self.prompt("\nChoice (1-7): ")? else {
                return Ok(());
            };

            let outcome = match choice.trim() {
                "1" => self.show_permissions().await,
                "2" => self.show_role_permissions().await,
                "3" => self.add_permission_to_role().await,
                "4" => self.remove_permission_from_role().await,
                "5" => self.create_permission().await,
                "6" => self.create_role().await,
                "7" => return Ok(()),
                _ => self.say("Invalid choice."),
            };
            self.settle(outcome)?;
        }
    }

    async fn pick_role(&mut self) -> CliResult<Option<RoleId>> {
        let roles = self.services.roles.list_roles().await?;
        self.write_role_choices(&roles)?;

        let Some(answer) = self.prompt("\nRole ID: ")? else {
            return Ok(None);
        };
        Ok(Some(RoleId::parse(&answer)?))
    }

    async fn show_permissions(&mut self) -> CliResult<()> {
        let permissions = self.services.permissions.list_permissions().await?;

        writeln!(self.output, "\n=== Permissions ===")?;
        if permissions.is_empty() {
            return self.say("No permissions defined.");
        }
        for permission in &permissions {
            writeln!(self.output, "\nID: {}", permission.id)?;
            writeln!(self.output, "Name: {}", permission.name)?;
            writeln!(self.output, "Description: {}", describe(permission))?;
        }
        Ok(())
    }

    async fn show_role_permissions(&mut self) -> CliResult<()> {
        let Some(role_id) = self.pick_role().await? else {
            return Ok(());
        };
        let role = self
            .services
            .roles
            .get_role_with_permissions(role_id)
            .await?;

        writeln!(self.output, "\nPermissions of role '{}':", role.name)?;
        if role.permissions.is_empty() {
            return self.say("(none)");
        }
        for permission in &role.permissions {
            writeln!(
                self.output,
                "- {}: {}",
                permission.name,
                describe(permission)
            )?;
        }
        Ok(())
    }

    async fn add_permission_to_role(&mut self) -> CliResult<()> {
        writeln!(self.output, "\n=== Add permission to role ===")?;
        let Some(role_id) = self.pick_role().await? else {
            return Ok(());
        };

        let permissions = self.services.permissions.list_permissions().await?;
        self.write_permission_choices(&permissions)?;
        let Some(answer) = self.prompt("\nPermission ID: ")? else {
            return Ok(());
        };
        let permission_id = PermissionId::parse(&answer)?;

        self.services
            .permissions
            .assign_permission(role_id, permission_id)
            .await?;
        self.say("Permission added.")
    }

    async fn remove_permission_from_role(&mut self) -> CliResult<()> {
        writeln!(self.output, "\n=== Remove permission from role ===")?;
        let Some(role_id) = self.pick_role().await? else {
            return Ok(());
        };
        let role = self
            .services
            .roles
            .get_role_with_permissions(role_id)
            .await?;
        if role.permissions.is_empty() {
            return self.say("Role has no permissions.");
        }

        writeln!(self.output, "\nCurrent permissions of '{}':", role.name)?;
        self.write_permission_choices(&role.permissions)?;
        let Some(answer) = self.prompt("\nPermission ID to remove: ")? else {
            return Ok(());
        };
        let permission_id = PermissionId::parse(&answer)?;

        self.services
            .permissions
            .revoke_permission(role_id, permission_id)
            .await?;
        self.say("Permission removed.")
    }

    async fn create_permission(&mut self) -> CliResult<()> {
        writeln!(self.output, "\n=== Create permission ===")?;
        let Some(name) = self.prompt("Name: ")? else {
            return Ok(());
        };
        let Some(description) = self.prompt("Description (optional): ")? else {
            return Ok(());
        };
        let description = Some(description.trim()).filter(|value| !value.is_empty());

        let permission = self
            .services
            .permissions
            .create_permission(&name, description)
            .await?;
        writeln!(
            self.output,
            "Permission '{}' created with ID {}.",
            permission.name, permission.id
        )?;
        Ok(())
    }

    async fn create_role(&mut self) -> CliResult<()> {
        writeln!(self.output, "\n=== Create role ===")?;
        let Some(name) = self.prompt("Name: ")? else {
            return Ok(());
        };

        let role = self.services.roles.create_role(&name).await?;
        writeln!(
            self.output,
            "Role '{}' created with ID {}.",
            role.name, role.id
        )?;
        Ok(())
    }
}
