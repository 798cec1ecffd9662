use super::*;

impl UserService {
    /// Validates and creates a user.
    pub async fn create_user(&self, input: CreateUserInput) -> AppResult<User> {
        let (username, email, role_id) =
            validate_user_data(input.username, input.email, input.role_id)?;

        if self
            .user_repository
            .find_by_username(username.as_str())
            .await?
            .is_some()
        {
            return Err(AppError::DuplicateKey(format!(
                "username '{}' already exists",
                username.as_str()
            )));
        }

        let user = self
            .user_repository
            .create(NewUser {
                username: username.into(),
                email: email.into(),
                role_id,
            })
            .await?;

        info!(user_id = %user.id, username = %user.username, role = %user.role_name, "user created");
        Ok(user)
    }

    /// Validates and applies a full-record update.
    pub async fn update_user(&self, input: UpdateUserInput) -> AppResult<User> {
        let (username, email, role_id) =
            validate_user_data(input.username, input.email, input.role_id)?;

        let user = self
            .user_repository
            .update(UserUpdate {
                id: input.user_id,
                username: username.into(),
                email: email.into(),
                role_id,
            })
            .await?;

        info!(user_id = %user.id, username = %user.username, role = %user.role_name, "user updated");
        Ok(user)
    }

    /// Reassigns a user to another role, keeping username and email.
    pub async fn change_role(&self, user_id: UserId, role_id: RoleId) -> AppResult<User> {
        let current = self.require_user(user_id).await?;

        self.update_user(UpdateUserInput {
            user_id,
            username: current.username,
            email: current.email,
            role_id: Some(role_id),
        })
        .await
    }

    /// Deletes a user.
    pub async fn delete_user(&self, user_id: UserId) -> AppResult<()> {
        self.user_repository.delete(user_id).await?;

        info!(user_id = %user_id, "user deleted");
        Ok(())
    }
}

fn validate_user_data(
    username: String,
    email: String,
    role_id: Option<RoleId>,
) -> AppResult<(Username, EmailAddress, RoleId)> {
    let username = Username::new(username)?;
    let email = EmailAddress::new(email)?;
    let role_id =
        role_id.ok_or_else(|| AppError::InvalidInput("role must not be empty".to_owned()))?;

    Ok((username, email, role_id))
}
