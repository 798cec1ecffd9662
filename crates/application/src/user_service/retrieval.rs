use super::*;

impl UserService {
    /// Returns a user by identifier, if it exists.
    pub async fn find_user(&self, user_id: UserId) -> AppResult<Option<User>> {
        self.user_repository.find_by_id(user_id).await
    }

    /// Returns a user by username, if it exists.
    pub async fn find_user_by_username(&self, username: &str) -> AppResult<Option<User>> {
        self.user_repository.find_by_username(username).await
    }

    /// Returns a user by identifier or fails with `NotFound`.
    pub async fn require_user(&self, user_id: UserId) -> AppResult<User> {
        self.user_repository
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user {user_id} was not found")))
    }
}
