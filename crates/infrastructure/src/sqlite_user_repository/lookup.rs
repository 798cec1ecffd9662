use super::*;

impl SqliteUserRepository {
    pub(super) async fn find_by_username_impl(&self, username: &str) -> AppResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT users.id, users.username, users.email, users.role_id, roles.name AS role_name
            FROM users
            INNER JOIN roles ON roles.id = users.role_id
            WHERE users.username = ?
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| storage_error(error, "find user by username"))?;

        Ok(row.map(User::from))
    }

    pub(super) async fn list_impl(&self) -> AppResult<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT users.id, users.username, users.email, users.role_id, roles.name AS role_name
            FROM users
            INNER JOIN roles ON roles.id = users.role_id
            ORDER BY users.id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|error| storage_error(error, "list users"))?;

        Ok(rows.into_iter().map(User::from).collect())
    }
}
