use sqlx::SqliteConnection;
use tracing::warn;
use usermgmt_domain::Role;

use super::*;

// The last-admin rule is check-then-act. It holds because every read and the
// write share one transaction on a single-writer SQLite database; a
// multi-writer store would need a conditional write or a row lock instead.

impl SqliteUserRepository {
    pub(super) async fn create_impl(&self, user: NewUser) -> AppResult<User> {
        let mut transaction = self
            .pool
            .begin()
            .await
            .map_err(|error| storage_error(error, "begin transaction"))?;

        ensure_username_free(&mut transaction, &user.username, None).await?;
        ensure_email_free(&mut transaction, &user.email, None).await?;
        find_role(&mut transaction, user.role_id).await?;

        let inserted = sqlx::query(
            r#"
            INSERT INTO users (username, email, role_id)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(&user.username)
        .bind(&user.email)
        .bind(user.role_id.as_i64())
        .execute(&mut *transaction)
        .await
        .map_err(|error| user_conflict_or_storage(error, "create user"))?;

        let user_id = UserId::new(inserted.last_insert_rowid());
        let created = fetch_user(&mut *transaction, user_id)
            .await?
            .ok_or_else(|| {
                AppError::StorageUnavailable(format!("created user {user_id} could not be read"))
            })?;

        transaction
            .commit()
            .await
            .map_err(|error| storage_error(error, "commit transaction"))?;

        Ok(created)
    }

    pub(super) async fn update_impl(&self, update: UserUpdate) -> AppResult<User> {
        let mut transaction = self
            .pool
            .begin()
            .await
            .map_err(|error| storage_error(error, "begin transaction"))?;

        let current = fetch_user(&mut *transaction, update.id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user {} was not found", update.id)))?;

        ensure_username_free(&mut transaction, &update.username, Some(update.id)).await?;
        ensure_email_free(&mut transaction, &update.email, Some(update.id)).await?;
        let new_role = find_role(&mut transaction, update.role_id).await?;

        if current.is_admin() && !new_role.is_admin() {
            ensure_other_admin_exists(&mut transaction, update.id, "lose the ADMIN role").await?;
        }

        let rows_affected = sqlx::query(
            r#"
            UPDATE users
            SET username = ?, email = ?, role_id = ?
            WHERE id = ?
            "#,
        )
        .bind(&update.username)
        .bind(&update.email)
        .bind(update.role_id.as_i64())
        .bind(update.id.as_i64())
        .execute(&mut *transaction)
        .await
        .map_err(|error| user_conflict_or_storage(error, "update user"))?
        .rows_affected();

        if rows_affected == 0 {
            return Err(AppError::NotFound(format!(
                "user {} was not found",
                update.id
            )));
        }

        let updated = fetch_user(&mut *transaction, update.id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user {} was not found", update.id)))?;

        transaction
            .commit()
            .await
            .map_err(|error| storage_error(error, "commit transaction"))?;

        Ok(updated)
    }

    pub(super) async fn delete_impl(&self, user_id: UserId) -> AppResult<()> {
        let mut transaction = self
            .pool
            .begin()
            .await
            .map_err(|error| storage_error(error, "begin transaction"))?;

        if let Some(current) = fetch_user(&mut *transaction, user_id).await?
            && current.is_admin()
        {
            ensure_other_admin_exists(&mut transaction, user_id, "be deleted").await?;
        }

        let rows_affected = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(user_id.as_i64())
            .execute(&mut *transaction)
            .await
            .map_err(|error| storage_error(error, "delete user"))?
            .rows_affected();

        if rows_affected == 0 {
            return Err(AppError::NotFound(format!("user {user_id} was not found")));
        }

        transaction
            .commit()
            .await
            .map_err(|error| storage_error(error, "commit transaction"))?;

        Ok(())
    }
}

async fn find_role(connection: &mut SqliteConnection, role_id: RoleId) -> AppResult<Role> {
    let name = sqlx::query_scalar::<_, String>("SELECT name FROM roles WHERE id = ?")
        .bind(role_id.as_i64())
        .fetch_optional(&mut *connection)
        .await
        .map_err(|error| storage_error(error, "resolve role"))?
        .ok_or_else(|| AppError::NotFound(format!("role {role_id} was not found")))?;

    Ok(Role {
        id: role_id,
        name,
        permissions: Vec::new(),
    })
}

async fn ensure_other_admin_exists(
    connection: &mut SqliteConnection,
    user_id: UserId,
    action: &str,
) -> AppResult<()> {
    let admin_count = count_admins(&mut *connection).await?;
    if admin_count <= 1 {
        warn!(user_id = %user_id, admin_count, "rejected change to last administrator");
        return Err(AppError::InvariantViolation(format!(
            "user {user_id} is the last administrator and cannot {action}"
        )));
    }

    Ok(())
}

async fn ensure_username_free(
    connection: &mut SqliteConnection,
    username: &str,
    except: Option<UserId>,
) -> AppResult<()> {
    let taken = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM users WHERE username = ? AND id IS NOT ?)",
    )
    .bind(username)
    .bind(except.map(|user_id| user_id.as_i64()))
    .fetch_one(&mut *connection)
    .await
    .map_err(|error| storage_error(error, "check username"))?;

    if taken {
        return Err(AppError::DuplicateKey(format!(
            "username '{username}' already exists"
        )));
    }

    Ok(())
}

async fn ensure_email_free(
    connection: &mut SqliteConnection,
    email: &str,
    except: Option<UserId>,
) -> AppResult<()> {
    let taken = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM users WHERE email = ? AND id IS NOT ?)",
    )
    .bind(email)
    .bind(except.map(|user_id| user_id.as_i64()))
    .fetch_one(&mut *connection)
    .await
    .map_err(|error| storage_error(error, "check email"))?;

    if taken {
        return Err(AppError::DuplicateKey(format!(
            "email '{email}' already exists"
        )));
    }

    Ok(())
}
