use usermgmt_core::AppError;

/// Maps a driver failure that no constraint explains.
pub(crate) fn storage_error(error: sqlx::Error, operation: &str) -> AppError {
    AppError::StorageUnavailable(format!("failed to {operation}: {error}"))
}

/// Maps a write failure, translating constraint violations into domain errors.
pub(crate) fn write_error(error: sqlx::Error, operation: &str, conflict: &str) -> AppError {
    if let sqlx::Error::Database(database_error) = &error
        && database_error.is_unique_violation()
    {
        return AppError::DuplicateKey(conflict.to_owned());
    }

    if let sqlx::Error::Database(database_error) = &error
        && database_error.is_foreign_key_violation()
    {
        return AppError::NotFound(format!(
            "failed to {operation}: referenced role or permission does not exist"
        ));
    }

    storage_error(error, operation)
}
