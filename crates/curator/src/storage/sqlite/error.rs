//! SQLite error mapping.
//!
//! Maps `tokio_rusqlite::Error` and `rusqlite::Error` to `RepositoryError`.
//! Domain failures raised inside a `call` closure travel as
//! `tokio_rusqlite::Error::Other(RepositoryError)` so that returning them
//! drops (and rolls back) any open transaction; they come out unchanged.

use curator_core::storage::RepositoryError;

/// Helper to wrap rusqlite errors for tokio_rusqlite closures.
pub fn wrap_err(e: rusqlite::Error) -> tokio_rusqlite::Error {
    tokio_rusqlite::Error::Rusqlite(e)
}

/// Raises a domain error from inside a `call` closure.
pub fn domain_err(e: RepositoryError) -> tokio_rusqlite::Error {
    tokio_rusqlite::Error::Other(Box::new(e))
}

/// Extracts the column from `UNIQUE constraint failed: users.email`.
fn constraint_field(message: Option<&str>) -> String {
    message
        .and_then(|m| m.split_once("constraint failed: "))
        .map(|(_, columns)| columns.split(',').next().unwrap_or(columns).trim())
        .and_then(|column| column.rsplit('.').next())
        .filter(|field| !field.is_empty())
        .unwrap_or("unknown")
        .to_string()
}

/// Maps a rusqlite error to a RepositoryError.
///
/// # Error Mapping
///
/// - `SQLITE_CONSTRAINT_UNIQUE` / `SQLITE_CONSTRAINT_PRIMARYKEY` → `RepositoryError::Conflict`
/// - `SQLITE_CONSTRAINT_FOREIGNKEY` → `RepositoryError::InvalidInput`
/// - Cannot open, busy, locked → `RepositoryError::StorageUnavailable`
/// - All other errors → `RepositoryError::QueryFailed`
fn map_rusqlite_error(err: &rusqlite::Error, entity_type: &'static str) -> RepositoryError {
    match err {
        rusqlite::Error::SqliteFailure(sqlite_err, message)
            if sqlite_err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                || sqlite_err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY =>
        {
            RepositoryError::conflict(entity_type, constraint_field(message.as_deref()))
        }

        rusqlite::Error::SqliteFailure(sqlite_err, _)
            if sqlite_err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY =>
        {
            RepositoryError::InvalidInput(format!(
                "Foreign key constraint violation for {entity_type}"
            ))
        }

        rusqlite::Error::SqliteFailure(sqlite_err, _)
            if matches!(
                sqlite_err.code,
                rusqlite::ErrorCode::CannotOpen
                    | rusqlite::ErrorCode::DatabaseBusy
                    | rusqlite::ErrorCode::DatabaseLocked
            ) =>
        {
            RepositoryError::StorageUnavailable(err.to_string())
        }

        rusqlite::Error::QueryReturnedNoRows => RepositoryError::not_found(entity_type, "unknown"),

        _ => RepositoryError::QueryFailed(err.to_string()),
    }
}

fn map_other(err: Box<dyn std::error::Error + Send + Sync + 'static>) -> RepositoryError {
    match err.downcast::<RepositoryError>() {
        Ok(domain) => *domain,
        Err(other) => RepositoryError::QueryFailed(other.to_string()),
    }
}

/// Maps a tokio_rusqlite error to a RepositoryError.
///
/// This is the main entry point for error mapping in async code.
pub fn map_tokio_rusqlite_error(
    err: tokio_rusqlite::Error,
    entity_type: &'static str,
) -> RepositoryError {
    match err {
        tokio_rusqlite::Error::Rusqlite(rusqlite_err) => {
            map_rusqlite_error(&rusqlite_err, entity_type)
        }
        tokio_rusqlite::Error::Other(other) => map_other(other),
        tokio_rusqlite::Error::ConnectionClosed | tokio_rusqlite::Error::Close(_) => {
            RepositoryError::StorageUnavailable("Connection closed unexpectedly".to_string())
        }
        other => RepositoryError::QueryFailed(other.to_string()),
    }
}

/// Maps a tokio_rusqlite error with a known ID to a RepositoryError.
///
/// Use this variant when the entity ID is known at the call site.
pub fn map_tokio_rusqlite_error_with_id(
    err: tokio_rusqlite::Error,
    entity_type: &'static str,
    id: impl Into<String>,
) -> RepositoryError {
    match err {
        tokio_rusqlite::Error::Rusqlite(rusqlite::Error::QueryReturnedNoRows) => {
            RepositoryError::not_found(entity_type, id.into())
        }
        other => map_tokio_rusqlite_error(other, entity_type),
    }
}
