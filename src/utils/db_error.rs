//! Translation of `sqlx` errors into the storage taxonomy.

use crate::domain::error::StoreError;

/// Name PostgreSQL gives the primary key constraint of the `urls` table.
const SHORT_ID_CONSTRAINT: &str = "urls_pkey";

/// Returns true if `e` is a unique violation on the short ID primary key.
pub fn is_unique_violation_on_id(e: &sqlx::Error) -> bool {
    let Some(db_err) = e.as_database_error() else {
        return false;
    };

    if !db_err.is_unique_violation() {
        return false;
    }

    matches!(db_err.constraint(), Some(SHORT_ID_CONSTRAINT))
}

/// Maps a driver error onto [`StoreError`].
///
/// - unique violation on the short ID → [`StoreError::Internal`] (ID collision)
/// - any other unique violation → [`StoreError::DuplicateUrl`]
/// - `RowNotFound` → [`StoreError::NotFound`]
/// - everything else → [`StoreError::Internal`]
pub fn map_sqlx_error(e: sqlx::Error) -> StoreError {
    if is_unique_violation_on_id(&e) {
        return StoreError::internal("short id collision");
    }

    if let Some(db_err) = e.as_database_error()
        && db_err.is_unique_violation()
    {
        return StoreError::DuplicateUrl;
    }

    match e {
        sqlx::Error::RowNotFound => StoreError::NotFound,
        other => StoreError::Internal(other.to_string()),
    }
}
