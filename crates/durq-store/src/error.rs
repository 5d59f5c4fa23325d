//! Storage errors.

use thiserror::Error;

/// Storage engine error types.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Error reported by SQLite.
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// IO error while preparing the database file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A write was attempted on a read-only store or transaction.
    #[error("Store is read-only")]
    ReadOnly,

    /// The database lock could not be acquired within the open timeout.
    #[error("Timed out acquiring database lock")]
    LockTimeout,
}

impl StoreError {
    /// Map SQLite's busy/locked codes onto [`StoreError::LockTimeout`].
    pub(crate) fn from_open(err: rusqlite::Error) -> Self {
        match err.sqlite_error_code() {
            Some(rusqlite::ErrorCode::DatabaseBusy) | Some(rusqlite::ErrorCode::DatabaseLocked) => {
                StoreError::LockTimeout
            }
            _ => StoreError::Sqlite(err),
        }
    }
}
