//! Error types for directory operations.

use std::os::raw::c_int;

/// Errors that can occur during customer and address operations.
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    /// A required field was missing or empty.
    #[error("{0}")]
    InvalidInput(String),

    /// The write would violate a uniqueness rule.
    #[error("{0}")]
    Conflict(String),

    /// The requested record does not exist.
    #[error("{0}")]
    NotFound(String),

    /// An unexpected SQLite failure.
    #[error("directory database error: {0}")]
    Database(#[from] rusqlite::Error),
}

/// Returns `true` if `err` is a constraint violation with the given
/// extended result code (e.g. `SQLITE_CONSTRAINT_UNIQUE`).
pub(crate) fn is_constraint(err: &rusqlite::Error, extended_code: c_int) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(failure, _) if failure.extended_code == extended_code
    )
}

/// Treats an empty string the same as an absent field.
pub(crate) fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}
