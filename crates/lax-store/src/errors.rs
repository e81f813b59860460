//! Error handling for lax-store
//!
//! Wraps lax-core ExError with store-specific helpers

use lax_core::errors::{ExError, ExErrorKind};
use rusqlite::ffi;

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

/// Create a migration error
pub fn migration_error(migration_id: &str, reason: &str) -> ExError {
    ExError::new(ExErrorKind::Persistence)
        .with_op("migration")
        .with_message(format!("Migration {} failed: {}", migration_id, reason))
}

/// Create a checksum mismatch error
pub fn checksum_mismatch(migration_id: &str, expected: &str, actual: &str) -> ExError {
    ExError::new(ExErrorKind::Persistence)
        .with_op("migration_checksum")
        .with_message(format!(
            "Checksum mismatch for migration {}: recorded {}, embedded {}",
            migration_id, expected, actual
        ))
}

/// True when SQLite rejected a write on a UNIQUE or PRIMARY KEY constraint
pub fn is_unique_violation(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(e, _) => {
            e.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE
                || e.extended_code == ffi::SQLITE_CONSTRAINT_PRIMARYKEY
        }
        _ => false,
    }
}

/// Create a database error from rusqlite::Error
///
/// Uniqueness violations map to `Concurrency`, every other failure to
/// `Persistence`.
pub fn from_rusqlite(err: rusqlite::Error) -> ExError {
    let kind = if is_unique_violation(&err) {
        ExErrorKind::Concurrency
    } else {
        ExErrorKind::Persistence
    };
    ExError::new(kind)
        .with_op("sqlite")
        .with_message(err.to_string())
}

/// Create a serialization error for a JSON column
pub fn serialization_error(column: &str, err: serde_json::Error) -> ExError {
    ExError::new(ExErrorKind::Serialization)
        .with_op("json_column")
        .with_message(format!("{}: {}", column, err))
}

/// Create an IO error
pub fn io_error(operation: &str, err: std::io::Error) -> ExError {
    ExError::new(ExErrorKind::Io)
        .with_op(operation.to_string())
        .with_message(err.to_string())
}
