//! Database connection management

#![allow(clippy::result_large_err)]

use crate::errors::{from_rusqlite, io_error, Result};
use crate::migrations::apply_migrations;
use rusqlite::Connection;
use std::path::Path;
use std::time::Duration;

/// Busy timeout used when the caller does not configure one
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Open a SQLite database at the given path
pub fn open<P: AsRef<Path>>(path: P) -> Result<Connection> {
    Connection::open(path).map_err(from_rusqlite)
}

/// Open an in-memory SQLite database (for testing)
pub fn open_in_memory() -> Result<Connection> {
    Connection::open_in_memory().map_err(from_rusqlite)
}

/// Configure a connection: foreign keys, WAL journal, busy timeout
pub fn configure(conn: &Connection, busy_timeout: Duration) -> Result<()> {
    // journal_mode answers with a row, so run it as a batch
    conn.execute_batch("PRAGMA foreign_keys = ON; PRAGMA journal_mode = WAL;")
        .map_err(from_rusqlite)?;
    conn.busy_timeout(busy_timeout).map_err(from_rusqlite)?;
    Ok(())
}

/// Open, configure and migrate the store at `path`, creating parent dirs
pub fn open_store<P: AsRef<Path>>(path: P, busy_timeout: Duration) -> Result<Connection> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| io_error("create_store_dir", e))?;
    }

    let mut conn = open(path)?;
    configure(&conn, busy_timeout)?;
    apply_migrations(&mut conn)?;

    tracing::debug!(path = %path.display(), "Opened store");
    Ok(conn)
}

/// In-memory equivalent of [`open_store`]
pub fn open_store_in_memory() -> Result<Connection> {
    let mut conn = open_in_memory()?;
    configure(&conn, DEFAULT_BUSY_TIMEOUT)?;
    apply_migrations(&mut conn)?;
    Ok(conn)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configure_enables_foreign_keys() {
        let conn = open_in_memory().unwrap();
        configure(&conn, Duration::from_millis(250)).unwrap();

        let fk: i64 = conn
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
            .unwrap();
        assert_eq!(fk, 1);
    }

    #[test]
    fn test_open_store_creates_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("store.db");

        open_store(&path, DEFAULT_BUSY_TIMEOUT).unwrap();
        assert!(path.exists());
    }
}
