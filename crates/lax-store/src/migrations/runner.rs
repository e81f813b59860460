//! Migration runner
//!
//! Applies migrations in order, each in its own transaction, skipping any
//! already recorded in `schema_version`. A recorded checksum that differs
//! from the embedded SQL is an error.

#![allow(clippy::result_large_err)]

use crate::errors::{checksum_mismatch, from_rusqlite, migration_error, Result};
use crate::migrations::checksums::compute_checksum;
use crate::migrations::embedded::get_migrations;
use rusqlite::{Connection, OptionalExtension};

/// Apply all pending migrations to the database
pub fn apply_migrations(conn: &mut Connection) -> Result<()> {
    create_schema_version_table(conn)?;

    for migration in get_migrations() {
        apply_migration(conn, migration.id, migration.sql)?;
    }

    Ok(())
}

/// Ids of the migrations recorded in `schema_version`, in application order
pub fn applied_migrations(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn
        .prepare("SELECT migration_id FROM schema_version ORDER BY id")
        .map_err(from_rusqlite)?;
    let ids = stmt
        .query_map([], |row| row.get(0))
        .map_err(from_rusqlite)?
        .collect::<std::result::Result<Vec<String>, _>>()
        .map_err(from_rusqlite)?;
    Ok(ids)
}

fn create_schema_version_table(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_version (
            id INTEGER PRIMARY KEY,
            migration_id TEXT NOT NULL UNIQUE,
            applied_at INTEGER NOT NULL,
            checksum TEXT NOT NULL
        )",
        [],
    )
    .map_err(from_rusqlite)?;

    Ok(())
}

fn apply_migration(conn: &mut Connection, migration_id: &str, sql: &str) -> Result<()> {
    let checksum = compute_checksum(sql);

    let recorded: Option<String> = conn
        .query_row(
            "SELECT checksum FROM schema_version WHERE migration_id = ?",
            [migration_id],
            |row| row.get(0),
        )
        .optional()
        .map_err(from_rusqlite)?;

    if let Some(recorded) = recorded {
        if recorded != checksum {
            return Err(checksum_mismatch(migration_id, &recorded, &checksum));
        }
        return Ok(());
    }

    let tx = conn.transaction().map_err(from_rusqlite)?;

    tx.execute_batch(sql)
        .map_err(|e| migration_error(migration_id, &e.to_string()))?;

    let now = chrono::Utc::now().timestamp();
    tx.execute(
        "INSERT INTO schema_version (migration_id, applied_at, checksum) VALUES (?, ?, ?)",
        rusqlite::params![migration_id, now, checksum],
    )
    .map_err(from_rusqlite)?;

    tx.commit().map_err(from_rusqlite)?;

    tracing::info!(migration_id, "Applied migration");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_migrations() {
        let mut conn = Connection::open_in_memory().unwrap();
        assert!(apply_migrations(&mut conn).is_ok());
    }

    #[test]
    fn test_idempotency() {
        let mut conn = Connection::open_in_memory().unwrap();
        apply_migrations(&mut conn).unwrap();
        assert!(apply_migrations(&mut conn).is_ok());
        assert_eq!(applied_migrations(&conn).unwrap().len(), 2);
    }
}
