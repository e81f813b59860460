//! Transaction wrapper
//!
//! Every engine operation runs its body through [`atomic`]. On success the
//! transaction commits, or in [`TxMode::DryRun`] rolls back while still
//! handing the body's result to the caller. On failure it always rolls back
//! and the error propagates unchanged.

#![allow(clippy::result_large_err)]

use crate::errors::{from_rusqlite, Result};
use rusqlite::{Connection, Transaction};
use std::time::Instant;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TxMode {
    #[default]
    Commit,
    /// Perform every write, then discard them
    DryRun,
}

impl TxMode {
    pub fn from_dry_run(dry_run: bool) -> Self {
        if dry_run {
            TxMode::DryRun
        } else {
            TxMode::Commit
        }
    }

    pub fn is_dry_run(&self) -> bool {
        *self == TxMode::DryRun
    }
}

/// Run `body` inside a single transaction
///
/// # Errors
///
/// The body's error, or a `Persistence` error if the transaction could not
/// be opened or committed.
pub fn atomic<T, F>(conn: &mut Connection, mode: TxMode, op: &str, body: F) -> Result<T>
where
    F: FnOnce(&Transaction<'_>) -> Result<T>,
{
    let start = Instant::now();
    let tx = conn.transaction().map_err(from_rusqlite)?;

    match body(&tx) {
        Ok(value) => {
            match mode {
                TxMode::Commit => tx.commit().map_err(from_rusqlite)?,
                TxMode::DryRun => {
                    tx.rollback().map_err(from_rusqlite)?;
                    tracing::debug!(
                        op,
                        duration_ms = start.elapsed().as_millis() as u64,
                        "Dry run, rolled back"
                    );
                }
            }
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback() {
                tracing::error!(op, error = %rollback_err, "Rollback failed");
            }
            Err(err)
        }
    }
}
