//! Post-write hooks for article versions
//!
//! The ingest engine calls [`VersionWriteHook::after_write`] once the version
//! row is written, inside the same transaction. An error from the hook
//! aborts the ingest.

#![allow(clippy::result_large_err)]

use lax_core::model::ArticleVersion;
use lax_core::SchemaCache;
use lax_store::errors::Result;
use rusqlite::Connection;

use crate::commands::fragments::merge_and_store;

pub trait VersionWriteHook {
    fn after_write(&self, conn: &Connection, article_version: &ArticleVersion) -> Result<()>;
}

/// Does nothing; the default for ingest
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopVersionHook;

impl VersionWriteHook for NoopVersionHook {
    fn after_write(&self, _conn: &Connection, _article_version: &ArticleVersion) -> Result<()> {
        Ok(())
    }
}

/// Merge fragments and store the result whenever a version is written
///
/// A merge that fails validation leaves the version untouched and does not
/// fail the ingest.
#[derive(Debug, Clone, Copy)]
pub struct MergeOnWrite<'a> {
    pub schemas: &'a SchemaCache,
}

impl<'a> MergeOnWrite<'a> {
    pub fn new(schemas: &'a SchemaCache) -> Self {
        Self { schemas }
    }
}

impl VersionWriteHook for MergeOnWrite<'_> {
    fn after_write(&self, conn: &Connection, article_version: &ArticleVersion) -> Result<()> {
        merge_and_store(conn, article_version, self.schemas)?;
        Ok(())
    }
}
