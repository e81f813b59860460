//! Publish engine
//!
//! Publishing is the only way an article version gets a
//! `datetime_published`.

#![allow(clippy::result_large_err)]

use std::time::Instant;

use chrono::{DateTime, Utc};
use lax_core::datetime::{normalize, utcnow, Timestamp};
use lax_core::errors::{ExError, LaxError};
use lax_core::model::ArticleVersion;
use lax_core::{log_op_end, log_op_error, log_op_start};
use lax_store::errors::Result;
use lax_store::repo::article_version;
use lax_store::{atomic, TxMode};
use rusqlite::Connection;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PublishOptions {
    /// Re-stamp an already published version
    pub force: bool,
    pub dry_run: bool,
}

/// Publish article version `msid`v`version`
///
/// `published_at` defaults to now; any other value is normalized to UTC.
///
/// # Errors
///
/// - `StateViolation` when the version does not exist, or is already
///   published and `force` is not set
/// - `InvalidInput` when `published_at` is not a recognisable timestamp or
///   the manuscript id is ambiguous
pub fn publish(
    conn: &mut Connection,
    msid: i64,
    version: u32,
    published_at: Option<Timestamp>,
    options: PublishOptions,
) -> Result<ArticleVersion> {
    log_op_start!(
        "publish",
        msid = msid,
        version = version,
        force = options.force,
        dry_run = options.dry_run
    );
    let start = Instant::now();

    let result = resolve_timestamp(published_at)
        .and_then(|when| {
            atomic(
                conn,
                TxMode::from_dry_run(options.dry_run),
                "publish",
                |tx| publish_in_tx(tx, msid, version, when, options.force),
            )
        })
        .map_err(|e| {
            log_op_error!(
                "publish",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64,
                msid = msid,
                version = version
            );
            e
        })?;

    log_op_end!(
        "publish",
        duration_ms = start.elapsed().as_millis() as u64,
        msid = msid,
        version = version
    );

    Ok(result)
}

/// Normalize a caller-supplied publication time, defaulting to now
pub(crate) fn resolve_timestamp(published_at: Option<Timestamp>) -> Result<DateTime<Utc>> {
    let normalized = normalize(published_at).map_err(|e| ExError::from(e).with_op("publish"))?;
    Ok(normalized.unwrap_or_else(utcnow))
}

/// The publish body, run against an open transaction
pub(crate) fn publish_in_tx(
    conn: &Connection,
    msid: i64,
    version: u32,
    published_at: DateTime<Utc>,
    force: bool,
) -> Result<ArticleVersion> {
    let av = article_version::find_by_msid(conn, msid, version)?
        .ok_or_else(|| ExError::from(LaxError::VersionNotFound { msid, version }).with_op("publish"))?;

    if av.is_published() && !force {
        return Err(ExError::from(LaxError::AlreadyPublished { msid, version }).with_op("publish"));
    }

    let published = article_version::set_published(conn, av.id, published_at)?;
    tracing::debug!(
        msid,
        version,
        datetime_published = %published_at.to_rfc3339(),
        "Article version published"
    );
    Ok(published)
}
