//! Ingest followed by publish, as one unit of work

#![allow(clippy::result_large_err)]

use std::time::Instant;

use lax_core::datetime::Timestamp;
use lax_core::errors::ExError;
use lax_core::extract::ArticleJson;
use lax_core::{log_op_end, log_op_error, log_op_start};
use lax_store::errors::Result;
use lax_store::{atomic, TxMode};
use rusqlite::Connection;
use serde_json::Value;

use super::ingest::{ingest_in_tx, IngestOptions, IngestResult};
use super::publish::{publish_in_tx, resolve_timestamp};
use crate::hooks::VersionWriteHook;

/// Ingest a document and publish the version it describes
///
/// The publication time is the document's `published` value when it has
/// one, otherwise now. Both steps share one transaction, so a publish
/// failure also discards the ingest. With `dry_run` the result is computed
/// exactly as for a real call and then every write is rolled back.
///
/// # Errors
///
/// Any error from the ingest or publish steps.
pub fn ingest_and_publish(
    conn: &mut Connection,
    data: &Value,
    options: IngestOptions,
    hook: &dyn VersionWriteHook,
) -> Result<IngestResult> {
    let start = Instant::now();

    let doc = ArticleJson::from_value(data).map_err(|e| {
        let err = ExError::from(e).with_op("ingest_publish");
        log_op_error!(
            "ingest_publish",
            err.clone(),
            duration_ms = start.elapsed().as_millis() as u64
        );
        err
    })?;
    let msid = doc.article.manuscript_id;
    let version = doc.version.version;

    log_op_start!(
        "ingest_publish",
        msid = msid,
        version = version,
        force = options.force,
        dry_run = options.dry_run
    );

    let result = doc
        .version
        .published_at()
        .map_err(|e| ExError::from(e).with_op("ingest_publish"))
        .and_then(|published| resolve_timestamp(published.map(Timestamp::from)))
        .and_then(|published_at| {
            atomic(
                conn,
                TxMode::from_dry_run(options.dry_run),
                "ingest_publish",
                |tx| {
                    let ingested = ingest_in_tx(tx, &doc, options.force, hook)?;
                    let article_version =
                        publish_in_tx(tx, msid, version, published_at, options.force)?;
                    Ok(IngestResult {
                        article_version,
                        ..ingested
                    })
                },
            )
        })
        .map_err(|e| {
            log_op_error!(
                "ingest_publish",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64,
                msid = msid,
                version = version
            );
            e
        })?;

    log_op_end!(
        "ingest_publish",
        duration_ms = start.elapsed().as_millis() as u64,
        msid = msid,
        version = version,
        dry_run = options.dry_run
    );

    Ok(result)
}
