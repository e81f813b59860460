//! Ingest engine
//!
//! Turns an article-json document into journal, article and article-version
//! rows while enforcing the version state machine:
//!
//! - a new version must be exactly one more than the latest version (or 1
//!   for a new article)
//! - the latest version must be published before another can be created
//! - a published version is only overwritten with `force`, and never loses
//!   its publication timestamp

#![allow(clippy::result_large_err)]

use std::time::Instant;

use lax_core::errors::{ExError, LaxError};
use lax_core::extract::ArticleJson;
use lax_core::model::{
    Article, ArticleDraft, ArticleVersion, ArticleVersionDraft, Journal, JournalDraft,
};
use lax_core::{log_op_end, log_op_error, log_op_start};
use lax_store::errors::Result;
use lax_store::repo::{article_version, create_or_update, Entity, UpsertOptions, Upserted};
use lax_store::{atomic, TxMode};
use rusqlite::Connection;
use serde::Serialize;
use serde_json::Value;

use crate::hooks::VersionWriteHook;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestOptions {
    /// Allow overwriting the data of a published version
    pub force: bool,
    /// Roll back every write but still return the computed result
    pub dry_run: bool,
}

/// The three rows an ingest touched, as they stand after the write
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IngestResult {
    pub journal: Journal,
    pub article: Article,
    pub article_version: ArticleVersion,
}

/// Ingest an article-json document
///
/// # Errors
///
/// - `InvalidInput` when the document is missing a section or field
/// - `StateViolation` when the version breaks the state machine
/// - any error returned by `hook`, or from persistence
pub fn ingest(
    conn: &mut Connection,
    data: &Value,
    options: IngestOptions,
    hook: &dyn VersionWriteHook,
) -> Result<IngestResult> {
    let start = Instant::now();

    let doc = ArticleJson::from_value(data).map_err(|e| {
        let err = ExError::from(e).with_op("ingest");
        log_op_error!(
            "ingest",
            err.clone(),
            duration_ms = start.elapsed().as_millis() as u64
        );
        err
    })?;
    let msid = doc.article.manuscript_id;
    let version = doc.version.version;

    log_op_start!(
        "ingest",
        msid = msid,
        version = version,
        force = options.force,
        dry_run = options.dry_run
    );

    let result = atomic(
        conn,
        TxMode::from_dry_run(options.dry_run),
        "ingest",
        |tx| ingest_in_tx(tx, &doc, options.force, hook),
    )
    .map_err(|e| {
        log_op_error!(
            "ingest",
            e.clone(),
            duration_ms = start.elapsed().as_millis() as u64,
            msid = msid,
            version = version
        );
        e
    })?;

    log_op_end!(
        "ingest",
        duration_ms = start.elapsed().as_millis() as u64,
        msid = msid,
        version = version,
        article_version_id = result.article_version.id
    );

    Ok(result)
}

/// The ingest body, run against an open transaction
pub(crate) fn ingest_in_tx(
    conn: &Connection,
    doc: &ArticleJson,
    force: bool,
    hook: &dyn VersionWriteHook,
) -> Result<IngestResult> {
    let mut previous_version = None;

    write_rows(conn, doc, force, hook, &mut previous_version).map_err(|err| {
        if !err.is_caller_fault() {
            tracing::error!(
                journal = doc.journal.name.as_str(),
                msid = doc.article.manuscript_id,
                version = doc.version.version,
                previous_version = previous_version.unwrap_or(0),
                error = %err,
                "Unhandled error attempting to ingest article-json"
            );
        }
        err
    })
}

fn write_rows(
    conn: &Connection,
    doc: &ArticleJson,
    force: bool,
    hook: &dyn VersionWriteHook,
    previous_version: &mut Option<u32>,
) -> Result<IngestResult> {
    let msid = doc.article.manuscript_id;
    let version = doc.version.version;

    let journal = create_or_update::<Journal>(
        conn,
        &JournalDraft::new(doc.journal.name.clone()),
        UpsertOptions::default(),
    )?
    .entity;

    let article = create_or_update::<Article>(
        conn,
        &ArticleDraft::new(journal.id, &doc.article),
        UpsertOptions::default(),
    )?
    .entity;

    let draft = ArticleVersionDraft::new(article.id, &doc.version);
    let written = match article_version::find(conn, article.id, version)? {
        Some(existing) => {
            check_existing_version(msid, &existing, force).map_err(rule_error)?;
            create_or_update::<ArticleVersion>(conn, &draft, UpsertOptions::update_only())?.entity
        }
        None => {
            let last = article_version::latest_for_article(conn, article.id)?;
            *previous_version = last.as_ref().map(|v| v.version);
            check_new_version(msid, version, last.as_ref()).map_err(rule_error)?;
            let inserted =
                create_or_update::<ArticleVersion>(conn, &draft, UpsertOptions::create_only())?;
            settle_new_version(conn, msid, &draft, inserted, force)?
        }
    };

    hook.after_write(conn, &written)?;

    // the hook may have stored derived documents on the row
    let article_version = article_version::get(conn, written.id)?.unwrap_or(written);

    tracing::debug!(
        msid,
        version,
        article_version_id = article_version.id,
        "Article version written"
    );

    Ok(IngestResult {
        journal,
        article,
        article_version,
    })
}

fn rule_error(err: LaxError) -> ExError {
    ExError::from(err).with_op("ingest")
}

/// Finish a create-only version write
///
/// When another writer inserted the same version first, its row answers to
/// the existing-version rules before it is overwritten.
fn settle_new_version(
    conn: &Connection,
    msid: i64,
    draft: &ArticleVersionDraft,
    inserted: Upserted<ArticleVersion>,
    force: bool,
) -> Result<ArticleVersion> {
    if inserted.created {
        return Ok(inserted.entity);
    }
    check_existing_version(msid, &inserted.entity, force).map_err(rule_error)?;
    <ArticleVersion as Entity>::update(conn, &inserted.entity, draft)
}

/// Rules for a version number the article does not have yet
fn check_new_version(
    msid: i64,
    version: u32,
    last: Option<&ArticleVersion>,
) -> std::result::Result<(), LaxError> {
    match last {
        Some(last) if !last.is_published() => Err(LaxError::PreviousVersionUnpublished {
            msid,
            version,
            previous_version: last.version,
        }),
        Some(last) if version != last.version + 1 => Err(LaxError::OutOfSequence {
            msid,
            given: version,
            expected: last.version + 1,
        }),
        None if version != 1 => Err(LaxError::OutOfSequence {
            msid,
            given: version,
            expected: 1,
        }),
        _ => Ok(()),
    }
}

/// Rules for re-ingesting a version that already exists
fn check_existing_version(
    msid: i64,
    existing: &ArticleVersion,
    force: bool,
) -> std::result::Result<(), LaxError> {
    if existing.is_published() && !force {
        return Err(LaxError::IngestPublished {
            msid,
            version: existing.version,
        });
    }
    Ok(())
}
