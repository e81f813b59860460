//! Fragment store and merge
//!
//! Fragments are partial article-json documents attached to an article
//! (article-wide) or to one of its versions. Merging folds every fragment
//! that applies to a version in `position` order; a merged document is only
//! stored on the version once it validates against the schema for the
//! version's status.

#![allow(clippy::result_large_err)]

use std::time::Instant;

use lax_core::errors::{ExError, ExErrorKind, LaxError};
use lax_core::merge::{extract_snippet, merge_all};
use lax_core::model::{ArticleFragment, ArticleVersion, FragmentDraft, Status};
use lax_core::{log_op_end, log_op_error, log_op_start, SchemaCache};
use lax_store::errors::Result;
use lax_store::repo::{article, article_version, create_or_update, fragment, UpsertOptions};
use lax_store::{atomic, TxMode};
use rusqlite::Connection;
use serde_json::Value;

/// What a fragment is attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FragmentTarget {
    /// Every version of the article with this manuscript id
    Article(i64),
    /// One version of the article
    Version(i64, u32),
}

impl FragmentTarget {
    pub fn new(msid: i64, version: Option<u32>) -> Self {
        match version {
            Some(v) => FragmentTarget::Version(msid, v),
            None => FragmentTarget::Article(msid),
        }
    }

    pub fn msid(&self) -> i64 {
        match self {
            FragmentTarget::Article(msid) | FragmentTarget::Version(msid, _) => *msid,
        }
    }

    pub fn version(&self) -> Option<u32> {
        match self {
            FragmentTarget::Article(_) => None,
            FragmentTarget::Version(_, v) => Some(*v),
        }
    }
}

fn not_found(target: FragmentTarget, fragment_type: &str) -> ExError {
    LaxError::FragmentNotFound {
        msid: target.msid(),
        version: target.version(),
        fragment_type: fragment_type.to_string(),
    }
    .into()
}

fn find_fragment(
    conn: &Connection,
    target: FragmentTarget,
    fragment_type: &str,
) -> Result<Option<ArticleFragment>> {
    let article = article::require_by_msid(conn, target.msid())?;
    fragment::find(conn, article.id, target.version(), fragment_type)
}

/// Attach a fragment to an article or article version
///
/// An existing fragment at the same `(article, type, version)` is
/// overwritten when `update` is set and returned unchanged otherwise.
///
/// # Errors
///
/// - `InvalidInput` when `fragment` is not a JSON object, or the manuscript
///   id is ambiguous
/// - `NotFound` when no article has the manuscript id
pub fn add_fragment(
    conn: &mut Connection,
    target: FragmentTarget,
    fragment_type: &str,
    fragment: Value,
    position: i64,
    update: bool,
) -> Result<ArticleFragment> {
    log_op_start!(
        "fragment_add",
        msid = target.msid(),
        version = target.version().unwrap_or(0),
        fragment_type = fragment_type
    );
    let start = Instant::now();

    let result = add_fragment_impl(conn, target, fragment_type, fragment, position, update)
        .map_err(|e| {
            log_op_error!(
                "fragment_add",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64,
                msid = target.msid()
            );
            e
        })?;

    log_op_end!(
        "fragment_add",
        duration_ms = start.elapsed().as_millis() as u64,
        msid = target.msid(),
        fragment_id = result.id
    );
    Ok(result)
}

fn add_fragment_impl(
    conn: &mut Connection,
    target: FragmentTarget,
    fragment_type: &str,
    fragment: Value,
    position: i64,
    update: bool,
) -> Result<ArticleFragment> {
    if !fragment.is_object() {
        return Err(ExError::from(LaxError::InvalidFragment {
            reason: "all fragments must be a JSON object".to_string(),
        })
        .with_op("fragment_add"));
    }

    atomic(conn, TxMode::Commit, "fragment_add", |tx| {
        let article = article::require_by_msid(tx, target.msid())?;
        let draft = FragmentDraft {
            article_id: article.id,
            version: target.version(),
            fragment_type: fragment_type.to_string(),
            fragment,
            position,
        };
        let options = if update {
            UpsertOptions::default()
        } else {
            UpsertOptions::create_only()
        };
        Ok(create_or_update::<ArticleFragment>(tx, &draft, options)?.entity)
    })
}

/// Delete a fragment
///
/// # Errors
///
/// `NotFound` when the article or the fragment does not exist.
pub fn remove_fragment(
    conn: &mut Connection,
    target: FragmentTarget,
    fragment_type: &str,
) -> Result<()> {
    log_op_start!(
        "fragment_remove",
        msid = target.msid(),
        fragment_type = fragment_type
    );
    let start = Instant::now();

    atomic(conn, TxMode::Commit, "fragment_remove", |tx| {
        let found = find_fragment(tx, target, fragment_type)?
            .ok_or_else(|| not_found(target, fragment_type))?;
        fragment::delete(tx, found.id)?;
        Ok(())
    })
    .map_err(|e| {
        log_op_error!(
            "fragment_remove",
            e.clone(),
            duration_ms = start.elapsed().as_millis() as u64,
            msid = target.msid()
        );
        e
    })?;

    log_op_end!(
        "fragment_remove",
        duration_ms = start.elapsed().as_millis() as u64,
        msid = target.msid()
    );
    Ok(())
}

/// The stored fragment document
///
/// # Errors
///
/// `NotFound` when the article or the fragment does not exist.
pub fn get_fragment(conn: &Connection, target: FragmentTarget, fragment_type: &str) -> Result<Value> {
    find_fragment(conn, target, fragment_type)?
        .map(|f| f.fragment)
        .ok_or_else(|| not_found(target, fragment_type))
}

/// Merge every fragment that applies to an article version
///
/// With no fragments the result is an empty object.
pub fn merge(conn: &Connection, article_version: &ArticleVersion) -> Result<Value> {
    let fragments =
        fragment::for_version(conn, article_version.article_id, article_version.version)?;
    tracing::debug!(
        article_version_id = article_version.id,
        fragments = fragments.len(),
        "Merging fragments"
    );
    Ok(merge_all(fragments.iter().map(|f| &f.fragment)))
}

/// The document if it is valid for `status`, otherwise `None`
pub fn validate(schemas: &SchemaCache, document: Value, status: Status) -> Option<Value> {
    schemas.validate(document, status)
}

/// Merge, validate and, when valid, store the result and its snippet
///
/// An invalid merge leaves the version untouched and returns `None`.
pub fn merge_and_store(
    conn: &Connection,
    article_version: &ArticleVersion,
    schemas: &SchemaCache,
) -> Result<Option<Value>> {
    let merged = merge(conn, article_version)?;

    match validate(schemas, merged, article_version.status) {
        Some(valid) => {
            article_version::store_merged(conn, article_version.id, &valid, &extract_snippet(&valid))?;
            Ok(Some(valid))
        }
        None => {
            tracing::warn!(
                article_version_id = article_version.id,
                version = article_version.version,
                "merge result failed to validate, not updating article version"
            );
            Ok(None)
        }
    }
}

/// Look up `msid`v`version` and run [`merge_and_store`] on it in its own
/// transaction
///
/// # Errors
///
/// `NotFound` when the article version does not exist.
pub fn merge_version(
    conn: &mut Connection,
    msid: i64,
    version: u32,
    schemas: &SchemaCache,
) -> Result<Option<Value>> {
    log_op_start!("merge", msid = msid, version = version);
    let start = Instant::now();

    let result = atomic(conn, TxMode::Commit, "merge", |tx| {
        let av = article_version::find_by_msid(tx, msid, version)?.ok_or_else(|| {
            ExError::new(ExErrorKind::NotFound)
                .with_op("merge")
                .with_msid(msid)
                .with_version(version)
                .with_message("article version not found")
        })?;
        merge_and_store(tx, &av, schemas)
    })
    .map_err(|e| {
        log_op_error!(
            "merge",
            e.clone(),
            duration_ms = start.elapsed().as_millis() as u64,
            msid = msid
        );
        e
    })?;

    log_op_end!(
        "merge",
        duration_ms = start.elapsed().as_millis() as u64,
        msid = msid,
        valid = result.is_some()
    );
    Ok(result)
}
