//! Read queries over article versions
//!
//! `only_published` hides versions without a publication timestamp. An
//! article with no matching versions is reported as not found.

#![allow(clippy::result_large_err)]

use lax_core::errors::{ExError, ExErrorKind};
use lax_core::model::ArticleVersion;
use lax_store::errors::Result;
use lax_store::repo::{article, article_version};
use rusqlite::Connection;

pub use lax_store::repo::{counts, EntityCounts};

fn no_versions(msid: i64, op: &str) -> ExError {
    ExError::new(ExErrorKind::NotFound)
        .with_op(op.to_string())
        .with_msid(msid)
        .with_message("article has no matching versions")
}

/// One version of an article
///
/// # Errors
///
/// `NotFound` when the version does not exist, or is unpublished and
/// `only_published` is set.
pub fn article_version(
    conn: &Connection,
    msid: i64,
    version: u32,
    only_published: bool,
) -> Result<ArticleVersion> {
    article_version::find_by_msid(conn, msid, version)?
        .filter(|av| !only_published || av.is_published())
        .ok_or_else(|| {
            ExError::new(ExErrorKind::NotFound)
                .with_op("article_version")
                .with_msid(msid)
                .with_version(version)
                .with_message("article version not found")
        })
}

/// Every version of an article, lowest first
///
/// # Errors
///
/// `NotFound` when the article is missing or has no matching versions.
pub fn article_version_list(
    conn: &Connection,
    msid: i64,
    only_published: bool,
) -> Result<Vec<ArticleVersion>> {
    let article = article::require_by_msid(conn, msid)?;
    let versions = article_version::list_for_article(conn, article.id, only_published)?;
    if versions.is_empty() {
        return Err(no_versions(msid, "article_version_list"));
    }
    Ok(versions)
}

/// The highest matching version of an article
pub fn most_recent_article_version(
    conn: &Connection,
    msid: i64,
    only_published: bool,
) -> Result<ArticleVersion> {
    article_version_list(conn, msid, only_published)?
        .pop()
        .ok_or_else(|| no_versions(msid, "most_recent_article_version"))
}

/// Each article's highest matching version, ordered by manuscript id
pub fn latest_article_versions(
    conn: &Connection,
    only_published: bool,
) -> Result<Vec<ArticleVersion>> {
    article_version::latest_per_article(conn, only_published)
}
