//! Article versions, keyed on `(article_id, version)`
//!
//! Writes through [`Entity`] only touch the ingested fields. The publication
//! timestamp and the derived documents each have their own setter, so an
//! ingest can never publish.

#![allow(clippy::result_large_err)]

use crate::errors::{from_rusqlite, Result};
use crate::repo::{article, upsert::Entity};
use chrono::{DateTime, Utc};
use lax_core::errors::{ExError, ExErrorKind};
use lax_core::model::{ArticleVersion, ArticleVersionDraft, Status};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde_json::Value;

const COLUMNS: &str = "av.id, av.article_id, av.version, av.title, av.status, \
     av.datetime_published, av.article_json_v1_raw, av.article_json_v1, \
     av.article_json_v1_snippet, av.created_at, av.updated_at";

fn status_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Status> {
    let text: String = row.get(idx)?;
    text.parse().map_err(|_| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            Type::Text,
            format!("unknown article status '{}'", text).into(),
        )
    })
}

fn map_row(row: &Row<'_>) -> rusqlite::Result<ArticleVersion> {
    Ok(ArticleVersion {
        id: row.get(0)?,
        article_id: row.get(1)?,
        version: row.get(2)?,
        title: row.get(3)?,
        status: status_column(row, 4)?,
        datetime_published: row.get(5)?,
        article_json_v1_raw: row.get(6)?,
        article_json_v1: row.get(7)?,
        article_json_v1_snippet: row.get(8)?,
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
    })
}

fn query_one(
    conn: &Connection,
    where_clause: &str,
    params: impl rusqlite::Params,
) -> Result<Option<ArticleVersion>> {
    conn.query_row(
        &format!("SELECT {COLUMNS} FROM article_versions av {where_clause}"),
        params,
        map_row,
    )
    .optional()
    .map_err(from_rusqlite)
}

fn query_many(
    conn: &Connection,
    sql_tail: &str,
    params: impl rusqlite::Params,
) -> Result<Vec<ArticleVersion>> {
    let mut stmt = conn
        .prepare(&format!("SELECT {COLUMNS} FROM article_versions av {sql_tail}"))
        .map_err(from_rusqlite)?;
    let versions = stmt
        .query_map(params, map_row)
        .map_err(from_rusqlite)?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(from_rusqlite)?;
    Ok(versions)
}

fn published_filter(only_published: bool) -> &'static str {
    if only_published {
        "AND av.datetime_published IS NOT NULL"
    } else {
        ""
    }
}

pub fn get(conn: &Connection, id: i64) -> Result<Option<ArticleVersion>> {
    query_one(conn, "WHERE av.id = ?", [id])
}

pub fn find(conn: &Connection, article_id: i64, version: u32) -> Result<Option<ArticleVersion>> {
    query_one(
        conn,
        "WHERE av.article_id = ? AND av.version = ?",
        params![article_id, version],
    )
}

/// The highest-numbered version of an article, published or not
pub fn latest_for_article(conn: &Connection, article_id: i64) -> Result<Option<ArticleVersion>> {
    query_one(
        conn,
        "WHERE av.article_id = ? ORDER BY av.version DESC LIMIT 1",
        [article_id],
    )
}

/// Resolve a version by manuscript id alone
///
/// A missing article and a missing version both come back as `Ok(None)`;
/// a manuscript id present in several journals is an error.
pub fn find_by_msid(
    conn: &Connection,
    manuscript_id: i64,
    version: u32,
) -> Result<Option<ArticleVersion>> {
    match article::find_by_msid(conn, manuscript_id)? {
        Some(article) => find(conn, article.id, version),
        None => Ok(None),
    }
}

/// Every version of an article ordered by version number
pub fn list_for_article(
    conn: &Connection,
    article_id: i64,
    only_published: bool,
) -> Result<Vec<ArticleVersion>> {
    query_many(
        conn,
        &format!(
            "WHERE av.article_id = ? {} ORDER BY av.version",
            published_filter(only_published)
        ),
        [article_id],
    )
}

/// Each article's highest version, ordered by manuscript id
pub fn latest_per_article(conn: &Connection, only_published: bool) -> Result<Vec<ArticleVersion>> {
    let filter = published_filter(only_published);
    let inner_filter = if only_published {
        "AND v.datetime_published IS NOT NULL"
    } else {
        ""
    };
    query_many(
        conn,
        &format!(
            "JOIN articles a ON a.id = av.article_id
             WHERE av.version = (
                 SELECT MAX(v.version) FROM article_versions v
                 WHERE v.article_id = av.article_id {inner_filter}
             ) {filter}
             ORDER BY a.manuscript_id, a.journal_id"
        ),
        [],
    )
}

fn require_updated(changed: usize, id: i64, op: &str) -> Result<()> {
    if changed == 0 {
        return Err(ExError::new(ExErrorKind::NotFound)
            .with_op(op.to_string())
            .with_message(format!("article version row {} not found", id)));
    }
    Ok(())
}

/// Stamp the publication timestamp, the only writer of that column
pub fn set_published(
    conn: &Connection,
    id: i64,
    published_at: DateTime<Utc>,
) -> Result<ArticleVersion> {
    let changed = conn
        .execute(
            "UPDATE article_versions SET datetime_published = ?1, updated_at = ?2 WHERE id = ?3",
            params![published_at, Utc::now(), id],
        )
        .map_err(from_rusqlite)?;
    require_updated(changed, id, "set_published")?;
    reload(conn, id, "set_published")
}

/// Store the merged document and its snippet
pub fn store_merged(
    conn: &Connection,
    id: i64,
    merged: &Value,
    snippet: &Value,
) -> Result<ArticleVersion> {
    let changed = conn
        .execute(
            "UPDATE article_versions
             SET article_json_v1 = ?1, article_json_v1_snippet = ?2, updated_at = ?3
             WHERE id = ?4",
            params![merged, snippet, Utc::now(), id],
        )
        .map_err(from_rusqlite)?;
    require_updated(changed, id, "store_merged")?;
    reload(conn, id, "store_merged")
}

fn reload(conn: &Connection, id: i64, op: &str) -> Result<ArticleVersion> {
    get(conn, id)?.ok_or_else(|| {
        ExError::new(ExErrorKind::Internal)
            .with_op(op.to_string())
            .with_message(format!("article version row {} vanished after write", id))
    })
}

impl Entity for ArticleVersion {
    type Draft = ArticleVersionDraft;
    const NAME: &'static str = "article_version";

    fn find(conn: &Connection, draft: &ArticleVersionDraft) -> Result<Option<Self>> {
        find(conn, draft.article_id, draft.version)
    }

    fn insert(conn: &Connection, draft: &ArticleVersionDraft) -> Result<Self> {
        let now = Utc::now();
        conn.execute(
            "INSERT INTO article_versions
                (article_id, version, title, status, article_json_v1_raw, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
            params![
                draft.article_id,
                draft.version,
                draft.title,
                draft.status.as_str(),
                draft.article_json_v1_raw,
                now,
            ],
        )
        .map_err(from_rusqlite)?;
        reload(conn, conn.last_insert_rowid(), "insert_article_version")
    }

    fn update(conn: &Connection, existing: &Self, draft: &ArticleVersionDraft) -> Result<Self> {
        conn.execute(
            "UPDATE article_versions
             SET title = ?1, status = ?2, article_json_v1_raw = ?3, updated_at = ?4
             WHERE id = ?5",
            params![
                draft.title,
                draft.status.as_str(),
                draft.article_json_v1_raw,
                Utc::now(),
                existing.id,
            ],
        )
        .map_err(from_rusqlite)?;
        reload(conn, existing.id, "update_article_version")
    }
}
