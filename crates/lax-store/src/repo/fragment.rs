//! Article fragments, keyed on `(article_id, type, version)`
//!
//! `version IS NULL` marks an article-wide fragment; the key comparisons
//! below use `IS` so NULL matches NULL.

#![allow(clippy::result_large_err)]

use crate::errors::{from_rusqlite, Result};
use crate::repo::upsert::Entity;
use lax_core::model::{ArticleFragment, FragmentDraft};
use rusqlite::{params, Connection, OptionalExtension, Row};

const COLUMNS: &str = "id, article_id, version, type, fragment, position";

fn map_row(row: &Row<'_>) -> rusqlite::Result<ArticleFragment> {
    Ok(ArticleFragment {
        id: row.get(0)?,
        article_id: row.get(1)?,
        version: row.get(2)?,
        fragment_type: row.get(3)?,
        fragment: row.get(4)?,
        position: row.get(5)?,
    })
}

pub fn get(conn: &Connection, id: i64) -> Result<Option<ArticleFragment>> {
    conn.query_row(
        &format!("SELECT {COLUMNS} FROM article_fragments WHERE id = ?"),
        [id],
        map_row,
    )
    .optional()
    .map_err(from_rusqlite)
}

/// The fragment at an exact key; `version = None` means article-wide
pub fn find(
    conn: &Connection,
    article_id: i64,
    version: Option<u32>,
    fragment_type: &str,
) -> Result<Option<ArticleFragment>> {
    conn.query_row(
        &format!(
            "SELECT {COLUMNS} FROM article_fragments
             WHERE article_id = ?1 AND type = ?2 AND version IS ?3"
        ),
        params![article_id, fragment_type, version],
        map_row,
    )
    .optional()
    .map_err(from_rusqlite)
}

/// Fragments that apply to one version: its own plus the article-wide ones
///
/// Ordered by position, ties broken by insertion order.
pub fn for_version(
    conn: &Connection,
    article_id: i64,
    version: u32,
) -> Result<Vec<ArticleFragment>> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {COLUMNS} FROM article_fragments
             WHERE article_id = ?1 AND (version = ?2 OR version IS NULL)
             ORDER BY position, id"
        ))
        .map_err(from_rusqlite)?;
    let fragments = stmt
        .query_map(params![article_id, version], map_row)
        .map_err(from_rusqlite)?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(from_rusqlite)?;
    Ok(fragments)
}

/// Delete a fragment row, returning whether it existed
pub fn delete(conn: &Connection, id: i64) -> Result<bool> {
    let changed = conn
        .execute("DELETE FROM article_fragments WHERE id = ?", [id])
        .map_err(from_rusqlite)?;
    Ok(changed > 0)
}

impl Entity for ArticleFragment {
    type Draft = FragmentDraft;
    const NAME: &'static str = "article_fragment";

    fn find(conn: &Connection, draft: &FragmentDraft) -> Result<Option<Self>> {
        find(conn, draft.article_id, draft.version, &draft.fragment_type)
    }

    fn insert(conn: &Connection, draft: &FragmentDraft) -> Result<Self> {
        conn.execute(
            "INSERT INTO article_fragments (article_id, version, type, fragment, position)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                draft.article_id,
                draft.version,
                draft.fragment_type,
                draft.fragment,
                draft.position,
            ],
        )
        .map_err(from_rusqlite)?;
        Ok(ArticleFragment {
            id: conn.last_insert_rowid(),
            article_id: draft.article_id,
            version: draft.version,
            fragment_type: draft.fragment_type.clone(),
            fragment: draft.fragment.clone(),
            position: draft.position,
        })
    }

    fn update(conn: &Connection, existing: &Self, draft: &FragmentDraft) -> Result<Self> {
        conn.execute(
            "UPDATE article_fragments SET fragment = ?1, position = ?2 WHERE id = ?3",
            params![draft.fragment, draft.position, existing.id],
        )
        .map_err(from_rusqlite)?;
        Ok(ArticleFragment {
            fragment: draft.fragment.clone(),
            position: draft.position,
            ..existing.clone()
        })
    }
}
