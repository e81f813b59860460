//! Articles, keyed on `(journal_id, manuscript_id)`

#![allow(clippy::result_large_err)]

use crate::errors::{from_rusqlite, Result};
use crate::repo::upsert::Entity;
use lax_core::errors::LaxError;
use lax_core::model::{Article, ArticleDraft};
use rusqlite::{params, Connection, OptionalExtension, Row};

const COLUMNS: &str = "id, journal_id, manuscript_id, volume, type";

fn map_row(row: &Row<'_>) -> rusqlite::Result<Article> {
    Ok(Article {
        id: row.get(0)?,
        journal_id: row.get(1)?,
        manuscript_id: row.get(2)?,
        volume: row.get(3)?,
        article_type: row.get(4)?,
    })
}

pub fn get(conn: &Connection, id: i64) -> Result<Option<Article>> {
    conn.query_row(
        &format!("SELECT {COLUMNS} FROM articles WHERE id = ?"),
        [id],
        map_row,
    )
    .optional()
    .map_err(from_rusqlite)
}

pub fn find(conn: &Connection, journal_id: i64, manuscript_id: i64) -> Result<Option<Article>> {
    conn.query_row(
        &format!("SELECT {COLUMNS} FROM articles WHERE journal_id = ? AND manuscript_id = ?"),
        params![journal_id, manuscript_id],
        map_row,
    )
    .optional()
    .map_err(from_rusqlite)
}

/// Every article with this manuscript id, across journals
pub fn find_all_by_msid(conn: &Connection, manuscript_id: i64) -> Result<Vec<Article>> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {COLUMNS} FROM articles WHERE manuscript_id = ? ORDER BY id"
        ))
        .map_err(from_rusqlite)?;
    let articles = stmt
        .query_map([manuscript_id], map_row)
        .map_err(from_rusqlite)?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(from_rusqlite)?;
    Ok(articles)
}

/// The single article with this manuscript id
///
/// # Errors
///
/// `InvalidInput` (ambiguous article) when the id exists in more than one
/// journal.
pub fn find_by_msid(conn: &Connection, manuscript_id: i64) -> Result<Option<Article>> {
    let mut articles = find_all_by_msid(conn, manuscript_id)?;
    if articles.len() > 1 {
        return Err(LaxError::AmbiguousArticle {
            msid: manuscript_id,
        }
        .into());
    }
    Ok(articles.pop())
}

/// Like [`find_by_msid`], but a missing article is `NotFound`
pub fn require_by_msid(conn: &Connection, manuscript_id: i64) -> Result<Article> {
    find_by_msid(conn, manuscript_id)?.ok_or_else(|| {
        LaxError::ArticleNotFound {
            msid: manuscript_id,
        }
        .into()
    })
}

impl Entity for Article {
    type Draft = ArticleDraft;
    const NAME: &'static str = "article";

    fn find(conn: &Connection, draft: &ArticleDraft) -> Result<Option<Self>> {
        find(conn, draft.journal_id, draft.manuscript_id)
    }

    fn insert(conn: &Connection, draft: &ArticleDraft) -> Result<Self> {
        conn.execute(
            "INSERT INTO articles (journal_id, manuscript_id, volume, type) VALUES (?1, ?2, ?3, ?4)",
            params![
                draft.journal_id,
                draft.manuscript_id,
                draft.volume,
                draft.article_type
            ],
        )
        .map_err(from_rusqlite)?;
        Ok(Article {
            id: conn.last_insert_rowid(),
            journal_id: draft.journal_id,
            manuscript_id: draft.manuscript_id,
            volume: draft.volume,
            article_type: draft.article_type.clone(),
        })
    }

    fn update(conn: &Connection, existing: &Self, draft: &ArticleDraft) -> Result<Self> {
        conn.execute(
            "UPDATE articles SET volume = ?1, type = ?2 WHERE id = ?3",
            params![draft.volume, draft.article_type, existing.id],
        )
        .map_err(from_rusqlite)?;
        Ok(Article {
            volume: draft.volume,
            article_type: draft.article_type.clone(),
            ..existing.clone()
        })
    }
}
