#![allow(clippy::result_large_err)]

use crate::errors::{from_rusqlite, Result};
use rusqlite::Connection;
use serde_json::json;

/// Row counts per entity table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EntityCounts {
    pub journals: i64,
    pub articles: i64,
    pub article_versions: i64,
    pub fragments: i64,
}

impl EntityCounts {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn to_json(&self) -> serde_json::Value {
        json!({
            "journals": self.journals,
            "articles": self.articles,
            "article_versions": self.article_versions,
            "fragments": self.fragments,
        })
    }
}

fn count(conn: &Connection, table: &str) -> Result<i64> {
    conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
        row.get(0)
    })
    .map_err(from_rusqlite)
}

pub fn counts(conn: &Connection) -> Result<EntityCounts> {
    Ok(EntityCounts {
        journals: count(conn, "journals")?,
        articles: count(conn, "articles")?,
        article_versions: count(conn, "article_versions")?,
        fragments: count(conn, "article_fragments")?,
    })
}
