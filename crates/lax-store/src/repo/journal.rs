//! Journals, keyed on name

#![allow(clippy::result_large_err)]

use crate::errors::{from_rusqlite, Result};
use crate::repo::upsert::Entity;
use lax_core::model::{Journal, JournalDraft};
use rusqlite::{Connection, OptionalExtension, Row};

fn map_row(row: &Row<'_>) -> rusqlite::Result<Journal> {
    Ok(Journal {
        id: row.get(0)?,
        name: row.get(1)?,
    })
}

pub fn get(conn: &Connection, id: i64) -> Result<Option<Journal>> {
    conn.query_row("SELECT id, name FROM journals WHERE id = ?", [id], map_row)
        .optional()
        .map_err(from_rusqlite)
}

pub fn find_by_name(conn: &Connection, name: &str) -> Result<Option<Journal>> {
    conn.query_row(
        "SELECT id, name FROM journals WHERE name = ?",
        [name],
        map_row,
    )
    .optional()
    .map_err(from_rusqlite)
}

impl Entity for Journal {
    type Draft = JournalDraft;
    const NAME: &'static str = "journal";

    fn find(conn: &Connection, draft: &JournalDraft) -> Result<Option<Self>> {
        find_by_name(conn, &draft.name)
    }

    fn insert(conn: &Connection, draft: &JournalDraft) -> Result<Self> {
        conn.execute("INSERT INTO journals (name) VALUES (?)", [&draft.name])
            .map_err(from_rusqlite)?;
        Ok(Journal {
            id: conn.last_insert_rowid(),
            name: draft.name.clone(),
        })
    }

    // the name is the whole record
    fn update(_conn: &Connection, existing: &Self, _draft: &JournalDraft) -> Result<Self> {
        Ok(existing.clone())
    }
}
