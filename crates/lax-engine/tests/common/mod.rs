use lax_core::model::Status;
use lax_core::{SchemaCache, SchemaRegistry};
use lax_engine::{publish, PublishOptions};
use lax_store::db::{open_store, DEFAULT_BUSY_TIMEOUT};
use rusqlite::Connection;
use serde_json::{json, Value};
use tempfile::TempDir;

/// A migrated store in a scratch directory
#[allow(dead_code)]
pub fn setup_db() -> (TempDir, Connection) {
    let temp_dir = TempDir::new().unwrap();
    let conn = open_store(temp_dir.path().join("lax.db"), DEFAULT_BUSY_TIMEOUT).unwrap();
    (temp_dir, conn)
}

/// Minimal article-json for `msid`v`version`
#[allow(dead_code)]
pub fn article_json(msid: i64, version: u32) -> Value {
    json!({
        "journal": {"title": "eLife"},
        "article": {"id": msid, "volume": 4, "type": "research-article"},
        "article-version": {
            "title": format!("Article {} v{}", msid, version),
            "version": version,
            "published": null
        }
    })
}

#[allow(dead_code)]
pub fn publish_now(conn: &mut Connection, msid: i64, version: u32) {
    publish(conn, msid, version, None, PublishOptions::default()).unwrap();
}

#[allow(dead_code)]
pub fn row_count(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |r| {
        r.get(0)
    })
    .unwrap()
}

/// Schemas where a POA document only needs a string `title` and a VOR
/// document also needs `doi`
#[allow(dead_code)]
pub fn schemas() -> SchemaCache {
    SchemaCache::new(
        SchemaRegistry::new()
            .with_inline(
                Status::Poa,
                json!({
                    "type": "object",
                    "required": ["title"],
                    "properties": {"title": {"type": "string"}}
                }),
            )
            .with_inline(
                Status::Vor,
                json!({"type": "object", "required": ["title", "doi"]}),
            ),
    )
}
