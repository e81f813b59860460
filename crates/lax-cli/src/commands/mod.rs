//! Subcommands and the state they share
//!
//! Configuration comes from flags with environment fallbacks; nothing
//! below the CLI reads the environment.

#![allow(clippy::result_large_err)]

pub mod fragment;
pub mod ingest;
pub mod ingest_publish;
pub mod merge;
pub mod publish;

use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use clap::{Args, ValueEnum};
use lax_core::logging_facility::Profile;
use lax_core::{ArticleVersion, ExError, ExErrorKind, SchemaCache, SchemaRegistry, Status};
use lax_engine::EngineCommandResult;
use lax_store::db::open_store;
use lax_store::errors::{io_error, Result};
use rusqlite::Connection;
use serde_json::{json, Value};

pub const STATUS_INVALID: &str = "invalid";
pub const STATUS_ERROR: &str = "error";
pub const DRY_RUN_MESSAGE: &str = "(dry-run)";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines on stderr
    Pretty,
    /// One JSON object per event on stderr
    Json,
}

impl LogFormat {
    pub fn profile(self) -> Profile {
        match self {
            LogFormat::Pretty => Profile::Development,
            LogFormat::Json => Profile::Production,
        }
    }
}

#[derive(Debug, Args)]
pub struct GlobalArgs {
    /// SQLite store, created and migrated on first use
    #[arg(long, global = true, env = "LAX_DB", default_value = ".lax/store.db")]
    pub db: PathBuf,

    /// JSON Schema used to validate merged POA article-json
    #[arg(long, global = true, env = "LAX_POA_SCHEMA")]
    pub poa_schema: Option<PathBuf>,

    /// JSON Schema used to validate merged VOR article-json
    #[arg(long, global = true, env = "LAX_VOR_SCHEMA")]
    pub vor_schema: Option<PathBuf>,

    #[arg(
        long,
        global = true,
        env = "LAX_BUSY_TIMEOUT_MS",
        default_value_t = 5000
    )]
    pub busy_timeout_ms: u64,

    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,
}

/// An open store plus the schemas merged documents are validated against
pub struct Context {
    pub conn: Connection,
    pub schemas: &'static SchemaCache,
}

impl Context {
    pub fn open(global: &GlobalArgs) -> Result<Self> {
        let mut registry = SchemaRegistry::new();
        if let Some(path) = &global.poa_schema {
            registry = registry.with_path(Status::Poa, path.clone());
        }
        if let Some(path) = &global.vor_schema {
            registry = registry.with_path(Status::Vor, path.clone());
        }
        let schemas = SchemaCache::install(registry);

        let conn = open_store(&global.db, Duration::from_millis(global.busy_timeout_ms))?;
        tracing::debug!(db = %global.db.display(), "store opened");

        Ok(Self { conn, schemas })
    }
}

/// Read a JSON document from a file, or from stdin when the path is `-`
pub fn read_json(path: &Path) -> Result<Value> {
    let text = if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .map_err(|e| io_error("read_stdin", e))?;
        buf
    } else {
        std::fs::read_to_string(path).map_err(|e| io_error("read_json", e))?
    };

    serde_json::from_str(&text).map_err(|e| {
        ExError::new(ExErrorKind::InvalidInput)
            .with_op("read_json")
            .with_message(format!("{}: {}", path.display(), e))
    })
}

pub fn format_datetime(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// `{"status", "id", "version", "datetime", "message"?}` for one article version
pub fn version_response(status: &str, msid: i64, av: &ArticleVersion, dry_run: bool) -> Value {
    let mut response = json!({
        "status": status,
        "id": msid,
        "version": av.version,
        "datetime": av.datetime_published.map(format_datetime),
    });
    if dry_run {
        response["message"] = json!(DRY_RUN_MESSAGE);
    }
    response
}

pub fn error_response(err: &ExError) -> Value {
    let status = if err.is_caller_fault() {
        STATUS_INVALID
    } else {
        STATUS_ERROR
    };
    let mut response = json!({
        "status": status,
        "code": err.code(),
        "message": err.to_string(),
    });
    if let Some(request_id) = err.request_id() {
        response["request_id"] = json!(request_id.as_str());
    }
    response
}

/// The engine answered a command with a result of another command
pub fn unexpected(result: &EngineCommandResult) -> ExError {
    ExError::new(ExErrorKind::Internal)
        .with_op("apply_engine_command")
        .with_message(format!("unexpected engine result: {:?}", result))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use lax_core::{LaxError, StateRule};

    fn version(published: Option<DateTime<Utc>>) -> ArticleVersion {
        let now = Utc::now();
        ArticleVersion {
            id: 1,
            article_id: 1,
            version: 2,
            title: "t".to_string(),
            status: Status::Poa,
            datetime_published: published,
            article_json_v1_raw: json!({}),
            article_json_v1: None,
            article_json_v1_snippet: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_version_response_unpublished() {
        let response = version_response("ingested", 1968, &version(None), false);
        assert_eq!(
            response,
            json!({"status": "ingested", "id": 1968, "version": 2, "datetime": null})
        );
    }

    #[test]
    fn test_version_response_dry_run_message() {
        let published = Utc.with_ymd_and_hms(2016, 4, 13, 1, 0, 0).unwrap();
        let response = version_response("published", 1968, &version(Some(published)), true);
        assert_eq!(response["datetime"], json!("2016-04-13T01:00:00Z"));
        assert_eq!(response["message"], json!(DRY_RUN_MESSAGE));
    }

    #[test]
    fn test_error_response_separates_caller_faults() {
        let invalid: ExError = LaxError::OutOfSequence {
            msid: 1,
            given: 3,
            expected: 1,
        }
        .into();
        assert_eq!(invalid.rule(), Some(StateRule::OutOfSequence));
        let response = error_response(&invalid);
        assert_eq!(response["status"], json!(STATUS_INVALID));
        assert_eq!(response["code"], json!("ERR_STATE_VIOLATION"));

        let internal = ExError::new(ExErrorKind::Persistence).with_message("disk full");
        assert_eq!(error_response(&internal)["status"], json!(STATUS_ERROR));
    }

    #[test]
    fn test_read_json_rejects_malformed_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{not json").unwrap();

        let err = read_json(&path).unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::InvalidInput);

        let missing = read_json(&dir.path().join("missing.json")).unwrap_err();
        assert_eq!(missing.kind(), ExErrorKind::Io);
    }
}
