//! Single dispatch surface over the engine commands

#![allow(clippy::result_large_err)]

use lax_core::datetime::Timestamp;
use lax_core::model::{ArticleFragment, ArticleVersion};
use lax_core::SchemaCache;
use lax_store::errors::Result;
use rusqlite::Connection;
use serde_json::Value;

use super::fragments::{self, FragmentTarget};
use super::ingest::{ingest, IngestOptions, IngestResult};
use super::ingest_publish::ingest_and_publish;
use super::publish::{publish, PublishOptions};
use crate::hooks::{MergeOnWrite, NoopVersionHook, VersionWriteHook};

/// Engine-level commands that touch the store
#[derive(Debug, Clone)]
pub enum EngineCommand {
    Ingest {
        data: Value,
        options: IngestOptions,
        /// Run the fragment merge after the version is written
        merge: bool,
    },
    Publish {
        msid: i64,
        version: u32,
        published_at: Option<Timestamp>,
        options: PublishOptions,
    },
    IngestPublish {
        data: Value,
        options: IngestOptions,
        merge: bool,
    },
    FragmentAdd {
        target: FragmentTarget,
        fragment_type: String,
        fragment: Value,
        position: i64,
        update: bool,
    },
    FragmentGet {
        target: FragmentTarget,
        fragment_type: String,
    },
    FragmentRemove {
        target: FragmentTarget,
        fragment_type: String,
    },
    Merge {
        msid: i64,
        version: u32,
    },
}

/// Result of applying an engine command
#[derive(Debug, Clone, PartialEq)]
pub enum EngineCommandResult {
    Ingested(IngestResult),
    Published(ArticleVersion),
    IngestedPublished(IngestResult),
    FragmentAdded(ArticleFragment),
    Fragment(Value),
    FragmentRemoved,
    /// The stored merge, or `None` when it failed validation
    Merged(Option<Value>),
}

fn hook_for(merge: bool, schemas: &SchemaCache) -> Box<dyn VersionWriteHook + '_> {
    if merge {
        Box::new(MergeOnWrite::new(schemas))
    } else {
        Box::new(NoopVersionHook)
    }
}

/// Apply an engine command
///
/// # Errors
///
/// Whatever the underlying command returns.
pub fn apply_engine_command(
    cmd: EngineCommand,
    conn: &mut Connection,
    schemas: &SchemaCache,
) -> Result<EngineCommandResult> {
    match cmd {
        EngineCommand::Ingest {
            data,
            options,
            merge,
        } => {
            let hook = hook_for(merge, schemas);
            ingest(conn, &data, options, hook.as_ref()).map(EngineCommandResult::Ingested)
        }
        EngineCommand::Publish {
            msid,
            version,
            published_at,
            options,
        } => publish(conn, msid, version, published_at, options)
            .map(EngineCommandResult::Published),
        EngineCommand::IngestPublish {
            data,
            options,
            merge,
        } => {
            let hook = hook_for(merge, schemas);
            ingest_and_publish(conn, &data, options, hook.as_ref())
                .map(EngineCommandResult::IngestedPublished)
        }
        EngineCommand::FragmentAdd {
            target,
            fragment_type,
            fragment,
            position,
            update,
        } => fragments::add_fragment(conn, target, &fragment_type, fragment, position, update)
            .map(EngineCommandResult::FragmentAdded),
        EngineCommand::FragmentGet {
            target,
            fragment_type,
        } => fragments::get_fragment(conn, target, &fragment_type)
            .map(EngineCommandResult::Fragment),
        EngineCommand::FragmentRemove {
            target,
            fragment_type,
        } => fragments::remove_fragment(conn, target, &fragment_type)
            .map(|()| EngineCommandResult::FragmentRemoved),
        EngineCommand::Merge { msid, version } => {
            fragments::merge_version(conn, msid, version, schemas)
                .map(EngineCommandResult::Merged)
        }
    }
}
