//! lax engine - ingest, publish and fragment orchestration
//!
//! Coordinates the pure rules in `lax-core` with the `lax-store`
//! persistence layer. Every public command runs inside one transaction.

pub mod commands;
pub mod hooks;

pub use commands::engine_command::{apply_engine_command, EngineCommand, EngineCommandResult};
pub use commands::ingest::{ingest, IngestOptions, IngestResult};
pub use commands::ingest_publish::ingest_and_publish;
pub use commands::publish::{publish, PublishOptions};
pub use hooks::{MergeOnWrite, NoopVersionHook, VersionWriteHook};
