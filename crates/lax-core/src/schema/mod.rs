//! Schema registry and validation
//!
//! Merged article-json is validated against a JSON Schema chosen by the
//! article version's [`Status`](crate::model::Status). A broken schema is an
//! internal fault (`SchemaError`); a document that fails a healthy schema is
//! a data fault, reported as a list of violations.

pub mod cache;
pub mod registry;

use thiserror::Error;

use crate::model::Status;

pub use cache::SchemaCache;
pub use registry::{SchemaRegistry, SchemaSource};

/// Faults in the schema configuration itself
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    #[error("no schema registered for status {status}")]
    NotRegistered { status: Status },

    #[error("failed to read {status} schema from {path}: {reason}")]
    Read {
        status: Status,
        path: String,
        reason: String,
    },

    #[error("{status} schema is not valid JSON: {reason}")]
    Parse { status: Status, reason: String },

    #[error("{status} schema failed to compile: {reason}")]
    Compile { status: Status, reason: String },
}
