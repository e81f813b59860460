//! lax core - article-json domain kernel
//!
//! Provides the pieces of the ingestion pipeline that need no storage:
//! - Journal, Article, ArticleVersion and ArticleFragment models
//! - Structured error facility (`ExError`) and domain errors (`LaxError`)
//! - Logging facility with canonical start/end/error events
//! - Typed extraction of article-json sub-documents
//! - Timestamp normalization to UTC
//! - Deep-merge of fragments and snippet extraction
//! - Schema registry and process-wide schema cache

pub mod datetime;
pub mod errors;
pub mod extract;
pub mod logging_facility;
pub mod merge;
pub mod model;
pub mod schema;

// Re-exported for the logging macros
pub use lax_core_types;

pub use errors::{ExError, ExErrorKind, LaxError, StateRule};
pub use extract::{ArticleJson, ExtractError};
pub use model::{Article, ArticleFragment, ArticleVersion, Journal, Status};
pub use schema::{SchemaCache, SchemaError, SchemaRegistry, SchemaSource};
