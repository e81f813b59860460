//! Core types shared across lax crates
//!
//! - **Correlation**: `RequestId` attached to one ingest/publish invocation
//! - **Schema constants**: canonical log field keys and event names

pub mod correlation;
pub mod schema;

pub use correlation::RequestId;
