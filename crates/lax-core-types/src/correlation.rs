//! Request correlation
//!
//! A `RequestId` is minted once per CLI invocation (or per caller request)
//! and carried on log spans and on errors so that an ingest, its hook work
//! and any failure can be tied together in the logs.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier for a single ingest/publish request
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(String);

impl RequestId {
    /// Generate a new time-ordered RequestId (UUIDv7)
    pub fn new() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Wrap an id supplied by an upstream caller
    pub fn from_string(s: String) -> Self {
        Self(s)
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
