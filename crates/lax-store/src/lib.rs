//! lax store - SQLite persistence for journals, articles, versions and fragments
//!
//! Provides:
//! - Connection management (`db`)
//! - Embedded, checksummed migrations
//! - A generic create-or-update repository over the four entity tables
//! - The transaction wrapper every engine operation runs inside, with dry-run

pub mod db;
pub mod errors;
pub mod migrations;
pub mod repo;
pub mod tx;

// Re-export key types
pub use errors::Result;
pub use tx::{atomic, TxMode};
