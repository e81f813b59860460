//! Migration framework
//!
//! Provides:
//! - Migration runner with checksums
//! - Idempotent application
//! - Embedded SQL migrations

mod checksums;
mod embedded;
mod runner;

pub use checksums::compute_checksum;
pub use embedded::{get_migrations, Migration};
pub use runner::{applied_migrations, apply_migrations};
