//! Repository layer over the four entity tables
//!
//! Each entity implements [`Entity`] so the engine can create-or-update it
//! through [`create_or_update`]; entity-specific queries live in the entity's
//! module.

pub mod article;
pub mod article_version;
pub mod counts;
pub mod fragment;
pub mod journal;
pub mod upsert;

pub use counts::{counts, EntityCounts};
pub use upsert::{create_or_update, Entity, UpsertOptions, Upserted};
