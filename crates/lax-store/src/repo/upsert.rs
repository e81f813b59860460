//! Generic create-or-update
//!
//! Lookups go through the entity's natural key. A concurrent writer can slip
//! in between the lookup and the insert; the insert then fails on the unique
//! constraint and is retried once as an update of the row that won.

#![allow(clippy::result_large_err)]

use crate::errors::Result;
use lax_core::errors::{ExError, ExErrorKind};
use rusqlite::Connection;

/// A persisted entity with a natural key carried by its draft
pub trait Entity: Sized {
    /// Fields written on create and update
    type Draft;

    /// Table name, used in logs and errors
    const NAME: &'static str;

    /// Find the row whose natural key matches the draft
    fn find(conn: &Connection, draft: &Self::Draft) -> Result<Option<Self>>;

    fn insert(conn: &Connection, draft: &Self::Draft) -> Result<Self>;

    /// Overwrite `existing` with the draft's fields
    fn update(conn: &Connection, existing: &Self, draft: &Self::Draft) -> Result<Self>;
}

/// What `create_or_update` may do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpsertOptions {
    pub create: bool,
    pub update: bool,
}

impl Default for UpsertOptions {
    fn default() -> Self {
        Self {
            create: true,
            update: true,
        }
    }
}

impl UpsertOptions {
    /// Create if missing, return an existing row untouched
    pub fn create_only() -> Self {
        Self {
            create: true,
            update: false,
        }
    }

    /// Update an existing row, fail if missing
    pub fn update_only() -> Self {
        Self {
            create: false,
            update: true,
        }
    }
}

/// Outcome of `create_or_update`
#[derive(Debug, Clone, PartialEq)]
pub struct Upserted<E> {
    pub entity: E,
    pub created: bool,
    pub updated: bool,
}

/// Create the entity if it is missing, update it if it exists
///
/// # Errors
///
/// - `NotFound` when the row is missing and `options.create` is false
/// - `Concurrency` when the insert hit a unique violation and the retry
///   still found no row to update
/// - any `Persistence` error from the underlying statements
pub fn create_or_update<E: Entity>(
    conn: &Connection,
    draft: &E::Draft,
    options: UpsertOptions,
) -> Result<Upserted<E>> {
    if let Some(existing) = E::find(conn, draft)? {
        return update_existing(conn, existing, draft, options);
    }

    if !options.create {
        return Err(ExError::new(ExErrorKind::NotFound)
            .with_op("create_or_update")
            .with_message(format!("{} not found and create not allowed", E::NAME)));
    }

    match E::insert(conn, draft) {
        Ok(entity) => Ok(Upserted {
            entity,
            created: true,
            updated: false,
        }),
        Err(err) if err.kind() == ExErrorKind::Concurrency => {
            tracing::warn!(
                entity = E::NAME,
                "Unique violation on insert, retrying as update"
            );
            match E::find(conn, draft)? {
                Some(existing) => update_existing(conn, existing, draft, options),
                None => Err(ExError::new(ExErrorKind::Concurrency)
                    .with_op("create_or_update")
                    .with_message(format!(
                        "{} insert conflicted but no row was found to update",
                        E::NAME
                    ))
                    .with_source(err)),
            }
        }
        Err(err) => Err(err),
    }
}

fn update_existing<E: Entity>(
    conn: &Connection,
    existing: E,
    draft: &E::Draft,
    options: UpsertOptions,
) -> Result<Upserted<E>> {
    if !options.update {
        return Ok(Upserted {
            entity: existing,
            created: false,
            updated: false,
        });
    }
    let entity = E::update(conn, &existing, draft)?;
    Ok(Upserted {
        entity,
        created: false,
        updated: true,
    })
}
