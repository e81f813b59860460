//! Lazily compiled validators, one per status
//!
//! A process-wide instance is reachable through [`SchemaCache::global`];
//! engine functions still take `&SchemaCache` so tests can use private
//! instances.

use jsonschema::Validator;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock, RwLock};

use super::{SchemaError, SchemaRegistry};
use crate::model::Status;

static GLOBAL: OnceLock<SchemaCache> = OnceLock::new();

pub struct SchemaCache {
    registry: RwLock<SchemaRegistry>,
    compiled: RwLock<HashMap<Status, Arc<Validator>>>,
}

impl SchemaCache {
    pub fn new(registry: SchemaRegistry) -> Self {
        Self {
            registry: RwLock::new(registry),
            compiled: RwLock::new(HashMap::new()),
        }
    }

    /// The process-wide cache; empty until [`SchemaCache::install`] is called
    pub fn global() -> &'static SchemaCache {
        GLOBAL.get_or_init(|| SchemaCache::new(SchemaRegistry::new()))
    }

    /// Point the process-wide cache at a registry, dropping compiled schemas
    pub fn install(registry: SchemaRegistry) -> &'static SchemaCache {
        let cache = Self::global();
        cache.set_registry(registry);
        cache
    }

    /// Replace the registry and drop everything compiled from the old one
    pub fn set_registry(&self, registry: SchemaRegistry) {
        *self.registry.write().unwrap_or_else(|e| e.into_inner()) = registry;
        self.clear();
    }

    /// Compiled validator for a status, compiling it on first use
    ///
    /// # Errors
    ///
    /// Any `SchemaError` from loading or compiling the schema.
    pub fn validator(&self, status: Status) -> Result<Arc<Validator>, SchemaError> {
        if let Some(found) = self
            .compiled
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(&status)
        {
            return Ok(found.clone());
        }

        let schema = self
            .registry
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .load(status)?;
        let validator =
            Arc::new(
                jsonschema::validator_for(&schema).map_err(|e| SchemaError::Compile {
                    status,
                    reason: e.to_string(),
                })?,
            );

        self.compiled
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(status, validator.clone());
        tracing::debug!(status = status.as_str(), "Compiled article-json schema");
        Ok(validator)
    }

    /// Forget the compiled schema for one status
    pub fn invalidate(&self, status: Status) {
        self.compiled
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&status);
    }

    /// Forget every compiled schema
    pub fn clear(&self) {
        self.compiled
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
    }

    /// Drop and eagerly recompile every registered schema
    ///
    /// # Errors
    ///
    /// The first `SchemaError` encountered; schemas compiled before it stay
    /// cached.
    pub fn reload(&self) -> Result<(), SchemaError> {
        self.clear();
        let statuses = self
            .registry
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .statuses();
        for status in statuses {
            self.validator(status)?;
        }
        Ok(())
    }

    pub fn is_compiled(&self, status: Status) -> bool {
        self.compiled
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .contains_key(&status)
    }

    /// Validate a document, separating schema faults from data faults
    ///
    /// `Ok(vec![])` means valid; `Ok(violations)` lists what failed.
    ///
    /// # Errors
    ///
    /// A `SchemaError` when the schema itself cannot be used.
    pub fn check(&self, document: &Value, status: Status) -> Result<Vec<String>, SchemaError> {
        let validator = self.validator(status)?;
        Ok(validator
            .iter_errors(document)
            .map(|e| format!("{}: {}", e.instance_path, e))
            .collect())
    }

    /// Validate a document, returning it unchanged when it passes
    ///
    /// Returns `None` both for an invalid document (logged at info) and for a
    /// schema fault (logged at error).
    pub fn validate(&self, document: Value, status: Status) -> Option<Value> {
        match self.check(&document, status) {
            Ok(violations) if violations.is_empty() => Some(document),
            Ok(violations) => {
                tracing::info!(
                    status = status.as_str(),
                    violations = violations.len(),
                    first = violations.first().map(String::as_str).unwrap_or(""),
                    "article-json failed schema validation"
                );
                None
            }
            Err(err) => {
                tracing::error!(
                    status = status.as_str(),
                    error = %err,
                    "schema fault while validating article-json"
                );
                None
            }
        }
    }
}

impl std::fmt::Debug for SchemaCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let compiled: Vec<Status> = self
            .compiled
            .read()
            .map(|c| c.keys().copied().collect())
            .unwrap_or_default();
        f.debug_struct("SchemaCache")
            .field("compiled", &compiled)
            .finish()
    }
}
