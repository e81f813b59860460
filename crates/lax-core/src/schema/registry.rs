use serde_json::Value;
use std::collections::HashMap;
use std::path::PathBuf;

use super::SchemaError;
use crate::model::Status;

/// Where the schema for one status comes from
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaSource {
    /// A JSON file read on first use
    Path(PathBuf),
    /// An already-parsed schema document
    Inline(Value),
}

/// Status → schema source
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaRegistry {
    sources: HashMap<Status, SchemaSource>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_path(mut self, status: Status, path: impl Into<PathBuf>) -> Self {
        self.register(status, SchemaSource::Path(path.into()));
        self
    }

    pub fn with_inline(mut self, status: Status, schema: Value) -> Self {
        self.register(status, SchemaSource::Inline(schema));
        self
    }

    /// Register (or replace) the source for a status
    pub fn register(&mut self, status: Status, source: SchemaSource) {
        self.sources.insert(status, source);
    }

    pub fn source(&self, status: Status) -> Option<&SchemaSource> {
        self.sources.get(&status)
    }

    pub fn statuses(&self) -> Vec<Status> {
        let mut statuses: Vec<Status> = self.sources.keys().copied().collect();
        statuses.sort_by_key(|s| s.as_str());
        statuses
    }

    /// Load the schema document for a status
    ///
    /// # Errors
    ///
    /// `NotRegistered`, `Read` or `Parse`.
    pub fn load(&self, status: Status) -> Result<Value, SchemaError> {
        match self.sources.get(&status) {
            None => Err(SchemaError::NotRegistered { status }),
            Some(SchemaSource::Inline(schema)) => Ok(schema.clone()),
            Some(SchemaSource::Path(path)) => {
                let text = std::fs::read_to_string(path).map_err(|e| SchemaError::Read {
                    status,
                    path: path.display().to_string(),
                    reason: e.to_string(),
                })?;
                serde_json::from_str(&text).map_err(|e| SchemaError::Parse {
                    status,
                    reason: e.to_string(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    #[test]
    fn test_unregistered_status() {
        let registry = SchemaRegistry::new().with_inline(Status::Poa, json!({}));
        assert_eq!(
            registry.load(Status::Vor),
            Err(SchemaError::NotRegistered {
                status: Status::Vor
            })
        );
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"type": "object"}}"#).unwrap();

        let registry = SchemaRegistry::new().with_path(Status::Vor, file.path());
        assert_eq!(registry.load(Status::Vor).unwrap(), json!({"type": "object"}));
    }

    #[test]
    fn test_unparseable_file_is_parse_fault() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{not json").unwrap();

        let registry = SchemaRegistry::new().with_path(Status::Poa, file.path());
        assert!(matches!(
            registry.load(Status::Poa),
            Err(SchemaError::Parse { .. })
        ));
    }

    #[test]
    fn test_missing_file_is_read_fault() {
        let registry = SchemaRegistry::new().with_path(Status::Poa, "/nonexistent/poa.json");
        assert!(matches!(
            registry.load(Status::Poa),
            Err(SchemaError::Read { .. })
        ));
    }
}
