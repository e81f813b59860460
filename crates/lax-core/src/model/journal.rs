use serde::{Deserialize, Serialize};

/// A journal, identified by its unique name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Journal {
    pub id: i64,
    pub name: String,
}

/// Fields written when a journal is created or updated
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalDraft {
    pub name: String,
}

impl JournalDraft {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}
