use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::status::Status;
use crate::extract::VersionInfo;

/// One version of an article
///
/// `datetime_published` is `None` until the publish engine stamps it;
/// ingestion never writes it. `article_json_v1` and
/// `article_json_v1_snippet` are derived by merging fragments and are only
/// present once a merge has validated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleVersion {
    pub id: i64,
    pub article_id: i64,
    pub version: u32,
    pub title: String,
    pub status: Status,
    pub datetime_published: Option<DateTime<Utc>>,
    pub article_json_v1_raw: Value,
    pub article_json_v1: Option<Value>,
    pub article_json_v1_snippet: Option<Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ArticleVersion {
    pub fn is_published(&self) -> bool {
        self.datetime_published.is_some()
    }
}

/// Fields an ingest is allowed to write on an article version
///
/// Carries no publication timestamp and no derived documents.
#[derive(Debug, Clone, PartialEq)]
pub struct ArticleVersionDraft {
    pub article_id: i64,
    pub version: u32,
    pub title: String,
    pub status: Status,
    pub article_json_v1_raw: Value,
}

impl ArticleVersionDraft {
    pub fn new(article_id: i64, info: &VersionInfo) -> Self {
        Self {
            article_id,
            version: info.version,
            title: info.title.clone(),
            status: info.status,
            article_json_v1_raw: info.raw.clone(),
        }
    }
}
