use serde::{Deserialize, Serialize};

use crate::extract::ArticleInfo;

/// An article, identified by `(journal, manuscript_id)`
///
/// Owns every version of the article. `volume` and `article_type` follow the
/// most recent ingest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub id: i64,
    pub journal_id: i64,
    pub manuscript_id: i64,
    pub volume: u32,
    #[serde(rename = "type")]
    pub article_type: String,
}

/// Fields written when an article is created or updated
///
/// `journal_id` is not part of the ingested document; the engine sets it
/// from the journal it just resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleDraft {
    pub journal_id: i64,
    pub manuscript_id: i64,
    pub volume: u32,
    pub article_type: String,
}

impl ArticleDraft {
    pub fn new(journal_id: i64, info: &ArticleInfo) -> Self {
        Self {
            journal_id,
            manuscript_id: info.manuscript_id,
            volume: info.volume,
            article_type: info.article_type.clone(),
        }
    }
}
