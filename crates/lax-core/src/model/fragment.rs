use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Default merge position for a new fragment
pub const DEFAULT_POSITION: i64 = 1;

/// A partial article-json document
///
/// `version == None` scopes the fragment to every version of the article.
/// Fragments are folded in ascending `position` order when merging.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleFragment {
    pub id: i64,
    pub article_id: i64,
    pub version: Option<u32>,
    #[serde(rename = "type")]
    pub fragment_type: String,
    pub fragment: Value,
    pub position: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FragmentDraft {
    pub article_id: i64,
    pub version: Option<u32>,
    pub fragment_type: String,
    pub fragment: Value,
    pub position: i64,
}
