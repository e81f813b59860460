//! Typed extraction of the three sub-documents of an article-json payload
//!
//! ```json
//! {
//!   "journal": {"title": "eLife"},
//!   "article": {"id": 1968, "volume": 4, "type": "research-article"},
//!   "article-version": {"title": "...", "version": 1, "published": null}
//! }
//! ```
//!
//! Version fields may also be carried inline in `article`, which is how the
//! upstream feed sends them; an explicit `article-version` object wins.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::datetime::normalize_json;
use crate::model::Status;

pub const JOURNAL_KEY: &str = "journal";
pub const ARTICLE_KEY: &str = "article";
pub const ARTICLE_VERSION_KEY: &str = "article-version";

/// Why an article-json document could not be read
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExtractError {
    #[error("article-json is not an object")]
    NotAnObject,

    #[error("missing '{section}' section")]
    MissingSection { section: &'static str },

    #[error("missing field '{field}' in '{section}'")]
    MissingField {
        section: &'static str,
        field: &'static str,
    },

    #[error("field '{field}' in '{section}' is not {expected}: {value}")]
    InvalidField {
        section: &'static str,
        field: &'static str,
        expected: &'static str,
        value: String,
    },

    #[error("unparseable timestamp: {value}")]
    InvalidTimestamp { value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalInfo {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleInfo {
    pub manuscript_id: i64,
    pub volume: u32,
    pub article_type: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VersionInfo {
    pub title: String,
    pub version: u32,
    pub status: Status,
    /// The `published` value as sent; ingestion never reads it
    pub published: Value,
    /// The sub-document the version fields were read from
    pub raw: Value,
}

impl VersionInfo {
    /// The `published` value normalized to UTC
    ///
    /// # Errors
    ///
    /// `ExtractError::InvalidTimestamp` when the value is not a timestamp.
    pub fn published_at(&self) -> Result<Option<DateTime<Utc>>, ExtractError> {
        normalize_json(&self.published)
    }
}

/// A fully extracted article-json document
#[derive(Debug, Clone, PartialEq)]
pub struct ArticleJson {
    pub journal: JournalInfo,
    pub article: ArticleInfo,
    pub version: VersionInfo,
}

impl ArticleJson {
    /// Extract all three sub-documents
    ///
    /// # Errors
    ///
    /// An `ExtractError` naming the first missing or mistyped field.
    pub fn from_value(data: &Value) -> Result<Self, ExtractError> {
        let root = data.as_object().ok_or(ExtractError::NotAnObject)?;

        let journal = section(root, JOURNAL_KEY)?;
        let article = section(root, ARTICLE_KEY)?;
        let (version_key, version_section) = match root.get(ARTICLE_VERSION_KEY) {
            Some(Value::Object(map)) => (ARTICLE_VERSION_KEY, map),
            Some(_) => {
                return Err(ExtractError::InvalidField {
                    section: "root",
                    field: ARTICLE_VERSION_KEY,
                    expected: "an object",
                    value: root[ARTICLE_VERSION_KEY].to_string(),
                })
            }
            None => (ARTICLE_KEY, article),
        };

        Ok(Self {
            journal: JournalInfo {
                name: string_field(journal, JOURNAL_KEY, "title")?,
            },
            article: ArticleInfo {
                manuscript_id: manuscript_id(article)?,
                volume: u32_field(article, ARTICLE_KEY, "volume")?,
                article_type: string_field(article, ARTICLE_KEY, "type")?,
            },
            version: VersionInfo {
                title: string_field(version_section, version_key, "title")?,
                version: positive_version(version_section, version_key)?,
                status: status(version_section, version_key)?,
                published: version_section
                    .get("published")
                    .cloned()
                    .unwrap_or(Value::Null),
                raw: Value::Object(version_section.clone()),
            },
        })
    }
}

fn section<'a>(
    root: &'a Map<String, Value>,
    key: &'static str,
) -> Result<&'a Map<String, Value>, ExtractError> {
    match root.get(key) {
        Some(Value::Object(map)) => Ok(map),
        Some(other) => Err(ExtractError::InvalidField {
            section: "root",
            field: key,
            expected: "an object",
            value: other.to_string(),
        }),
        None => Err(ExtractError::MissingSection { section: key }),
    }
}

fn required<'a>(
    map: &'a Map<String, Value>,
    section: &'static str,
    field: &'static str,
) -> Result<&'a Value, ExtractError> {
    map.get(field)
        .filter(|v| !v.is_null())
        .ok_or(ExtractError::MissingField { section, field })
}

fn string_field(
    map: &Map<String, Value>,
    section: &'static str,
    field: &'static str,
) -> Result<String, ExtractError> {
    let value = required(map, section, field)?;
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| ExtractError::InvalidField {
            section,
            field,
            expected: "a string",
            value: value.to_string(),
        })
}

/// Integers may arrive as numbers or as digit strings ("01968")
fn integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

fn manuscript_id(article: &Map<String, Value>) -> Result<i64, ExtractError> {
    let value = required(article, ARTICLE_KEY, "id")?;
    integer(value).ok_or_else(|| ExtractError::InvalidField {
        section: ARTICLE_KEY,
        field: "id",
        expected: "an integer",
        value: value.to_string(),
    })
}

fn u32_field(
    map: &Map<String, Value>,
    section: &'static str,
    field: &'static str,
) -> Result<u32, ExtractError> {
    let value = required(map, section, field)?;
    integer(value)
        .and_then(|n| u32::try_from(n).ok())
        .ok_or_else(|| ExtractError::InvalidField {
            section,
            field,
            expected: "a non-negative integer",
            value: value.to_string(),
        })
}

fn positive_version(map: &Map<String, Value>, section: &'static str) -> Result<u32, ExtractError> {
    let version = u32_field(map, section, "version")?;
    if version == 0 {
        return Err(ExtractError::InvalidField {
            section,
            field: "version",
            expected: "a positive integer",
            value: "0".to_string(),
        });
    }
    Ok(version)
}

fn status(map: &Map<String, Value>, section: &'static str) -> Result<Status, ExtractError> {
    match map.get("status") {
        None | Some(Value::Null) => Ok(Status::default()),
        Some(Value::String(s)) => s.parse().map_err(|_| ExtractError::InvalidField {
            section,
            field: "status",
            expected: "POA or VOR",
            value: s.clone(),
        }),
        Some(other) => Err(ExtractError::InvalidField {
            section,
            field: "status",
            expected: "POA or VOR",
            value: other.to_string(),
        }),
    }
}
