//! Timestamp normalization
//!
//! Every publication timestamp passes through [`normalize`]. Values without
//! a timezone are taken to be UTC, never local time; values with an offset
//! are converted to UTC.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;

use crate::extract::ExtractError;

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Anything that can be turned into a UTC timestamp
#[derive(Debug, Clone, PartialEq)]
pub enum Timestamp {
    Text(String),
    Utc(DateTime<Utc>),
    Offset(DateTime<FixedOffset>),
    Naive(NaiveDateTime),
}

impl From<&str> for Timestamp {
    fn from(value: &str) -> Self {
        Timestamp::Text(value.to_string())
    }
}

impl From<String> for Timestamp {
    fn from(value: String) -> Self {
        Timestamp::Text(value)
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(value: DateTime<Utc>) -> Self {
        Timestamp::Utc(value)
    }
}

impl From<DateTime<FixedOffset>> for Timestamp {
    fn from(value: DateTime<FixedOffset>) -> Self {
        Timestamp::Offset(value)
    }
}

impl From<NaiveDateTime> for Timestamp {
    fn from(value: NaiveDateTime) -> Self {
        Timestamp::Naive(value)
    }
}

/// Normalize an optional timestamp to UTC
///
/// # Errors
///
/// `ExtractError::InvalidTimestamp` when a string is not a recognised
/// date or date-time.
pub fn normalize<T: Into<Timestamp>>(
    value: Option<T>,
) -> Result<Option<DateTime<Utc>>, ExtractError> {
    value.map(|v| to_utc(v.into())).transpose()
}

/// Normalize a JSON value: `null` passes through, strings are parsed
///
/// # Errors
///
/// `ExtractError::InvalidTimestamp` for unparseable strings and for any
/// non-string, non-null value.
pub fn normalize_json(value: &Value) -> Result<Option<DateTime<Utc>>, ExtractError> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => normalize(Some(s.as_str())),
        other => Err(ExtractError::InvalidTimestamp {
            value: other.to_string(),
        }),
    }
}

fn to_utc(ts: Timestamp) -> Result<DateTime<Utc>, ExtractError> {
    match ts {
        Timestamp::Utc(dt) => Ok(dt),
        Timestamp::Offset(dt) => Ok(dt.with_timezone(&Utc)),
        Timestamp::Naive(naive) => Ok(naive.and_utc()),
        Timestamp::Text(text) => parse_text(&text),
    }
}

fn parse_text(text: &str) -> Result<DateTime<Utc>, ExtractError> {
    let trimmed = text.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.with_timezone(&Utc));
    }
    // offsets written without a colon, e.g. +0100
    if let Ok(dt) = DateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f%z") {
        return Ok(dt.with_timezone(&Utc));
    }
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(naive.and_utc());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(midnight.and_utc());
        }
    }

    Err(ExtractError::InvalidTimestamp {
        value: text.to_string(),
    })
}

/// Current time, UTC
pub fn utcnow() -> DateTime<Utc> {
    Utc::now()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_none_passes_through() {
        assert_eq!(normalize::<&str>(None).unwrap(), None);
        assert_eq!(normalize_json(&Value::Null).unwrap(), None);
    }

    #[test]
    fn test_naive_string_is_utc() {
        let got = normalize(Some("2016-04-13T01:00:00")).unwrap().unwrap();
        assert_eq!(got, Utc.with_ymd_and_hms(2016, 4, 13, 1, 0, 0).unwrap());
    }

    #[test]
    fn test_aware_string_is_converted() {
        let got = normalize(Some("2016-04-13T01:00:00+01:00"))
            .unwrap()
            .unwrap();
        assert_eq!(got, Utc.with_ymd_and_hms(2016, 4, 13, 0, 0, 0).unwrap());

        let compact = normalize(Some("2016-04-13T01:00:00-0230")).unwrap().unwrap();
        assert_eq!(compact, Utc.with_ymd_and_hms(2016, 4, 13, 3, 30, 0).unwrap());
    }

    #[test]
    fn test_bare_date_is_midnight_utc() {
        let got = normalize(Some("2001-01-01")).unwrap().unwrap();
        assert_eq!(got, Utc.with_ymd_and_hms(2001, 1, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_utc_is_identity() {
        let now = Utc::now();
        assert_eq!(normalize(Some(now)).unwrap(), Some(now));
        assert_eq!(normalize(Some(now.to_rfc3339())).unwrap(), Some(now));
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert!(normalize(Some("yesterday")).is_err());
        assert!(normalize_json(&serde_json::json!(20160413)).is_err());
    }
}
