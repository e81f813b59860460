use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Publication status of an article version
///
/// The status selects which schema a merged document is validated against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Status {
    /// Provisional on acceptance
    #[default]
    #[serde(rename = "POA", alias = "poa")]
    Poa,
    /// Version of record
    #[serde(rename = "VOR", alias = "vor")]
    Vor,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Poa => "POA",
            Status::Vor => "VOR",
        }
    }

    pub fn all() -> [Status; 2] {
        [Status::Poa, Status::Vor]
    }
}

impl FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "POA" => Ok(Status::Poa),
            "VOR" => Ok(Status::Vor),
            other => Err(format!("unknown status '{}'", other)),
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("poa".parse::<Status>(), Ok(Status::Poa));
        assert_eq!(" VOR ".parse::<Status>(), Ok(Status::Vor));
        assert!("draft".parse::<Status>().is_err());
    }

    #[test]
    fn test_serde_uses_upper_case() {
        assert_eq!(serde_json::to_string(&Status::Vor).unwrap(), "\"VOR\"");
        let parsed: Status = serde_json::from_str("\"poa\"").unwrap();
        assert_eq!(parsed, Status::Poa);
    }
}
