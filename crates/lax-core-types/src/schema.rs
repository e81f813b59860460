//! Canonical schema constants for structured logging and events
//!
//! These constants keep log fields consistent between the engine, the store
//! and the CLI.

// Canonical field keys for structured logging
pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";
pub const FIELD_REQUEST_ID: &str = "request_id";

// Entity identifiers
pub const FIELD_JOURNAL: &str = "journal";
pub const FIELD_MSID: &str = "msid";
pub const FIELD_VERSION: &str = "version";
pub const FIELD_PREVIOUS_VERSION: &str = "previous_version";
pub const FIELD_FRAGMENT_TYPE: &str = "fragment_type";

// Transaction outcome
pub const FIELD_DRY_RUN: &str = "dry_run";

// Error fields
pub const FIELD_ERR_KIND: &str = "err.kind";
pub const FIELD_ERR_CODE: &str = "err.code";

// Canonical event names
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants_accessibility() {
        assert!(!FIELD_COMPONENT.is_empty());
        assert!(!FIELD_OP.is_empty());
        assert!(!FIELD_MSID.is_empty());
        assert!(!EVENT_START.is_empty());
        assert!(!EVENT_END.is_empty());
        assert!(!EVENT_END_ERROR.is_empty());
    }

    #[test]
    fn test_event_names_are_distinct() {
        assert_ne!(EVENT_START, EVENT_END);
        assert_ne!(EVENT_START, EVENT_END_ERROR);
        assert_ne!(EVENT_END, EVENT_END_ERROR);
    }
}
