use lax_core::errors::{ExError, ExErrorKind, LaxError, StateRule};
use lax_core::extract::ExtractError;
use lax_core::model::Status;
use lax_core::schema::SchemaError;

#[test]
fn test_all_business_rules_share_one_kind() {
    let errors: Vec<ExError> = vec![
        LaxError::PreviousVersionUnpublished {
            msid: 1,
            version: 2,
            previous_version: 1,
        }
        .into(),
        LaxError::OutOfSequence {
            msid: 1,
            given: 3,
            expected: 2,
        }
        .into(),
        LaxError::IngestPublished { msid: 1, version: 1 }.into(),
        LaxError::AlreadyPublished { msid: 1, version: 1 }.into(),
        LaxError::VersionNotFound { msid: 1, version: 9 }.into(),
    ];

    for err in &errors {
        assert_eq!(err.kind(), ExErrorKind::StateViolation);
        assert_eq!(err.code(), "ERR_STATE_VIOLATION");
        assert!(err.is_caller_fault());
    }

    let rules: Vec<_> = errors.iter().map(|e| e.rule().unwrap()).collect();
    assert_eq!(
        rules,
        vec![
            StateRule::PreviousVersionUnpublished,
            StateRule::OutOfSequence,
            StateRule::AlreadyPublished,
            StateRule::AlreadyPublished,
            StateRule::VersionNotFound,
        ]
    );
}

#[test]
fn test_malformed_input_is_not_a_state_violation() {
    let err: ExError = ExtractError::MissingSection { section: "journal" }.into();

    assert_eq!(err.kind(), ExErrorKind::InvalidInput);
    assert!(!err.is_state_violation());
    assert!(err.rule().is_none());
    assert!(err.message().contains("journal"));
}

#[test]
fn test_schema_fault_is_internal() {
    let err: ExError = SchemaError::NotRegistered {
        status: Status::Vor,
    }
    .into();

    assert_eq!(err.kind(), ExErrorKind::SchemaFault);
    assert!(!err.is_caller_fault());
}

#[test]
fn test_error_kind_code_mapping() {
    let kinds = vec![
        (ExErrorKind::StateViolation, "ERR_STATE_VIOLATION"),
        (ExErrorKind::InvalidInput, "ERR_INVALID_INPUT"),
        (ExErrorKind::NotFound, "ERR_NOT_FOUND"),
        (ExErrorKind::SchemaFault, "ERR_SCHEMA_FAULT"),
        (ExErrorKind::Persistence, "ERR_PERSISTENCE"),
        (ExErrorKind::Concurrency, "ERR_CONCURRENCY"),
    ];

    for (kind, expected_code) in kinds {
        assert_eq!(kind.code(), expected_code);
    }
}

#[test]
fn test_source_chain_is_exposed() {
    let inner = ExError::new(ExErrorKind::Persistence).with_message("disk full");
    let outer = ExError::new(ExErrorKind::Internal)
        .with_op("ingest")
        .with_source(inner);

    assert_eq!(outer.source_error().unwrap().message(), "disk full");
    assert!(std::error::Error::source(&outer).is_some());
}
