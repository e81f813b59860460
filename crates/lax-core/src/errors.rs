use lax_core_types::RequestId;
use thiserror::Error;

use crate::extract::ExtractError;
use crate::schema::SchemaError;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code that callers (CLI, API wrappers,
/// tests) match on. Business-rule conflicts all share `StateViolation`; the
/// specific rule is carried separately as a [`StateRule`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Caller faults
    /// Input conflicts with existing state (sequencing, republish, publish of unknown version)
    StateViolation,
    /// Missing sub-document or a field failing typed extraction
    InvalidInput,
    NotFound,

    // Internal faults
    /// A registered schema could not be loaded, parsed or compiled
    SchemaFault,
    Io,
    Serialization,
    Persistence,
    /// Uniqueness race that survived the update retry
    Concurrency,
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::StateViolation => "ERR_STATE_VIOLATION",
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::NotFound => "ERR_NOT_FOUND",
            ExErrorKind::SchemaFault => "ERR_SCHEMA_FAULT",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Persistence => "ERR_PERSISTENCE",
            ExErrorKind::Concurrency => "ERR_CONCURRENCY",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }

    /// True when the caller can fix the problem by changing its input
    pub fn is_caller_fault(&self) -> bool {
        matches!(
            self,
            ExErrorKind::StateViolation | ExErrorKind::InvalidInput | ExErrorKind::NotFound
        )
    }
}

/// The business rule behind a `StateViolation`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateRule {
    /// New version ingested while the latest version is unpublished
    PreviousVersionUnpublished,
    /// Version number is not exactly latest + 1 (or 1 for a new article)
    OutOfSequence,
    /// Ingest or publish against a published version without force
    AlreadyPublished,
    /// Publish requested for a version that does not exist
    VersionNotFound,
}

impl StateRule {
    pub fn as_str(&self) -> &'static str {
        match self {
            StateRule::PreviousVersionUnpublished => "previous_version_unpublished",
            StateRule::OutOfSequence => "out_of_sequence",
            StateRule::AlreadyPublished => "already_published",
            StateRule::VersionNotFound => "version_not_found",
        }
    }
}

/// Canonical structured error type
///
/// Carries the classification (`kind`, optional `rule`) plus the article
/// coordinates the failure concerns, so a single log line or CLI response
/// is enough to locate the problem.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    rule: Option<StateRule>,
    op: Option<String>,
    msid: Option<i64>,
    version: Option<u32>,
    request_id: Option<RequestId>,
    message: String,
    source: Option<Box<ExError>>,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            rule: None,
            op: None,
            msid: None,
            version: None,
            request_id: None,
            message: String::new(),
            source: None,
        }
    }

    /// Create a `StateViolation` for the given rule
    pub fn state(rule: StateRule) -> Self {
        let mut err = Self::new(ExErrorKind::StateViolation);
        err.rule = Some(rule);
        err
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add manuscript id context
    pub fn with_msid(mut self, msid: i64) -> Self {
        self.msid = Some(msid);
        self
    }

    /// Add article version context
    pub fn with_version(mut self, version: u32) -> Self {
        self.version = Some(version);
        self
    }

    /// Add request ID context
    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = Some(request_id);
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add source error
    pub fn with_source(mut self, source: ExError) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// The violated business rule, set only for `StateViolation`
    pub fn rule(&self) -> Option<StateRule> {
        self.rule
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn msid(&self) -> Option<i64> {
        self.msid
    }

    pub fn version(&self) -> Option<u32> {
        self.version
    }

    pub fn request_id(&self) -> Option<&RequestId> {
        self.request_id.as_ref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn source_error(&self) -> Option<&ExError> {
        self.source.as_deref()
    }

    pub fn is_state_violation(&self) -> bool {
        self.kind == ExErrorKind::StateViolation
    }

    pub fn is_caller_fault(&self) -> bool {
        self.kind.is_caller_fault()
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(rule) = self.rule {
            write!(f, " {}", rule.as_str())?;
        }
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        match (self.msid, self.version) {
            (Some(msid), Some(version)) => write!(f, " (article: {}v{})", msid, version)?,
            (Some(msid), None) => write!(f, " (article: {})", msid)?,
            _ => {}
        }
        Ok(())
    }
}

impl std::error::Error for ExError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

// ========== End Error Facility ==========

/// Domain errors raised by the ingest and publish rules
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LaxError {
    // ===== State machine =====
    #[error("refusing to ingest new article version {msid}v{version} when previous article version v{previous_version} is still unpublished")]
    PreviousVersionUnpublished {
        msid: i64,
        version: u32,
        previous_version: u32,
    },

    #[error("refusing to ingest new article version out of sequence: {msid} given v{given}, expected v{expected}")]
    OutOfSequence {
        msid: i64,
        given: u32,
        expected: u32,
    },

    #[error("refusing to ingest new article data on an already published article version {msid}v{version}")]
    IngestPublished { msid: i64, version: u32 },

    #[error("refusing to publish an already published article version {msid}v{version}")]
    AlreadyPublished { msid: i64, version: u32 },

    #[error("refusing to publish an article version '{msid}v{version}' that doesn't exist")]
    VersionNotFound { msid: i64, version: u32 },

    // ===== Lookup =====
    #[error("Article not found: {msid}")]
    ArticleNotFound { msid: i64 },

    #[error("Manuscript id {msid} exists in more than one journal")]
    AmbiguousArticle { msid: i64 },

    #[error("Fragment '{fragment_type}' not found for article {msid}")]
    FragmentNotFound {
        msid: i64,
        version: Option<u32>,
        fragment_type: String,
    },

    // ===== Input =====
    #[error("Invalid fragment: {reason}")]
    InvalidFragment { reason: String },

    #[error(transparent)]
    Extract(#[from] ExtractError),

    // ===== Configuration =====
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

impl From<LaxError> for ExError {
    fn from(err: LaxError) -> Self {
        let message = err.to_string();
        match err {
            LaxError::PreviousVersionUnpublished { msid, version, .. } => {
                ExError::state(StateRule::PreviousVersionUnpublished)
                    .with_msid(msid)
                    .with_version(version)
                    .with_message(message)
            }

            LaxError::OutOfSequence { msid, given, .. } => ExError::state(StateRule::OutOfSequence)
                .with_msid(msid)
                .with_version(given)
                .with_message(message),

            LaxError::IngestPublished { msid, version }
            | LaxError::AlreadyPublished { msid, version } => {
                ExError::state(StateRule::AlreadyPublished)
                    .with_msid(msid)
                    .with_version(version)
                    .with_message(message)
            }

            // publish of a missing version is a "cannot publish" conflict, not a lookup miss
            LaxError::VersionNotFound { msid, version } => {
                ExError::state(StateRule::VersionNotFound)
                    .with_msid(msid)
                    .with_version(version)
                    .with_message(message)
            }

            LaxError::ArticleNotFound { msid } => ExError::new(ExErrorKind::NotFound)
                .with_msid(msid)
                .with_message(message),

            LaxError::AmbiguousArticle { msid } => ExError::new(ExErrorKind::InvalidInput)
                .with_msid(msid)
                .with_message(message),

            LaxError::FragmentNotFound { msid, version, .. } => {
                let err = ExError::new(ExErrorKind::NotFound)
                    .with_msid(msid)
                    .with_message(message);
                match version {
                    Some(v) => err.with_version(v),
                    None => err,
                }
            }

            LaxError::InvalidFragment { .. } | LaxError::Extract(_) => {
                ExError::new(ExErrorKind::InvalidInput).with_message(message)
            }

            LaxError::Schema(_) => ExError::new(ExErrorKind::SchemaFault).with_message(message),
        }
    }
}

impl From<ExtractError> for ExError {
    fn from(err: ExtractError) -> Self {
        LaxError::from(err).into()
    }
}

impl From<SchemaError> for ExError {
    fn from(err: SchemaError) -> Self {
        LaxError::from(err).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_violation_carries_rule() {
        let ex: ExError = LaxError::OutOfSequence {
            msid: 1968,
            given: 3,
            expected: 2,
        }
        .into();

        assert_eq!(ex.kind(), ExErrorKind::StateViolation);
        assert_eq!(ex.rule(), Some(StateRule::OutOfSequence));
        assert_eq!(ex.msid(), Some(1968));
        assert_eq!(ex.version(), Some(3));
        assert!(ex.message().contains("out of sequence"));
    }

    #[test]
    fn test_display_includes_code_and_article() {
        let ex = ExError::state(StateRule::AlreadyPublished)
            .with_op("publish")
            .with_msid(1968)
            .with_version(1)
            .with_message("already published");

        let rendered = ex.to_string();
        assert!(rendered.starts_with("[ERR_STATE_VIOLATION] already_published"));
        assert!(rendered.contains("in operation 'publish'"));
        assert!(rendered.ends_with("(article: 1968v1)"));
    }

    #[test]
    fn test_non_state_kinds_have_no_rule() {
        let ex: ExError = LaxError::ArticleNotFound { msid: 1 }.into();
        assert_eq!(ex.kind(), ExErrorKind::NotFound);
        assert!(ex.rule().is_none());
    }
}
