use thiserror::Error;

#[derive(Debug, Error)]
pub enum AssessmentError {
    #[error("I/O error while {context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("JSON parse error while {context}: {source}")]
    Json {
        context: &'static str,
        #[source]
        source: serde_json::Error,
    },
    /// An upstream contract was broken (aligner unit count, word/group count).
    #[error("precondition violated: {message}")]
    PreconditionViolation { message: String },
    /// The engine reached a state well-formed inputs cannot produce.
    #[error("internal consistency error: {message}")]
    InternalConsistency { message: String },
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("{context}: {message}")]
    Collaborator {
        context: &'static str,
        message: String,
    },
}

impl AssessmentError {
    pub(crate) fn io(context: &'static str, source: std::io::Error) -> Self {
        Self::Io { context, source }
    }

    pub(crate) fn json(context: &'static str, source: serde_json::Error) -> Self {
        Self::Json { context, source }
    }

    pub(crate) fn precondition(message: impl Into<String>) -> Self {
        Self::PreconditionViolation {
            message: message.into(),
        }
    }

    pub(crate) fn internal(message: impl Into<String>) -> Self {
        Self::InternalConsistency {
            message: message.into(),
        }
    }

    pub(crate) fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Wraps a failure reported by an external recognizer or forced aligner.
    pub fn collaborator(context: &'static str, err: impl std::fmt::Display) -> Self {
        Self::Collaborator {
            context,
            message: err.to_string(),
        }
    }

    pub fn is_precondition_violation(&self) -> bool {
        matches!(self, Self::PreconditionViolation { .. })
    }

    pub fn is_internal_consistency(&self) -> bool {
        matches!(self, Self::InternalConsistency { .. })
    }
}
