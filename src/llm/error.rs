//! Model error types

use thiserror::Error;

#[derive(Debug, Error)]
#[error("{message}")]
pub struct LlmError {
    pub kind: LlmErrorKind,
    pub message: String,
}

impl LlmError {
    pub fn new(kind: LlmErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Backend could not be reached or did not answer in time
    pub fn unreachable(message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::Unreachable, message)
    }

    pub fn model_not_found(message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::ModelNotFound, message)
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::Rejected, message)
    }

    pub fn backend(message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::Backend, message)
    }

    /// Response arrived but carried no usable reply
    pub fn bad_reply(message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::BadReply, message)
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::Unknown, message)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmErrorKind {
    /// Connection refused, timeout, truncated body
    Unreachable,
    /// The configured model has not been pulled (404)
    ModelNotFound,
    /// Backend refused the request (4xx other than 404)
    Rejected,
    /// Backend failed while generating (5xx)
    Backend,
    /// Missing, empty or unparsable reply
    BadReply,
    Unknown,
}

impl LlmErrorKind {
    /// Whether asking again later might succeed without operator action
    pub fn is_transient(self) -> bool {
        matches!(self, Self::Unreachable | Self::Backend)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unreachable => "unreachable",
            Self::ModelNotFound => "model_not_found",
            Self::Rejected => "rejected",
            Self::Backend => "backend",
            Self::BadReply => "bad_reply",
            Self::Unknown => "unknown",
        }
    }
}
