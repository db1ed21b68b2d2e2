//! Speech synthesis error types

use thiserror::Error;

/// Synthesis error with classification
#[derive(Debug, Error)]
#[error("{message}")]
pub struct TtsError {
    pub kind: TtsErrorKind,
    pub message: String,
}

impl TtsError {
    pub fn new(kind: TtsErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn empty_text() -> Self {
        Self::new(TtsErrorKind::EmptyText, "No speakable text")
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(TtsErrorKind::Network, message)
    }

    pub fn http(message: impl Into<String>) -> Self {
        Self::new(TtsErrorKind::Http, message)
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::new(TtsErrorKind::Decode, message)
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(TtsErrorKind::Unknown, message)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TtsErrorKind {
    /// Nothing left to say after tokenizing
    EmptyText,
    /// Connection failures, timeouts
    Network,
    /// Non-success status from the TTS endpoint
    Http,
    /// Audio could not be decoded or re-encoded
    Decode,
    Unknown,
}
