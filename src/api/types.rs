//! API request and response types

use crate::audio::{SlotStatus, TurnId};
use crate::conversation::Message;
use serde::{Deserialize, Serialize};

/// Form body of `POST /ask`
#[derive(Debug, Deserialize)]
pub struct AskForm {
    pub user_input: String,
}

/// Response for `POST /ask`
#[derive(Debug, Serialize, Deserialize)]
pub struct AskResponse {
    pub answer: String,
}

/// Response for `GET /audio_status`
#[derive(Debug, Serialize, Deserialize)]
pub struct AudioStatusResponse {
    pub ready: bool,
    /// One of idle, pending, ready, failed
    pub state: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub turn: Option<TurnId>,
}

impl From<SlotStatus> for AudioStatusResponse {
    fn from(status: SlotStatus) -> Self {
        Self {
            ready: status.ready,
            state: status.state.to_string(),
            turn: status.turn,
        }
    }
}

/// Response with the current conversation window
#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub messages: Vec<Message>,
    pub model: String,
}

/// Response for lifecycle actions
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
