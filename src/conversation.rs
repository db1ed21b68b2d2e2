//! Bounded conversation history
//!
//! Keeps the two most recent user/assistant exchanges. This is the whole
//! context the model sees on each turn.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum number of messages retained (two exchanges)
pub const HISTORY_LIMIT: usize = 4;

/// Message role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A single turn-ordered message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            created_at: Utc::now(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// Append-only history truncated from the front to [`HISTORY_LIMIT`]
#[derive(Debug, Clone, Default)]
pub struct ConversationBuffer {
    messages: Vec<Message>,
}

impl ConversationBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message, dropping the oldest ones past the limit.
    pub fn append(&mut self, message: Message) {
        self.messages.push(message);
        if self.messages.len() > HISTORY_LIMIT {
            let excess = self.messages.len() - HISTORY_LIMIT;
            self.messages.drain(..excess);
        }
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.append(Message::user(content));
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.append(Message::assistant(content));
    }

    /// Current ordered history, trimming already applied
    pub fn snapshot(&self) -> Vec<Message> {
        self.messages.clone()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }
}
