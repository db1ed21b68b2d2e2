//! HTTP API
//!
//! Thin wrapper over [`ChatRuntime`]: ask a question, poll for audio,
//! fetch audio.

mod assets;
mod handlers;
mod types;

pub use handlers::create_router;
#[allow(unused_imports)] // Public API re-exports
pub use types::*;

use crate::chat::ChatRuntime;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub chat: Arc<ChatRuntime>,
}

impl AppState {
    pub fn new(chat: ChatRuntime) -> Self {
        Self {
            chat: Arc::new(chat),
        }
    }
}
