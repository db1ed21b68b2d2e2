//! Chat model abstraction
//!
//! The service only needs "send history, get reply text"; providers sit
//! behind [`LlmService`].

mod error;
mod ollama;
mod types;

pub use error::LlmError;
#[allow(unused_imports)]
pub use error::LlmErrorKind;
pub use ollama::{OllamaService, DEFAULT_BASE_URL as DEFAULT_OLLAMA_URL, DEFAULT_MODEL};
pub use types::*;

use async_trait::async_trait;
use std::sync::Arc;

/// A chat model: history in, one reply out
#[async_trait]
pub trait LlmService: Send + Sync {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError>;

    /// Model name as the backend knows it
    fn model_id(&self) -> &str;
}

#[async_trait]
impl<T: LlmService + ?Sized> LlmService for Arc<T> {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        (**self).complete(request).await
    }

    fn model_id(&self) -> &str {
        (**self).model_id()
    }
}

/// Emits one structured event per model call
pub struct LoggingService {
    inner: Arc<dyn LlmService>,
    model_id: String,
}

impl LoggingService {
    pub fn new(inner: Arc<dyn LlmService>) -> Self {
        let model_id = inner.model_id().to_string();
        Self { inner, model_id }
    }
}

#[async_trait]
impl LlmService for LoggingService {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        let started = std::time::Instant::now();
        let result = self.inner.complete(request).await;
        let elapsed_ms = started.elapsed().as_millis();

        match &result {
            Ok(reply) => tracing::info!(
                model = %self.model_id,
                elapsed_ms = %elapsed_ms,
                history = request.messages.len(),
                reply_chars = reply.text.chars().count(),
                prompt_tokens = reply.usage.input_tokens,
                reply_tokens = reply.usage.output_tokens,
                "Model replied"
            ),
            Err(e) => tracing::error!(
                model = %self.model_id,
                elapsed_ms = %elapsed_ms,
                kind = e.kind.as_str(),
                transient = e.kind.is_transient(),
                error = %e.message,
                "Model call failed"
            ),
        }

        result
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}
