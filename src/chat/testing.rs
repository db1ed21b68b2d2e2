//! Mock implementations for testing
//!
//! These mocks enable turn-level testing without real I/O.

use crate::llm::{LlmError, LlmRequest, LlmResponse, LlmService, Usage};
use crate::tts::{SpeechAudio, SpeechSynthesizer, TtsError, WAV_CONTENT_TYPE};
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

// ============================================================================
// Mock LLM Service
// ============================================================================

type QueuedReply = (Result<LlmResponse, LlmError>, Duration);

/// Mock model that returns queued responses, optionally after a delay
pub struct MockLlmService {
    responses: Mutex<VecDeque<QueuedReply>>,
    model_id: String,
    /// Record of all requests made
    pub requests: Mutex<Vec<LlmRequest>>,
}

#[allow(dead_code)]
impl MockLlmService {
    pub fn new(model_id: impl Into<String>) -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            model_id: model_id.into(),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queue a successful reply
    pub fn queue_text(&self, text: impl Into<String>) {
        self.queue_text_delayed(text, Duration::ZERO);
    }

    pub fn queue_text_delayed(&self, text: impl Into<String>, delay: Duration) {
        let reply = LlmResponse {
            text: text.into(),
            usage: Usage::default(),
        };
        self.responses.lock().unwrap().push_back((Ok(reply), delay));
    }

    /// Queue an error response
    pub fn queue_error(&self, error: LlmError) {
        self.responses
            .lock()
            .unwrap()
            .push_back((Err(error), Duration::ZERO));
    }

    /// Get recorded requests
    pub fn recorded_requests(&self) -> Vec<LlmRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmService for MockLlmService {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        self.requests.lock().unwrap().push(request.clone());
        let (result, delay) = self.responses.lock().unwrap().pop_front().unwrap_or_else(|| {
            (
                Err(LlmError::unreachable("No mock response queued")),
                Duration::ZERO,
            )
        });
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        result
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

// ============================================================================
// Mock Synthesizer
// ============================================================================

type QueuedSpeech = (Result<SpeechAudio, TtsError>, Duration);

/// Mock synthesizer returning queued audio, optionally after a delay
pub struct MockSynthesizer {
    results: Mutex<VecDeque<QueuedSpeech>>,
    /// Record of (text, lang) pairs synthesized
    pub texts: Mutex<Vec<(String, String)>>,
}

#[allow(dead_code)]
impl MockSynthesizer {
    pub fn new() -> Self {
        Self {
            results: Mutex::new(VecDeque::new()),
            texts: Mutex::new(Vec::new()),
        }
    }

    pub fn queue_audio(&self, bytes: &'static [u8]) {
        self.queue_audio_delayed(bytes, Duration::ZERO);
    }

    pub fn queue_audio_delayed(&self, bytes: &'static [u8], delay: Duration) {
        let audio = SpeechAudio {
            bytes: Bytes::from_static(bytes),
            content_type: WAV_CONTENT_TYPE,
        };
        self.results.lock().unwrap().push_back((Ok(audio), delay));
    }

    pub fn queue_error(&self, message: &str) {
        self.results
            .lock()
            .unwrap()
            .push_back((Err(TtsError::network(message)), Duration::ZERO));
    }

    pub fn recorded_texts(&self) -> Vec<(String, String)> {
        self.texts.lock().unwrap().clone()
    }
}

impl Default for MockSynthesizer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SpeechSynthesizer for MockSynthesizer {
    async fn synthesize(&self, text: &str, lang: &str) -> Result<SpeechAudio, TtsError> {
        self.texts
            .lock()
            .unwrap()
            .push((text.to_string(), lang.to_string()));
        let (result, delay) = self
            .results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| (Err(TtsError::unknown("No mock audio queued")), Duration::ZERO));
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        result
    }

    fn name(&self) -> &str {
        "mock"
    }
}
