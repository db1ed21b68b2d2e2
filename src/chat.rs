//! Turn orchestration
//!
//! One call to [`ChatRuntime::ask`] is one turn: claim the audio slot,
//! record the question, ask the model, record the answer, synthesize it.
//! The history and audio slot are shared by every caller in the process.

#[cfg(test)]
pub mod testing;

use crate::audio::{AudioSlot, TurnId};
use crate::conversation::{ConversationBuffer, Message};
use crate::llm::{LlmError, LlmRequest, LlmService};
use crate::tts::SpeechSynthesizer;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;

/// Whether `ask` waits for speech synthesis before returning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SynthesisMode {
    /// Answer is returned after synthesis finishes
    #[default]
    Inline,
    /// Synthesis runs as a background task; pollers pick it up later
    Detached,
}

impl fmt::Display for SynthesisMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SynthesisMode::Inline => "inline",
            SynthesisMode::Detached => "detached",
        })
    }
}

impl FromStr for SynthesisMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "inline" | "blocking" => Ok(SynthesisMode::Inline),
            "detached" | "background" => Ok(SynthesisMode::Detached),
            other => Err(format!(
                "unknown synthesis mode '{other}' (expected 'inline' or 'detached')"
            )),
        }
    }
}

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("Message must not be empty")]
    EmptyMessage,
    #[error("Model request failed: {0}")]
    Model(#[from] LlmError),
    #[error("Turn {0} stopped before finishing")]
    Interrupted(TurnId),
}

/// Shared conversation plus its collaborators
pub struct ChatRuntime {
    history: Arc<Mutex<ConversationBuffer>>,
    audio: Arc<AudioSlot>,
    llm: Arc<dyn LlmService>,
    tts: Arc<dyn SpeechSynthesizer>,
    lang: String,
    mode: SynthesisMode,
}

impl ChatRuntime {
    pub fn new(
        llm: Arc<dyn LlmService>,
        tts: Arc<dyn SpeechSynthesizer>,
        audio: Arc<AudioSlot>,
    ) -> Self {
        Self {
            history: Arc::new(Mutex::new(ConversationBuffer::new())),
            audio,
            llm,
            tts,
            lang: "en".to_string(),
            mode: SynthesisMode::default(),
        }
    }

    #[must_use]
    pub fn with_lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = lang.into();
        self
    }

    #[must_use]
    pub fn with_mode(mut self, mode: SynthesisMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn audio(&self) -> &Arc<AudioSlot> {
        &self.audio
    }

    pub fn model_id(&self) -> &str {
        self.llm.model_id()
    }

    /// Current history, oldest first
    pub async fn history(&self) -> Vec<Message> {
        self.history.lock().await.snapshot()
    }

    pub async fn reset(&self) {
        let mut history = self.history.lock().await;
        if history.is_empty() {
            return;
        }
        let dropped = history.len();
        history.clear();
        tracing::info!(dropped, "Conversation history cleared");
    }

    /// Run one turn and return the model's answer.
    ///
    /// Synthesis failures never fail the turn; they only show up in the
    /// audio slot. A model failure leaves no assistant message behind.
    ///
    /// The turn runs on its own task, so dropping the returned future (a
    /// client hanging up mid-request) does not strand the slot in pending.
    pub async fn ask(&self, text: &str) -> Result<String, ChatError> {
        if text.trim().is_empty() {
            return Err(ChatError::EmptyMessage);
        }

        // Claim the slot first so nobody polls the previous answer's audio
        let turn = self.audio.begin_synthesis();

        let job = TurnJob {
            history: Arc::clone(&self.history),
            audio: Arc::clone(&self.audio),
            llm: Arc::clone(&self.llm),
            tts: Arc::clone(&self.tts),
            lang: self.lang.clone(),
            mode: self.mode,
        };
        match tokio::spawn(job.run(turn, text.to_string())).await {
            Ok(result) => result,
            Err(e) => {
                tracing::error!(turn, error = %e, "Turn task aborted");
                self.audio.fail_synthesis(turn, format!("turn aborted: {e}"));
                Err(ChatError::Interrupted(turn))
            }
        }
    }
}

/// Everything one turn needs, owned so it can outlive the request
struct TurnJob {
    history: Arc<Mutex<ConversationBuffer>>,
    audio: Arc<AudioSlot>,
    llm: Arc<dyn LlmService>,
    tts: Arc<dyn SpeechSynthesizer>,
    lang: String,
    mode: SynthesisMode,
}

impl TurnJob {
    async fn run(self, turn: TurnId, text: String) -> Result<String, ChatError> {
        let request = {
            let mut history = self.history.lock().await;
            history.push_user(text);
            LlmRequest::from_history(&history.snapshot())
        };

        let response = match self.llm.complete(&request).await {
            Ok(response) => response,
            Err(e) => {
                self.audio
                    .fail_synthesis(turn, format!("model request failed: {}", e.message));
                return Err(e.into());
            }
        };
        let answer = response.text;

        self.history.lock().await.push_assistant(answer.clone());
        tracing::info!(turn, chars = answer.chars().count(), "Answer recorded");

        let synthesis = synthesize_turn(
            Arc::clone(&self.tts),
            Arc::clone(&self.audio),
            self.lang,
            turn,
            answer.clone(),
        );
        match self.mode {
            SynthesisMode::Inline => {
                synthesis.await;
                tracing::info!(turn, audio_ready = self.audio.is_ready(), "Turn finished");
            }
            SynthesisMode::Detached => {
                tokio::spawn(synthesis);
            }
        }

        Ok(answer)
    }
}

async fn synthesize_turn(
    tts: Arc<dyn SpeechSynthesizer>,
    audio: Arc<AudioSlot>,
    lang: String,
    turn: TurnId,
    text: String,
) {
    match tts.synthesize(&text, &lang).await {
        Ok(speech) => {
            audio.complete_synthesis(turn, speech.bytes);
        }
        Err(e) => {
            tracing::warn!(turn, error = %e, "No audio for this answer");
            audio.fail_synthesis(turn, e.message);
        }
    }
}
