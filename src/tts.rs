//! Speech synthesis abstraction
//!
//! Providers return encoded audio for a piece of text. The production chain
//! is logging → MP3-to-WAV transcoding → Google TTS.

mod error;
mod google;
mod wav;

pub use error::TtsError;
#[allow(unused_imports)]
pub use error::TtsErrorKind;
#[allow(unused_imports)] // Public API re-exports
pub use google::{chunk_text, MAX_CHUNK_CHARS};
pub use google::{GoogleTtsService, DEFAULT_TTS_URL};
pub use wav::mp3_to_wav;

use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Arc;

pub const MP3_CONTENT_TYPE: &str = "audio/mpeg";
pub const WAV_CONTENT_TYPE: &str = "audio/wav";

/// Encoded audio with its MIME type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechAudio {
    pub bytes: Bytes,
    pub content_type: &'static str,
}

/// Common interface for text-to-speech providers
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Synthesize `text` spoken in language `lang` (e.g. "en")
    async fn synthesize(&self, text: &str, lang: &str) -> Result<SpeechAudio, TtsError>;

    /// Provider name for logs
    fn name(&self) -> &str;
}

#[async_trait]
impl<T: SpeechSynthesizer + ?Sized> SpeechSynthesizer for Arc<T> {
    async fn synthesize(&self, text: &str, lang: &str) -> Result<SpeechAudio, TtsError> {
        (**self).synthesize(text, lang).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Converts MP3 output of the wrapped provider to WAV
pub struct TranscodingSynthesizer<S> {
    inner: S,
}

impl<S> TranscodingSynthesizer<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<S: SpeechSynthesizer> SpeechSynthesizer for TranscodingSynthesizer<S> {
    async fn synthesize(&self, text: &str, lang: &str) -> Result<SpeechAudio, TtsError> {
        let audio = self.inner.synthesize(text, lang).await?;
        if audio.content_type != MP3_CONTENT_TYPE {
            return Ok(audio);
        }

        // Decoding is CPU bound; keep it off the async workers
        let mp3 = audio.bytes;
        let wav = tokio::task::spawn_blocking(move || mp3_to_wav(&mp3))
            .await
            .map_err(|e| TtsError::unknown(format!("Transcoding task failed: {e}")))??;

        Ok(SpeechAudio {
            bytes: Bytes::from(wav),
            content_type: WAV_CONTENT_TYPE,
        })
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}

/// Logging wrapper for speech synthesizers
pub struct LoggingSynthesizer {
    inner: Arc<dyn SpeechSynthesizer>,
    name: String,
}

impl LoggingSynthesizer {
    pub fn new(inner: Arc<dyn SpeechSynthesizer>) -> Self {
        let name = inner.name().to_string();
        Self { inner, name }
    }
}

#[async_trait]
impl SpeechSynthesizer for LoggingSynthesizer {
    async fn synthesize(&self, text: &str, lang: &str) -> Result<SpeechAudio, TtsError> {
        let start = std::time::Instant::now();
        let result = self.inner.synthesize(text, lang).await;
        let duration = start.elapsed();

        match &result {
            Ok(audio) => {
                tracing::info!(
                    provider = %self.name,
                    lang,
                    duration_ms = %duration.as_millis(),
                    chars = text.chars().count(),
                    bytes = audio.bytes.len(),
                    content_type = audio.content_type,
                    "Speech synthesis completed"
                );
            }
            Err(e) => {
                tracing::warn!(
                    provider = %self.name,
                    lang,
                    duration_ms = %duration.as_millis(),
                    kind = ?e.kind,
                    error = %e.message,
                    "Speech synthesis failed"
                );
            }
        }

        result
    }

    fn name(&self) -> &str {
        &self.name
    }
}
