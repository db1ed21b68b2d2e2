//! Google Translate text-to-speech provider
//!
//! The endpoint speaks at most 100 characters per request, so replies are
//! tokenized on punctuation, packed into chunks under the limit, fetched in
//! order and concatenated. MP3 frames concatenate cleanly.

use super::{SpeechAudio, SpeechSynthesizer, TtsError, MP3_CONTENT_TYPE};
use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use regex::Regex;
use reqwest::Client;
use std::sync::OnceLock;
use std::time::Duration;

pub const DEFAULT_TTS_URL: &str = "https://translate.google.com";

/// Per-request character limit of the endpoint
pub const MAX_CHUNK_CHARS: usize = 100;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36";

/// Client for the `translate_tts` endpoint
pub struct GoogleTtsService {
    client: Client,
    url: String,
}

impl GoogleTtsService {
    pub fn new(base_url: &str) -> Result<Self, TtsError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| TtsError::unknown(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            url: format!("{}/translate_tts", base_url.trim_end_matches('/')),
        })
    }

    async fn fetch_chunk(
        &self,
        chunk: &str,
        lang: &str,
        idx: usize,
        total: usize,
    ) -> Result<Bytes, TtsError> {
        let textlen = chunk.chars().count().to_string();
        let idx = idx.to_string();
        let total = total.to_string();

        let response = self
            .client
            .get(&self.url)
            .query(&[
                ("ie", "UTF-8"),
                ("q", chunk),
                ("tl", lang),
                ("total", total.as_str()),
                ("idx", idx.as_str()),
                ("textlen", textlen.as_str()),
                ("client", "tw-ob"),
            ])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TtsError::network(format!("Request timeout: {e}"))
                } else if e.is_connect() {
                    TtsError::network(format!("Connection failed: {e}"))
                } else {
                    TtsError::unknown(format!("Request failed: {e}"))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(TtsError::http(format!(
                "HTTP {status} for chunk {idx} of {total}"
            )));
        }

        response
            .bytes()
            .await
            .map_err(|e| TtsError::network(format!("Failed to read response: {e}")))
    }
}

#[async_trait]
impl SpeechSynthesizer for GoogleTtsService {
    async fn synthesize(&self, text: &str, lang: &str) -> Result<SpeechAudio, TtsError> {
        let chunks = chunk_text(text, MAX_CHUNK_CHARS);
        if chunks.is_empty() {
            return Err(TtsError::empty_text());
        }

        let total = chunks.len();
        let mut audio = BytesMut::new();
        for (idx, chunk) in chunks.iter().enumerate() {
            let bytes = self.fetch_chunk(chunk, lang, idx, total).await?;
            audio.extend_from_slice(&bytes);
        }

        Ok(SpeechAudio {
            bytes: audio.freeze(),
            content_type: MP3_CONTENT_TYPE,
        })
    }

    fn name(&self) -> &str {
        "google-translate"
    }
}

fn sentence_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"[^.!?;:,…。！？、，\n]+[.!?;:,…。！？、，\n]*|[.!?;:,…。！？、，\n]+")
            .expect("sentence pattern is valid")
    })
}

/// Split `text` into chunks of at most `max_chars` characters.
///
/// Prefers punctuation boundaries, then whitespace; words longer than the
/// limit are cut on character boundaries. Chunks without any alphanumeric
/// character are dropped since there is nothing to pronounce.
pub fn chunk_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut atoms: Vec<String> = Vec::new();

    for token in sentence_regex().find_iter(text) {
        let token = token.as_str().trim();
        if token.is_empty() {
            continue;
        }
        if token.chars().count() <= max_chars {
            atoms.push(token.to_string());
            continue;
        }
        for word in token.split_whitespace() {
            if word.chars().count() <= max_chars {
                atoms.push(word.to_string());
            } else {
                let chars: Vec<char> = word.chars().collect();
                atoms.extend(chars.chunks(max_chars).map(|c| c.iter().collect::<String>()));
            }
        }
    }

    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;
    for atom in atoms {
        let atom_len = atom.chars().count();
        if current.is_empty() {
            current = atom;
            current_len = atom_len;
        } else if current_len + 1 + atom_len <= max_chars {
            current.push(' ');
            current.push_str(&atom);
            current_len += 1 + atom_len;
        } else {
            chunks.push(std::mem::replace(&mut current, atom));
            current_len = atom_len;
        }
    }
    if !current.is_empty() {
        chunks.push(current);
    }

    chunks.retain(|c| c.chars().any(char::is_alphanumeric));
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn alphanumerics(s: &str) -> String {
        s.chars().filter(|c| c.is_alphanumeric()).collect()
    }

    #[test]
    fn test_short_text_single_chunk() {
        assert_eq!(chunk_text("Hello there.", 100), vec!["Hello there."]);
    }

    #[test]
    fn test_sentences_packed_under_limit() {
        let text = "First sentence here. Second one! Third?";
        assert_eq!(chunk_text(text, 25), vec!["First sentence here.", "Second one! Third?"]);
    }

    #[test]
    fn test_long_sentence_split_on_words() {
        let text = "alpha beta gamma delta epsilon";
        let chunks = chunk_text(text, 12);
        assert_eq!(chunks, vec!["alpha beta", "gamma delta", "epsilon"]);
    }

    #[test]
    fn test_overlong_word_hard_cut() {
        let word = "a".repeat(250);
        let chunks = chunk_text(&word, 100);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].chars().count(), 100);
        assert_eq!(chunks[2].chars().count(), 50);
    }

    #[test]
    fn test_punctuation_only_dropped() {
        assert!(chunk_text("... !!! ,,,", 100).is_empty());
        assert!(chunk_text("   ", 100).is_empty());
    }

    #[test]
    fn test_multibyte_counts_chars() {
        let text = "é".repeat(150);
        let chunks = chunk_text(&text, 100);
        assert_eq!(chunks.len(), 2);
        assert!(chunks.iter().all(|c| c.chars().count() <= 100));
    }

    #[test]
    fn test_service_url() {
        let service = GoogleTtsService::new("https://translate.google.com/").unwrap();
        assert_eq!(service.url, "https://translate.google.com/translate_tts");
    }

    proptest! {
        #[test]
        fn prop_chunks_within_limit_and_lossless(text in "[a-zA-Z0-9 .,!?\n]{0,400}") {
            let chunks = chunk_text(&text, MAX_CHUNK_CHARS);
            for chunk in &chunks {
                prop_assert!(!chunk.is_empty());
                prop_assert!(chunk.chars().count() <= MAX_CHUNK_CHARS);
            }
            prop_assert_eq!(alphanumerics(&chunks.concat()), alphanumerics(&text));
        }
    }
}
