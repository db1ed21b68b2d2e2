//! Process configuration read from the environment

use crate::audio::FailurePolicy;
use crate::chat::SynthesisMode;
use crate::llm::{DEFAULT_MODEL, DEFAULT_OLLAMA_URL};
use crate::tts::DEFAULT_TTS_URL;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var}: {message}")]
    Invalid { var: &'static str, message: String },
}

impl ConfigError {
    fn invalid(var: &'static str, message: impl Into<String>) -> Self {
        Self::Invalid {
            var,
            message: message.into(),
        }
    }
}

/// Runtime configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind: IpAddr,
    pub port: u16,
    /// Ollama server base URL
    pub ollama_url: String,
    pub model: String,
    /// Base URL of the translate TTS endpoint
    pub tts_url: String,
    /// Language code passed to speech synthesis
    pub tts_lang: String,
    pub audio_failure: FailurePolicy,
    pub synthesis: SynthesisMode,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 8000,
            ollama_url: DEFAULT_OLLAMA_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            tts_url: DEFAULT_TTS_URL.to_string(),
            tts_lang: "en".to_string(),
            audio_failure: FailurePolicy::default(),
            synthesis: SynthesisMode::default(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source; unset or empty means default
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(bind) = get("PARROT_BIND") {
            config.bind = bind
                .trim()
                .parse()
                .map_err(|e| ConfigError::invalid("PARROT_BIND", format!("{e}")))?;
        }
        if let Some(port) = get("PARROT_PORT") {
            config.port = port
                .trim()
                .parse()
                .map_err(|e| ConfigError::invalid("PARROT_PORT", format!("{e}")))?;
        }
        if let Some(url) = get("OLLAMA_HOST") {
            config.ollama_url = normalize_url(&url);
        }
        if let Some(model) = get("PARROT_MODEL") {
            config.model = model.trim().to_string();
        }
        if let Some(url) = get("PARROT_TTS_URL") {
            config.tts_url = normalize_url(&url);
        }
        if let Some(lang) = get("PARROT_TTS_LANG") {
            config.tts_lang = lang.trim().to_string();
        }
        if let Some(policy) = get("PARROT_AUDIO_FAILURE") {
            config.audio_failure = policy
                .parse()
                .map_err(|e: String| ConfigError::invalid("PARROT_AUDIO_FAILURE", e))?;
        }
        if let Some(mode) = get("PARROT_SYNTHESIS") {
            config.synthesis = mode
                .parse()
                .map_err(|e: String| ConfigError::invalid("PARROT_SYNTHESIS", e))?;
        }

        Ok(config)
    }

    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port)
    }
}

/// Accept bare `host:port` the way the ollama CLI does
fn normalize_url(url: &str) -> String {
    let url = url.trim().trim_end_matches('/');
    if url.starts_with("http://") || url.starts_with("https://") {
        url.to_string()
    } else {
        format!("http://{url}")
    }
}
