//! Ollama chat API provider

use super::types::{LlmMessage, LlmRequest, LlmResponse, Usage};
use super::{LlmError, LlmService};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";
pub const DEFAULT_MODEL: &str = "smollm2:360m";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

/// Ollama `/api/chat` client
pub struct OllamaService {
    client: Client,
    url: String,
    model: String,
}

impl OllamaService {
    pub fn new(base_url: &str, model: impl Into<String>) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| LlmError::unknown(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            url: format!("{}/api/chat", base_url.trim_end_matches('/')),
            model: model.into(),
        })
    }

    fn translate_request(&self, request: &LlmRequest) -> OllamaRequest {
        OllamaRequest {
            model: self.model.clone(),
            messages: request.messages.iter().map(translate_message).collect(),
            stream: false,
        }
    }
}

fn translate_message(msg: &LlmMessage) -> OllamaMessage {
    OllamaMessage {
        role: msg.role.as_str().to_string(),
        content: msg.content.clone(),
    }
}

fn normalize_response(resp: OllamaResponse) -> Result<LlmResponse, LlmError> {
    let text = resp
        .message
        .map(|m| m.content)
        .ok_or_else(|| LlmError::bad_reply("No message in response"))?;

    if text.trim().is_empty() {
        return Err(LlmError::bad_reply("Model returned an empty reply"));
    }

    Ok(LlmResponse {
        text,
        usage: Usage {
            input_tokens: resp.prompt_eval_count.unwrap_or(0),
            output_tokens: resp.eval_count.unwrap_or(0),
        },
    })
}

fn classify_error(status: StatusCode, body: &str) -> LlmError {
    let message = serde_json::from_str::<OllamaErrorResponse>(body)
        .map_or_else(|_| body.to_string(), |e| e.error);

    match status.as_u16() {
        404 => LlmError::model_not_found(format!("Model not found: {message}")),
        400..=499 => LlmError::rejected(format!("Ollama rejected request ({status}): {message}")),
        500..=599 => LlmError::backend(format!("Ollama error ({status}): {message}")),
        _ => LlmError::unknown(format!("HTTP {status}: {message}")),
    }
}

#[async_trait]
impl LlmService for OllamaService {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        let ollama_request = self.translate_request(request);

        let response = self
            .client
            .post(&self.url)
            .json(&ollama_request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::unreachable(format!("Request timeout: {e}"))
                } else if e.is_connect() {
                    LlmError::unreachable(format!("Connection failed: {e}"))
                } else {
                    LlmError::unknown(format!("Request failed: {e}"))
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| LlmError::unreachable(format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            return Err(classify_error(status, &body));
        }

        let ollama_response: OllamaResponse = serde_json::from_str(&body).map_err(|e| {
            LlmError::bad_reply(format!("Failed to parse response: {e}: {body}"))
        })?;

        normalize_response(ollama_response)
    }

    fn model_id(&self) -> &str {
        &self.model
    }
}

// Ollama API types

#[derive(Debug, Serialize)]
struct OllamaRequest {
    model: String,
    messages: Vec<OllamaMessage>,
    stream: bool,
}

#[derive(Debug, Serialize, Deserialize)]
struct OllamaMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct OllamaResponse {
    #[serde(default)]
    message: Option<OllamaMessage>,
    #[serde(default)]
    prompt_eval_count: Option<u64>,
    #[serde(default)]
    eval_count: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct OllamaErrorResponse {
    error: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::LlmErrorKind;
    use serde_json::json;

    fn service() -> OllamaService {
        OllamaService::new("http://localhost:11434/", DEFAULT_MODEL).unwrap()
    }

    #[test]
    fn test_url_trims_trailing_slash() {
        assert_eq!(service().url, "http://localhost:11434/api/chat");
    }

    #[test]
    fn test_translate_request() {
        let request = LlmRequest {
            messages: vec![LlmMessage::user("hi"), LlmMessage::assistant("hello")],
        };
        let wire = serde_json::to_value(service().translate_request(&request)).unwrap();

        assert_eq!(
            wire,
            json!({
                "model": "smollm2:360m",
                "messages": [
                    {"role": "user", "content": "hi"},
                    {"role": "assistant", "content": "hello"}
                ],
                "stream": false
            })
        );
    }

    #[test]
    fn test_normalize_response() {
        let resp: OllamaResponse = serde_json::from_value(json!({
            "model": "smollm2:360m",
            "created_at": "2024-01-01T00:00:00Z",
            "message": {"role": "assistant", "content": "hello"},
            "done": true,
            "prompt_eval_count": 12,
            "eval_count": 3
        }))
        .unwrap();

        let normalized = normalize_response(resp).unwrap();
        assert_eq!(normalized.text, "hello");
        assert_eq!(normalized.usage.input_tokens, 12);
        assert_eq!(normalized.usage.output_tokens, 3);
    }

    #[test]
    fn test_empty_reply_rejected() {
        let resp: OllamaResponse = serde_json::from_value(json!({
            "message": {"role": "assistant", "content": "   "},
            "done": true
        }))
        .unwrap();
        assert_eq!(normalize_response(resp).unwrap_err().kind, LlmErrorKind::BadReply);
    }

    #[test]
    fn test_missing_message_rejected() {
        let resp: OllamaResponse = serde_json::from_value(json!({"done": true})).unwrap();
        assert!(normalize_response(resp).is_err());
    }

    #[test]
    fn test_classify_errors() {
        let err = classify_error(
            StatusCode::NOT_FOUND,
            r#"{"error":"model 'smollm2:360m' not found"}"#,
        );
        assert_eq!(err.kind, LlmErrorKind::ModelNotFound);
        assert!(err.message.contains("not found"));

        let err = classify_error(StatusCode::INTERNAL_SERVER_ERROR, "oops");
        assert_eq!(err.kind, LlmErrorKind::Backend);
        assert!(err.kind.is_transient());
        assert!(err.message.contains("oops"));

        let err = classify_error(StatusCode::BAD_REQUEST, r#"{"error":"bad"}"#);
        assert_eq!(err.kind, LlmErrorKind::Rejected);
        assert!(!err.kind.is_transient());
        assert!(err.message.ends_with("bad"));
    }
}
