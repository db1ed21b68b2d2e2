//! HTTP request handlers

use super::assets::{get_index_html, serve_static};
use super::types::{
    AskForm, AskResponse, AudioStatusResponse, ErrorResponse, HistoryResponse, SuccessResponse,
};
use super::AppState;
use crate::audio::AudioError;
use crate::chat::ChatError;
use crate::tts::WAV_CONTENT_TYPE;
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Chat page
        .route("/", get(serve_index))
        .route("/static/*path", get(serve_static))
        // Turn
        .route("/ask", post(ask))
        // Audio handshake
        .route("/audio_status", get(audio_status))
        .route("/speak", get(speak))
        // Conversation window
        .route("/api/history", get(get_history))
        .route("/api/reset", post(reset_history))
        // Version
        .route("/version", get(get_version))
        .with_state(state)
}

// ============================================================
// Page
// ============================================================

async fn serve_index() -> impl IntoResponse {
    match get_index_html() {
        Some(content) => Html(content).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Html("<h1>404 - page not found</h1>".to_string()),
        )
            .into_response(),
    }
}

// ============================================================
// Turn
// ============================================================

async fn ask(
    State(state): State<AppState>,
    Form(form): Form<AskForm>,
) -> Result<Json<AskResponse>, AppError> {
    let answer = state.chat.ask(&form.user_input).await?;
    Ok(Json(AskResponse { answer }))
}

// ============================================================
// Audio
// ============================================================

async fn audio_status(State(state): State<AppState>) -> Json<AudioStatusResponse> {
    Json(state.chat.audio().status().into())
}

async fn speak(State(state): State<AppState>) -> Result<Response, AppError> {
    let payload = state.chat.audio().fetch_payload()?;
    Ok((
        [
            (header::CONTENT_TYPE, WAV_CONTENT_TYPE),
            (header::CACHE_CONTROL, "no-store"),
        ],
        payload,
    )
        .into_response())
}

// ============================================================
// Conversation window
// ============================================================

async fn get_history(State(state): State<AppState>) -> Json<HistoryResponse> {
    Json(HistoryResponse {
        messages: state.chat.history().await,
        model: state.chat.model_id().to_string(),
    })
}

async fn reset_history(State(state): State<AppState>) -> Json<SuccessResponse> {
    state.chat.reset().await;
    Json(SuccessResponse { success: true })
}

// ============================================================
// Version
// ============================================================

async fn get_version() -> &'static str {
    concat!("parrot ", env!("CARGO_PKG_VERSION"))
}

// ============================================================
// Error Handling
// ============================================================

enum AppError {
    BadRequest(String),
    /// Audio is not available; plain text body like any static miss
    NoAudio,
    BadGateway(String),
    Internal(String),
}

impl From<ChatError> for AppError {
    fn from(e: ChatError) -> Self {
        match e {
            ChatError::EmptyMessage => AppError::BadRequest(e.to_string()),
            ChatError::Model(inner) => AppError::BadGateway(inner.message),
            ChatError::Interrupted(_) => AppError::Internal(e.to_string()),
        }
    }
}

impl From<AudioError> for AppError {
    fn from(e: AudioError) -> Self {
        match e {
            AudioError::NotFound => AppError::NoAudio,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NoAudio => {
                return (StatusCode::NOT_FOUND, AudioError::NotFound.to_string()).into_response();
            }
            AppError::BadGateway(msg) => (StatusCode::BAD_GATEWAY, msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(ErrorResponse::new(message));
        (status, body).into_response()
    }
}
