//! Parrot - spoken chat relay
//!
//! Serves a small chat page, relays each question to a local Ollama model
//! and turns the answer into speech the page can poll for and play.

mod api;
mod audio;
mod chat;
mod config;
mod conversation;
mod llm;
mod tts;

use api::{create_router, AppState};
use audio::AudioSlot;
use axum::http::Request;
use chat::ChatRuntime;
use config::AppConfig;
use llm::{LlmService, LoggingService, OllamaService};
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use tts::{GoogleTtsService, LoggingSynthesizer, SpeechSynthesizer, TranscodingSynthesizer};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "parrot=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    let config = AppConfig::from_env()?;
    tracing::info!(
        model = %config.model,
        ollama = %config.ollama_url,
        tts = %config.tts_url,
        lang = %config.tts_lang,
        audio_failure = %config.audio_failure,
        synthesis = %config.synthesis,
        "Configuration loaded"
    );

    // Model and speech providers
    let ollama = OllamaService::new(&config.ollama_url, config.model.clone())?;
    let llm: Arc<dyn LlmService> = Arc::new(LoggingService::new(Arc::new(ollama)));

    let google = GoogleTtsService::new(&config.tts_url)?;
    let tts: Arc<dyn SpeechSynthesizer> = Arc::new(LoggingSynthesizer::new(Arc::new(
        TranscodingSynthesizer::new(google),
    )));

    let audio = Arc::new(AudioSlot::new(config.audio_failure));
    let chat = ChatRuntime::new(llm, tts, audio)
        .with_lang(config.tts_lang.clone())
        .with_mode(config.synthesis);

    let state = AppState::new(chat);

    // Create router
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let compression = CompressionLayer::new()
        .gzip(true)
        .br(true)
        .deflate(true)
        .zstd(true);

    let trace = TraceLayer::new_for_http().make_span_with(|request: &Request<_>| {
        tracing::info_span!(
            "request",
            id = %uuid::Uuid::new_v4(),
            method = %request.method(),
            uri = %request.uri(),
        )
    });

    let app = create_router(state)
        .layer(cors)
        .layer(compression)
        .layer(trace);

    // Start server
    let addr = config.listen_addr();
    tracing::info!("Parrot server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
