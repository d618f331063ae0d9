//! HTTP API for the drill session.
//!
//! Runs on port 2004 by default. CORS-permissive so a browser front end on
//! another localhost port can drive it.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::cors::CorsLayer;
use tracing::debug;

use spellcast_core::types::{SessionView, VoiceAvailability};

use crate::trainer::{CommandResult, Trainer};
use crate::voice::{ElevenLabsClient, SpeechError};

#[derive(Clone)]
struct ApiState {
    trainer: Arc<Trainer>,
    cloud: ElevenLabsClient,
}

/// Build the axum router around a shared [`Trainer`]. `cloud` backs the
/// `/tts` proxy.
pub fn router(trainer: Arc<Trainer>, cloud: ElevenLabsClient) -> Router {
    Router::new()
        .route("/session", get(session))
        .route("/draft", post(draft))
        .route("/submit", post(submit))
        .route("/advance", post(advance))
        .route("/reset", post(reset))
        .route("/replay", post(replay))
        .route("/tts", get(tts_status).post(tts))
        .layer(CorsLayer::permissive())
        .with_state(ApiState { trainer, cloud })
}

#[derive(serde::Deserialize)]
struct DraftRequest {
    text: String,
}

#[derive(serde::Deserialize)]
struct SubmitRequest {
    #[serde(default)]
    answer: Option<String>,
}

#[derive(serde::Deserialize)]
struct TtsRequest {
    #[serde(default)]
    text: String,
    #[serde(default, rename = "voiceId")]
    voice_id: Option<String>,
}

async fn session(State(state): State<ApiState>) -> Json<SessionView> {
    Json(state.trainer.view().await)
}

async fn draft(State(state): State<ApiState>, Json(req): Json<DraftRequest>) -> Json<SessionView> {
    Json(state.trainer.update_draft(&req.text).await)
}

/// Checks the stored draft, or `answer` when the body carries one.
async fn submit(
    State(state): State<ApiState>,
    body: Bytes,
) -> Result<Json<CommandResult>, (StatusCode, String)> {
    if body.is_empty() {
        return Ok(Json(state.trainer.submit().await));
    }
    let req: SubmitRequest = serde_json::from_slice(&body)
        .map_err(|e| (StatusCode::BAD_REQUEST, format!("invalid body: {e}")))?;
    let result = match req.answer {
        Some(answer) => state.trainer.submit_answer(&answer).await,
        None => state.trainer.submit().await,
    };
    Ok(Json(result))
}

async fn advance(State(state): State<ApiState>) -> Json<CommandResult> {
    Json(state.trainer.advance_after_reveal().await)
}

async fn reset(State(state): State<ApiState>) -> Json<CommandResult> {
    Json(state.trainer.reset().await)
}

async fn replay(State(state): State<ApiState>) -> Json<CommandResult> {
    Json(state.trainer.replay_current_word().await)
}

async fn tts_status(State(state): State<ApiState>) -> Json<VoiceAvailability> {
    Json(state.trainer.voice_availability())
}

/// Proxy a synthesis request to ElevenLabs and return the mp3.
async fn tts(State(state): State<ApiState>, Json(req): Json<TtsRequest>) -> Response {
    if !state.cloud.is_configured() {
        return (StatusCode::BAD_REQUEST, "TTS not configured - no API key").into_response();
    }

    debug!("tts proxy: {} chars", req.text.len());
    match state.cloud.synthesize(&req.text, req.voice_id.as_deref()).await {
        Ok(audio) => (
            [
                (header::CONTENT_TYPE, "audio/mpeg"),
                (header::CACHE_CONTROL, "no-store"),
            ],
            audio,
        )
            .into_response(),
        Err(SpeechError::EmptyText) => {
            (StatusCode::BAD_REQUEST, "Missing or invalid text").into_response()
        }
        Err(SpeechError::Service { status, body }) => (
            StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY),
            format!("ElevenLabs API error: {status} {body}"),
        )
            .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("TTS failure: {e}"),
        )
            .into_response(),
    }
}
