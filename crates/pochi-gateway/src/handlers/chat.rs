//! Chat handlers for the web and wearable clients.
//!
//! The body is read as raw bytes so the key check runs before parsing and any
//! parse failure (syntax or shape) becomes a plain 400.

use crate::error::ApiError;
use crate::AppState;
use axum::{body::Bytes, extract::State, Json};
use pochi_core::{ChatPipeline, ChatResponse, IntoHistory, LegacyChatRequest, WebChatRequest};
use serde::de::DeserializeOwned;
use std::sync::Arc;

/// POST /api/chat
pub async fn web_chat(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<ChatResponse>, ApiError> {
    let pipeline = require_pipeline(&state)?;
    let req: WebChatRequest = parse_body(&body)?;
    tracing::info!("[Web] Received chat with {} messages", req.messages.len());
    respond(pipeline, req).await
}

/// POST /api/v1/chat (legacy wearable shape; `session` is ignored)
pub async fn wear_chat(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<ChatResponse>, ApiError> {
    let pipeline = require_pipeline(&state)?;
    let req: LegacyChatRequest = parse_body(&body)?;
    tracing::info!("[Wear] Received message ({} chars)", req.message.chars().count());
    tracing::debug!("[Wear] message: {}", req.message);
    respond(pipeline, req).await
}

fn require_pipeline(state: &AppState) -> Result<&ChatPipeline, ApiError> {
    state.pipeline.as_ref().ok_or_else(|| {
        tracing::warn!("chat request rejected: no API key configured");
        ApiError::MissingApiKey
    })
}

fn parse_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, ApiError> {
    serde_json::from_slice(body).map_err(|e| {
        tracing::debug!("bad request body: {}", e);
        ApiError::BadRequest
    })
}

async fn respond<R: IntoHistory>(
    pipeline: &ChatPipeline,
    req: R,
) -> Result<Json<ChatResponse>, ApiError> {
    let response = pipeline.complete(req).await.map_err(|e| {
        tracing::error!("Error calling LLM: {}", e);
        ApiError::from(e)
    })?;
    Ok(Json(ChatResponse { response }))
}
