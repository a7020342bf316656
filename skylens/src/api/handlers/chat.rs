//! Chat and session endpoints.

use crate::AppState;
use crate::chat::{ChatRequest, ChatResponse};
use crate::errors::Result;
use axum::{Json, extract::State};
use serde_json::json;

/// POST /api/chat
pub async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>> {
    let response = state.chat.chat(request).await?;
    Ok(Json(response))
}

/// POST /api/clear
///
/// Mints a fresh session id. Snapshot cache entries are untouched; they only
/// expire through the freshness window.
pub async fn clear(State(state): State<AppState>) -> Json<serde_json::Value> {
    let session_id = state.chat.clear_session();
    Json(json!({
        "message": "Session cleared successfully",
        "session_id": session_id
    }))
}
