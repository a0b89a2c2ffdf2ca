//! Session HTTP handlers.
//!
//! Endpoints:
//! - POST   /api/v1/sessions            - Allocate a fresh session id
//! - GET    /api/v1/sessions/{id}       - Snapshot of a session
//! - DELETE /api/v1/sessions/{id}       - Drop a session
//! - POST   /api/v1/sessions/{id}/clear - Clear history, keep language and preferences

use std::time::Instant;

use axum::Json;
use axum::extract::{Path, State};
use serde_json::{Value, json};
use uuid::Uuid;

use sherpa_core::session::SessionSnapshot;
use sherpa_types::error::SessionError;
use sherpa_types::tour::SessionId;

use crate::http::error::AppError;
use crate::http::response::ApiResponse;
use crate::state::AppState;

fn session_id(raw: String) -> Result<SessionId, AppError> {
    if raw.trim().is_empty() {
        return Err(AppError::Validation("session id must not be empty".to_string()));
    }
    Ok(SessionId(raw))
}

/// POST /api/v1/sessions - Create a new, empty session.
pub async fn create_session(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Value>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let id = SessionId(Uuid::now_v7().to_string());
    state.guide.sessions().get_or_create(&id);
    tracing::info!(session_id = %id, "Session created");

    let elapsed = start.elapsed().as_millis() as u64;
    let resp = ApiResponse::success(json!({ "session_id": id }), request_id, elapsed)
        .with_link("self", &format!("/api/v1/sessions/{id}"));

    Ok(Json(resp))
}

/// GET /api/v1/sessions/{id} - Snapshot of a live session.
pub async fn get_session(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<ApiResponse<SessionSnapshot>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let id = session_id(raw_id)?;
    let snapshot = state
        .guide
        .sessions()
        .snapshot(&id)
        .await
        .ok_or_else(|| SessionError::NotFound(id.to_string()))?;

    let elapsed = start.elapsed().as_millis() as u64;
    let resp = ApiResponse::success(snapshot, request_id, elapsed)
        .with_link("self", &format!("/api/v1/sessions/{id}"));

    Ok(Json(resp))
}

/// DELETE /api/v1/sessions/{id} - Drop a session.
pub async fn delete_session(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<ApiResponse<Value>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let id = session_id(raw_id)?;
    if !state.guide.sessions().remove(&id) {
        return Err(SessionError::NotFound(id.to_string()).into());
    }

    let elapsed = start.elapsed().as_millis() as u64;
    Ok(Json(ApiResponse::success(
        json!({ "deleted": true }),
        request_id,
        elapsed,
    )))
}

/// POST /api/v1/sessions/{id}/clear - Clear the conversation history.
pub async fn clear_session(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<ApiResponse<Value>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let id = session_id(raw_id)?;
    let handle = state
        .guide
        .sessions()
        .get(&id)
        .ok_or_else(|| SessionError::NotFound(id.to_string()))?;
    handle.lock().await.clear_history();

    let elapsed = start.elapsed().as_millis() as u64;
    Ok(Json(ApiResponse::success(
        json!({ "cleared": true, "session_id": id }),
        request_id,
        elapsed,
    )))
}
