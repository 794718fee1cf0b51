//! HTTP Handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use agent_core::{Termination, ToolSpec, Turn};

use crate::state::AppState;

// ============================================================================
// Request / Response Types
// ============================================================================

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub backend: String,
    pub backend_healthy: bool,
    pub tools: usize,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub message: String,
    pub session_id: String,
    pub termination: Termination,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub session_id: String,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub session_id: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub turns: Vec<Turn>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn error(status: StatusCode, code: &str, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
            code: code.into(),
        }),
    )
}

fn session_not_found(id: &str) -> ApiError {
    error(StatusCode::NOT_FOUND, "SESSION_NOT_FOUND", format!("No session with id {id}"))
}

// ============================================================================
// Handlers
// ============================================================================

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let backend = state.agent.backend();
    let backend_healthy = backend.health_check().await.unwrap_or(false);

    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        backend: backend.name().to_string(),
        backend_healthy,
        tools: state.agent.tools().len(),
    })
}

/// Tool manifest
pub async fn list_tools(State(state): State<AppState>) -> Json<Vec<ToolSpec>> {
    Json(state.agent.tools().list_specs())
}

/// Start an empty session
pub async fn create_session(State(state): State<AppState>) -> (StatusCode, Json<SessionResponse>) {
    let (id, _) = state.create_session().await;
    (
        StatusCode::CREATED,
        Json(SessionResponse {
            session_id: id.to_string(),
        }),
    )
}

/// Main chat endpoint
pub async fn chat_handler(
    State(state): State<AppState>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    if payload.message.trim().is_empty() {
        return Err(error(StatusCode::BAD_REQUEST, "EMPTY_MESSAGE", "Message must not be empty"));
    }

    let (session_id, session) = state.session_or_create(payload.session_id.as_deref()).await;

    // Held for the whole run: a second message to the same session waits here
    let outcome = session.lock().await.run_detailed(&payload.message).await;

    if let Termination::Failed(kind) = outcome.termination {
        tracing::error!(session = %session_id, %kind, "Run failed");
    }

    Ok(Json(ChatResponse {
        message: outcome.text,
        session_id: session_id.to_string(),
        termination: outcome.termination,
    }))
}

/// Read-only transcript of a session
pub async fn session_history(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<HistoryResponse>, ApiError> {
    let session = state.session(&id).await.ok_or_else(|| session_not_found(&id))?;
    let session = session.lock().await;

    Ok(Json(HistoryResponse {
        session_id: session.id().to_string(),
        title: session.title(),
        created_at: session.created_at(),
        updated_at: session.updated_at(),
        turns: session.history().turns().to_vec(),
    }))
}

/// "Clear chat": drop the session's history
pub async fn reset_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let session = state.session(&id).await.ok_or_else(|| session_not_found(&id))?;
    session.lock().await.reset();
    Ok(StatusCode::NO_CONTENT)
}

/// End a session and free its history
pub async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    if state.remove_session(&id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(session_not_found(&id))
    }
}
