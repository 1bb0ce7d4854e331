use super::state::AppState;
use crate::session::{MeetingSession, MeetingSummary, SessionContext, TranscriptEntry};
use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json},
};
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct StartSessionRequest {
    /// Optional room ID (if not provided, generate UUID)
    pub room_id: Option<String>,

    /// Optional explicit session start; defaults to now
    pub started_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct StartSessionResponse {
    pub room_id: String,
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct RegisterParticipantRequest {
    pub participant_id: String,
    pub name: Option<String>,

    /// Timestamp of the participant joining; defaults to now
    pub offset: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct IngestChunkRequest {
    pub participant_id: String,

    /// Base64-encoded audio bytes
    pub audio: String,

    /// Capture timestamp of this chunk; defaults to now
    pub timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct AcceptedResponse {
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct EndSessionResponse {
    pub room_id: String,
    pub status: String,
    #[serde(flatten)]
    pub summary: MeetingSummary,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /sessions/start
/// Create a new meeting session
pub async fn start_session(
    State(state): State<AppState>,
    Json(req): Json<StartSessionRequest>,
) -> impl IntoResponse {
    let room_id = req
        .room_id
        .unwrap_or_else(|| format!("room-{}", uuid::Uuid::new_v4()));

    info!("Starting session for room: {}", room_id);

    {
        let sessions = state.sessions.read().await;
        if sessions.contains_key(&room_id) {
            return (
                StatusCode::CONFLICT,
                Json(ErrorResponse {
                    error: format!("Room {} already has an active session", room_id),
                }),
            )
                .into_response();
        }
    }

    let session = Arc::new(MeetingSession::new(room_id.clone(), state.services.clone()));
    session.init(req.started_at.unwrap_or_else(Utc::now)).await;

    {
        let mut sessions = state.sessions.write().await;
        sessions.insert(room_id.clone(), session);
    }

    (
        StatusCode::OK,
        Json(StartSessionResponse {
            room_id,
            status: "recording".to_string(),
        }),
    )
        .into_response()
}

/// POST /sessions/:room_id/participants
/// Register (or re-register) a participant
pub async fn register_participant(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
    Json(req): Json<RegisterParticipantRequest>,
) -> impl IntoResponse {
    let session = match find_session(&state, &room_id).await {
        Ok(s) => s,
        Err(response) => return response,
    };

    session
        .register_participant(
            &req.participant_id,
            req.name,
            req.offset.unwrap_or_else(Utc::now),
        )
        .await;

    (
        StatusCode::OK,
        Json(AcceptedResponse {
            status: "registered".to_string(),
        }),
    )
        .into_response()
}

/// POST /sessions/:room_id/chunks
/// Ingest one audio chunk for a participant
pub async fn ingest_chunk(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
    Json(req): Json<IngestChunkRequest>,
) -> impl IntoResponse {
    let session = match find_session(&state, &room_id).await {
        Ok(s) => s,
        Err(response) => return response,
    };

    let audio = match base64::engine::general_purpose::STANDARD.decode(&req.audio) {
        Ok(bytes) => bytes,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: format!("Audio payload is not valid base64: {}", e),
                }),
            )
                .into_response();
        }
    };

    session
        .ingest_chunk(
            &req.participant_id,
            audio,
            req.timestamp.unwrap_or_else(Utc::now),
        )
        .await;

    (
        StatusCode::OK,
        Json(AcceptedResponse {
            status: "buffered".to_string(),
        }),
    )
        .into_response()
}

/// POST /sessions/:room_id/participants/:participant_id/finalize
/// Finalize one participant and return their transcript entry
pub async fn finalize_participant(
    State(state): State<AppState>,
    Path((room_id, participant_id)): Path<(String, String)>,
) -> impl IntoResponse {
    let session = match find_session(&state, &room_id).await {
        Ok(s) => s,
        Err(response) => return response,
    };

    let entry: TranscriptEntry = session.finalize_participant(&participant_id, Utc::now()).await;

    (StatusCode::OK, Json(entry)).into_response()
}

/// POST /sessions/:room_id/end
/// End the session: transcribe, summarize, persist, return the aggregate
pub async fn end_session(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
    headers: HeaderMap,
) -> impl IntoResponse {
    info!("Ending session for room: {}", room_id);

    // Remove the session first so new chunks for this room are rejected
    let session = {
        let mut sessions = state.sessions.write().await;
        sessions.remove(&room_id)
    };

    let session = match session {
        Some(s) => s,
        None => {
            error!("Room {} not found", room_id);
            return (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse {
                    error: format!("Room {} not found", room_id),
                }),
            )
                .into_response();
        }
    };

    let context = context_from_headers(&headers);
    let summary = session.end_session(&context).await;

    (
        StatusCode::OK,
        Json(EndSessionResponse {
            room_id,
            status: "ended".to_string(),
            summary,
        }),
    )
        .into_response()
}

/// GET /sessions/:room_id/status
/// Query counters for an active session
pub async fn get_session_status(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
) -> impl IntoResponse {
    let session = match find_session(&state, &room_id).await {
        Ok(s) => s,
        Err(response) => return response,
    };

    (StatusCode::OK, Json(session.stats().await)).into_response()
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

// ============================================================================
// Helpers
// ============================================================================

async fn find_session(
    state: &AppState,
    room_id: &str,
) -> Result<Arc<MeetingSession>, axum::response::Response> {
    let sessions = state.sessions.read().await;

    match sessions.get(room_id) {
        Some(session) => Ok(Arc::clone(session)),
        None => Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("Room {} not found", room_id),
            }),
        )
            .into_response()),
    }
}

/// Attribution context from the caller's headers; absent headers mean an
/// anonymous, group-less session
fn context_from_headers(headers: &HeaderMap) -> SessionContext {
    let header_value = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(String::from)
    };

    SessionContext {
        group_id: header_value("x-group-id"),
        caller_id: header_value("x-caller-id"),
    }
}
