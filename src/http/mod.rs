//! HTTP API server for session control
//!
//! This module provides a REST API for driving meeting sessions:
//! - POST /sessions/start - Create a new session
//! - POST /sessions/:room_id/participants - Register a participant
//! - POST /sessions/:room_id/chunks - Ingest an audio chunk
//! - POST /sessions/:room_id/participants/:participant_id/finalize - Finalize one participant
//! - POST /sessions/:room_id/end - End the session and return the summary
//! - GET /sessions/:room_id/status - Query session counters
//! - GET /health - Health check

mod handlers;
mod routes;
mod state;

pub use routes::create_router;
pub use state::AppState;
