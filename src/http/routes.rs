use super::handlers;
use super::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

/// Create the HTTP router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Session lifecycle
        .route("/sessions/start", post(handlers::start_session))
        .route(
            "/sessions/:room_id/participants",
            post(handlers::register_participant),
        )
        .route("/sessions/:room_id/chunks", post(handlers::ingest_chunk))
        .route(
            "/sessions/:room_id/participants/:participant_id/finalize",
            post(handlers::finalize_participant),
        )
        .route("/sessions/:room_id/end", post(handlers::end_session))
        // Queries
        .route(
            "/sessions/:room_id/status",
            get(handlers::get_session_status),
        )
        // Add tracing middleware for request logging
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
