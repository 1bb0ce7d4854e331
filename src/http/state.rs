use crate::session::{MeetingSession, SessionServices};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Active sessions (room_id → session)
    pub sessions: Arc<RwLock<HashMap<String, Arc<MeetingSession>>>>,

    /// Collaborators handed to every new session
    pub services: SessionServices,
}

impl AppState {
    pub fn new(services: SessionServices) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            services,
        }
    }
}
