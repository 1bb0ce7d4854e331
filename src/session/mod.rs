//! Meeting session management
//!
//! This module provides the `MeetingSession` abstraction that manages:
//! - Per-participant audio fragment buffering and lifecycle flags
//! - Lazy establishment of the session clock
//! - Per-participant transcription at session end (dispatched concurrently)
//! - Summarization of the joined transcript with fallback extraction
//! - Assembly and persistence of the final meeting aggregate

mod session;
mod summary;

pub use session::{MeetingSession, ParticipantRecord, SessionContext, SessionServices, SessionStats};
pub use summary::{
    fallback_summary, placeholder_summary, MeetingSummary, TranscriptEntry, EMPTY_SESSION_KEY_POINT,
    EMPTY_SESSION_SUMMARY,
};
