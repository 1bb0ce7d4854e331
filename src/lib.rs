pub mod config;
pub mod directory;
pub mod http;
pub mod persist;
pub mod session;
pub mod summarization;
pub mod transcription;

pub use config::Config;
pub use directory::{resolve_display_names, HttpMemberDirectory, MemberDirectory, MemberRecord};
pub use http::{create_router, AppState};
pub use persist::{FileSink, MeetingRecord, PersistenceSink, StoredMeeting};
pub use session::{
    MeetingSession, MeetingSummary, SessionContext, SessionServices, SessionStats, TranscriptEntry,
};
pub use summarization::{
    HttpSummarizationService, RawResponse, Summarization, SummarizationService, Summarizer,
};
pub use transcription::{HttpTranscriptionService, JobStatus, Transcriber, TranscriptionService};
