//! Speech-to-text via an asynchronous job service
//!
//! Audio is uploaded as a blob, a transcription job is submitted against the
//! upload, and the job is polled until it reaches a terminal state. The
//! `Transcriber` wraps that protocol and degrades every failure to an empty
//! transcript so a single bad participant never blocks session completion.

mod service;
mod transcriber;

pub use service::{HttpTranscriptionService, JobStatus, TranscriptionService};
pub use transcriber::Transcriber;
