use crate::summarization::truncate_chars;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Summary text used when a session produced no transcribable speech
pub const EMPTY_SESSION_SUMMARY: &str = "No speech was captured during this session.";
pub const EMPTY_SESSION_KEY_POINT: &str = "No discussion recorded";

/// Characters of transcript kept when synthesizing a fallback summary
const FALLBACK_SUMMARY_CHARS: usize = 500;

/// Minimum length for a fallback key-point fragment, in characters
const MIN_FALLBACK_POINT_CHARS: usize = 10;
const MAX_FALLBACK_POINTS: usize = 5;

/// One participant's contribution to the finished meeting
///
/// `text` is an empty string when transcription failed or the participant
/// produced no audio; the entry itself is never omitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub id: String,
    pub name: String,
    pub text: String,
}

/// The aggregate result of one finished session
///
/// `participants` and the keys of `participant_names` cover exactly the
/// identifiers appearing in `transcriptions`. Constructed once per
/// session end and immutable afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeetingSummary {
    pub summary: String,
    pub key_points: Vec<String>,
    pub participants: Vec<String>,
    pub participant_names: HashMap<String, String>,
    pub transcriptions: Vec<TranscriptEntry>,
    pub duration_ms: i64,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
}

/// Fixed summary for a session whose joined transcript is empty
pub fn placeholder_summary() -> (String, Vec<String>) {
    (
        EMPTY_SESSION_SUMMARY.to_string(),
        vec![EMPTY_SESSION_KEY_POINT.to_string()],
    )
}

/// Summary synthesized directly from the transcript when the model result
/// is empty or degraded
///
/// The summary is the transcript truncated to 500 characters; key points are
/// sentence fragments longer than ten characters, at most five of them.
pub fn fallback_summary(transcript: &str) -> (String, Vec<String>) {
    let summary = truncate_chars(transcript, FALLBACK_SUMMARY_CHARS);

    let key_points = transcript
        .split(['.', '?', '!'])
        .map(str::trim)
        .filter(|fragment| fragment.chars().count() > MIN_FALLBACK_POINT_CHARS)
        .take(MAX_FALLBACK_POINTS)
        .map(String::from)
        .collect();

    (summary, key_points)
}
