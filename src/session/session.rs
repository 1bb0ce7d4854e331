use super::summary::{fallback_summary, placeholder_summary, MeetingSummary, TranscriptEntry};
use crate::directory::{resolve_display_names, MemberDirectory};
use crate::persist::{MeetingRecord, PersistenceSink};
use crate::summarization::Summarizer;
use crate::transcription::Transcriber;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

/// External collaborators a session needs to finish
#[derive(Clone)]
pub struct SessionServices {
    pub transcriber: Arc<Transcriber>,
    pub summarizer: Arc<Summarizer>,
    pub directory: Arc<dyn MemberDirectory>,
    pub directory_page_size: usize,
    pub sink: Arc<dyn PersistenceSink>,
}

/// Attribution carried onto the persisted record
///
/// Both fields are optional; sessions without a group skip directory lookup
/// entirely.
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    pub group_id: Option<String>,
    pub caller_id: Option<String>,
}

/// Per-speaker accumulation state within one session
#[derive(Debug, Clone)]
pub struct ParticipantRecord {
    pub id: String,
    pub name: Option<String>,
    /// Timestamp of the most recent chunk (or registration offset)
    pub last_seen: DateTime<Utc>,
    /// Ordered raw audio fragments as ingested
    pub fragments: Vec<Vec<u8>>,
    pub finalized: bool,
}

struct SessionState {
    /// Session clock: set by `init`, or lazily by the first chunk, and not
    /// overwritten until the next `init`
    started_at: Option<DateTime<Utc>>,
    participants: HashMap<String, ParticipantRecord>,
}

/// Point-in-time view of a session for status queries
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStats {
    pub room_id: String,
    pub started_at: Option<DateTime<Utc>>,
    pub participant_count: usize,
    pub chunk_count: usize,
    pub finalized_count: usize,
}

/// Snapshot of one participant taken under the lock for transcription
struct ParticipantAudio {
    id: String,
    local_name: Option<String>,
    audio: Vec<u8>,
}

/// One recorded meeting, from init to end
///
/// All mutation goes through the internal mutex, so registration, ingestion
/// and finalization may arrive interleaved from independent callers in any
/// order. Transcription and summarization awaits run outside the lock.
pub struct MeetingSession {
    room_id: String,
    services: SessionServices,
    state: Mutex<SessionState>,
}

impl MeetingSession {
    pub fn new(room_id: String, services: SessionServices) -> Self {
        Self {
            room_id,
            services,
            state: Mutex::new(SessionState {
                started_at: None,
                participants: HashMap::new(),
            }),
        }
    }

    pub fn room_id(&self) -> &str {
        &self.room_id
    }

    /// Start (or restart) the session at `start_time`, clearing all
    /// participant records
    pub async fn init(&self, start_time: DateTime<Utc>) {
        let mut state = self.state.lock().await;

        if !state.participants.is_empty() {
            info!(
                "Re-initializing session {} discards {} participant records",
                self.room_id,
                state.participants.len()
            );
        }

        state.started_at = Some(start_time);
        state.participants.clear();
    }

    /// Register a participant, or update one that already exists
    ///
    /// Registration is an idempotent upsert: a repeated registration updates
    /// the display name and offset but keeps any audio fragments already
    /// ingested, since chunks and registrations arrive on independent
    /// channels and may race.
    pub async fn register_participant(
        &self,
        id: &str,
        name: Option<String>,
        offset: DateTime<Utc>,
    ) {
        let mut state = self.state.lock().await;

        match state.participants.get_mut(id) {
            Some(record) => {
                record.name = name.or(record.name.take());
                record.last_seen = offset;
            }
            None => {
                state.participants.insert(
                    id.to_string(),
                    ParticipantRecord {
                        id: id.to_string(),
                        name,
                        last_seen: offset,
                        fragments: Vec::new(),
                        finalized: false,
                    },
                );
            }
        }
    }

    /// Append an audio fragment for a participant
    ///
    /// Unknown participants are created on the fly (no name), so ingestion
    /// never fails just because registration has not arrived yet. If the
    /// session clock is still unset it is established from this chunk's
    /// timestamp. Chunks for a finalized participant are dropped.
    pub async fn ingest_chunk(&self, id: &str, fragment: Vec<u8>, timestamp: DateTime<Utc>) {
        let mut state = self.state.lock().await;

        if state.started_at.is_none() {
            state.started_at = Some(timestamp);
        }

        let record = state
            .participants
            .entry(id.to_string())
            .or_insert_with(|| ParticipantRecord {
                id: id.to_string(),
                name: None,
                last_seen: timestamp,
                fragments: Vec::new(),
                finalized: false,
            });

        if record.finalized {
            warn!(
                "Dropping chunk for finalized participant {} in session {}",
                id, self.room_id
            );
            return;
        }

        record.fragments.push(fragment);
        record.last_seen = timestamp;
    }

    /// Finalize one participant and transcribe their accumulated audio
    ///
    /// Never fails: an unknown participant or a transcription failure both
    /// produce an entry with empty text.
    pub async fn finalize_participant(&self, id: &str, stop_time: DateTime<Utc>) -> TranscriptEntry {
        let (name, audio) = {
            let mut state = self.state.lock().await;

            match state.participants.get_mut(id) {
                Some(record) => {
                    record.finalized = true;
                    record.last_seen = stop_time;
                    (
                        record.name.clone().unwrap_or_else(|| id.to_string()),
                        record.fragments.concat(),
                    )
                }
                None => {
                    warn!(
                        "Finalize requested for unknown participant {} in session {}",
                        id, self.room_id
                    );
                    return TranscriptEntry {
                        id: id.to_string(),
                        name: id.to_string(),
                        text: String::new(),
                    };
                }
            }
        };

        let text = if audio.is_empty() {
            String::new()
        } else {
            self.services.transcriber.transcribe(&audio).await
        };

        TranscriptEntry {
            id: id.to_string(),
            name,
            text,
        }
    }

    /// Finish the session: transcribe every participant, summarize the
    /// joined transcript, persist and return the aggregate
    ///
    /// Always returns a complete `MeetingSummary`; transcription failures
    /// degrade to empty entries, a degraded or empty model summary is
    /// replaced by a synthesized fallback, and a persistence failure is
    /// logged without affecting the returned result.
    pub async fn end_session(&self, context: &SessionContext) -> MeetingSummary {
        let ended_at = Utc::now();

        let (started_at, snapshot) = self.snapshot_for_end(ended_at).await;
        let duration_ms = (ended_at - started_at).num_milliseconds().max(0);

        info!(
            "Ending session {}: {} participants, {} ms",
            self.room_id,
            snapshot.len(),
            duration_ms
        );

        let names = self.resolve_names(context, &snapshot).await;

        // Every participant's transcription must resolve before the joined
        // transcript is summarized
        let entries = futures::future::join_all(snapshot.iter().map(|participant| {
            let name = names
                .get(&participant.id)
                .cloned()
                .unwrap_or_else(|| participant.id.clone());
            async move {
                let text = if participant.audio.is_empty() {
                    String::new()
                } else {
                    self.services.transcriber.transcribe(&participant.audio).await
                };
                TranscriptEntry {
                    id: participant.id.clone(),
                    name,
                    text,
                }
            }
        }))
        .await;

        let combined = entries
            .iter()
            .filter(|entry| !entry.text.trim().is_empty())
            .map(|entry| format!("{}: {}", entry.name, entry.text))
            .collect::<Vec<_>>()
            .join("\n")
            .trim()
            .to_string();

        let (summary, key_points) = if combined.is_empty() {
            placeholder_summary()
        } else {
            let result = self.services.summarizer.summarize(&combined).await;
            if result.failed || result.summary.trim().is_empty() {
                fallback_summary(&combined)
            } else {
                (result.summary, result.key_points)
            }
        };

        let participants: Vec<String> = entries.iter().map(|entry| entry.id.clone()).collect();

        let aggregate = MeetingSummary {
            summary,
            key_points,
            participants,
            participant_names: names,
            transcriptions: entries,
            duration_ms,
            started_at,
            ended_at,
        };

        self.persist(context, &aggregate).await;

        aggregate
    }

    /// Current counters for status queries
    pub async fn stats(&self) -> SessionStats {
        let state = self.state.lock().await;

        SessionStats {
            room_id: self.room_id.clone(),
            started_at: state.started_at,
            participant_count: state.participants.len(),
            chunk_count: state
                .participants
                .values()
                .map(|p| p.fragments.len())
                .sum(),
            finalized_count: state.participants.values().filter(|p| p.finalized).count(),
        }
    }

    /// Establish the clock if still unset and copy out each participant's
    /// concatenated audio, releasing the lock before any network awaits
    async fn snapshot_for_end(&self, now: DateTime<Utc>) -> (DateTime<Utc>, Vec<ParticipantAudio>) {
        let mut state = self.state.lock().await;

        let started_at = match state.started_at {
            Some(t) => t,
            None => {
                let derived = state
                    .participants
                    .values()
                    .map(|p| p.last_seen)
                    .min()
                    .unwrap_or(now);
                state.started_at = Some(derived);
                derived
            }
        };

        let mut snapshot: Vec<ParticipantAudio> = state
            .participants
            .values()
            .map(|p| ParticipantAudio {
                id: p.id.clone(),
                local_name: p.name.clone(),
                audio: p.fragments.concat(),
            })
            .collect();

        // Stable output order; registration order carries no meaning
        snapshot.sort_by(|a, b| a.id.cmp(&b.id));

        (started_at, snapshot)
    }

    /// Directory name, then locally stored name, then the raw identifier
    async fn resolve_names(
        &self,
        context: &SessionContext,
        snapshot: &[ParticipantAudio],
    ) -> HashMap<String, String> {
        let resolved = match &context.group_id {
            Some(group_id) => {
                match resolve_display_names(
                    self.services.directory.as_ref(),
                    group_id,
                    self.services.directory_page_size,
                )
                .await
                {
                    Ok(names) => names,
                    Err(e) => {
                        warn!(
                            "Name resolution failed for group {}, falling back to local names: {:#}",
                            group_id, e
                        );
                        HashMap::new()
                    }
                }
            }
            None => HashMap::new(),
        };

        snapshot
            .iter()
            .map(|p| {
                let name = resolved
                    .get(&p.id)
                    .cloned()
                    .or_else(|| p.local_name.clone())
                    .unwrap_or_else(|| p.id.clone());
                (p.id.clone(), name)
            })
            .collect()
    }

    async fn persist(&self, context: &SessionContext, aggregate: &MeetingSummary) {
        let record = MeetingRecord {
            room_id: self.room_id.clone(),
            group_id: context.group_id.clone(),
            created_by: context.caller_id.clone(),
            summary: aggregate.summary.clone(),
            key_points: aggregate.key_points.clone(),
            participants: aggregate.participants.clone(),
            participant_names: aggregate.participant_names.clone(),
            duration_ms: aggregate.duration_ms,
            started_at: aggregate.started_at,
            ended_at: aggregate.ended_at,
            transcriptions: aggregate.transcriptions.clone(),
        };

        match self.services.sink.insert(&record).await {
            Ok(stored) => {
                info!(
                    "Persisted meeting {} (created at {})",
                    self.room_id, stored.created_at
                );
            }
            Err(e) => {
                error!(
                    "Failed to persist meeting {}; returning result anyway: {:#}",
                    self.room_id, e
                );
            }
        }
    }
}
