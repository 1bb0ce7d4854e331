//! Durable storage for finished meetings
//!
//! The controller hands a fully assembled `MeetingRecord` to a
//! `PersistenceSink` after every session. Storage is best-effort by design:
//! a sink failure is logged by the caller and the in-memory aggregate is
//! still returned.

use crate::session::TranscriptEntry;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Persisted shape of one finished meeting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeetingRecord {
    pub room_id: String,
    pub group_id: Option<String>,
    pub created_by: Option<String>,
    pub summary: String,
    pub key_points: Vec<String>,
    pub participants: Vec<String>,
    pub participant_names: HashMap<String, String>,
    pub duration_ms: i64,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub transcriptions: Vec<TranscriptEntry>,
}

/// A record as the sink stored it; `created_at` is assigned by the sink
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredMeeting {
    #[serde(flatten)]
    pub record: MeetingRecord,
    pub created_at: DateTime<Utc>,
}

#[async_trait::async_trait]
pub trait PersistenceSink: Send + Sync {
    async fn insert(&self, record: &MeetingRecord) -> Result<StoredMeeting>;
}

/// Writes one JSON document per meeting into a notes directory
pub struct FileSink {
    notes_path: PathBuf,
}

impl FileSink {
    pub fn new(notes_path: impl AsRef<Path>) -> Self {
        Self {
            notes_path: notes_path.as_ref().to_path_buf(),
        }
    }
}

#[async_trait::async_trait]
impl PersistenceSink for FileSink {
    async fn insert(&self, record: &MeetingRecord) -> Result<StoredMeeting> {
        let stored = StoredMeeting {
            record: record.clone(),
            created_at: Utc::now(),
        };

        tokio::fs::create_dir_all(&self.notes_path)
            .await
            .context("Failed to create notes directory")?;

        let file_name = format!(
            "{}-{}.json",
            stored.record.room_id,
            stored.record.ended_at.format("%Y%m%dT%H%M%S")
        );
        let path = self.notes_path.join(file_name);

        let body = serde_json::to_vec_pretty(&stored).context("Failed to encode meeting record")?;

        tokio::fs::write(&path, body)
            .await
            .with_context(|| format!("Failed to write meeting record to {:?}", path))?;

        Ok(stored)
    }
}
