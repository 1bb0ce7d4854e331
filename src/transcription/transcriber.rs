use super::service::{JobStatus, TranscriptionService};
use anyhow::{anyhow, Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{info, warn};

/// Drives one audio blob through upload, job submission and status polling
///
/// Contract: `transcribe` always returns text. Service errors, malformed
/// responses and exhausted poll budgets are logged and collapse to an empty
/// string; the caller decides what an empty transcript means.
pub struct Transcriber {
    service: Arc<dyn TranscriptionService>,

    /// Pause between consecutive status polls
    poll_interval: Duration,

    /// Upper bound on the whole upload-to-completion wait
    poll_budget: Duration,
}

impl Transcriber {
    pub fn new(
        service: Arc<dyn TranscriptionService>,
        poll_interval: Duration,
        poll_budget: Duration,
    ) -> Self {
        Self {
            service,
            poll_interval,
            poll_budget,
        }
    }

    /// Transcribe one participant's combined audio, degrading failure to ""
    pub async fn transcribe(&self, audio: &[u8]) -> String {
        if audio.is_empty() {
            return String::new();
        }

        match self.run_job(audio).await {
            Ok(text) => text,
            Err(e) => {
                warn!("Transcription failed, substituting empty text: {:#}", e);
                String::new()
            }
        }
    }

    async fn run_job(&self, audio: &[u8]) -> Result<String> {
        let handle = self
            .service
            .upload(audio)
            .await
            .context("Audio upload failed")?;

        let job_id = self
            .service
            .submit_job(&handle)
            .await
            .context("Job submission failed")?;

        info!("Transcription job {} submitted ({} bytes)", job_id, audio.len());

        let deadline = Instant::now() + self.poll_budget;

        loop {
            let status = self
                .service
                .poll_job(&job_id)
                .await
                .context("Job status poll failed")?;

            match status {
                JobStatus::Completed { text } => {
                    let text = text.unwrap_or_default();
                    info!("Transcription job {} completed ({} chars)", job_id, text.len());
                    return Ok(text);
                }
                JobStatus::Errored { error } => {
                    warn!(
                        "Transcription job {} reported an error: {}",
                        job_id,
                        error.as_deref().unwrap_or("unspecified")
                    );
                    return Ok(String::new());
                }
                JobStatus::Pending => {
                    if Instant::now() + self.poll_interval > deadline {
                        return Err(anyhow!(
                            "Transcription job {} did not finish within {:?}",
                            job_id,
                            self.poll_budget
                        ));
                    }
                    tokio::time::sleep(self.poll_interval).await;
                }
            }
        }
    }
}
