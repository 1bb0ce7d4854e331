use anyhow::{anyhow, Context, Result};
use serde::Deserialize;

/// Terminal or pending state of one transcription job
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus {
    /// Job is queued or still running
    Pending,
    /// Job finished; the service may legitimately return no text for silence
    Completed { text: Option<String> },
    /// Job failed on the service side
    Errored { error: Option<String> },
}

/// Speech-to-text job service
///
/// Protocol: upload audio bytes to obtain an upload handle, submit a job
/// referencing that handle, then poll the job until it is `Completed` or
/// `Errored`.
#[async_trait::async_trait]
pub trait TranscriptionService: Send + Sync {
    /// Upload raw audio, returning an opaque handle for job submission
    async fn upload(&self, audio: &[u8]) -> Result<String>;

    /// Submit a transcription job for a previously uploaded blob
    async fn submit_job(&self, upload_handle: &str) -> Result<String>;

    /// Fetch the current status of a job
    async fn poll_job(&self, job_id: &str) -> Result<JobStatus>;
}

/// HTTP implementation of the job protocol
pub struct HttpTranscriptionService {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

#[derive(Deserialize)]
struct UploadResponse {
    upload_url: String,
}

#[derive(Deserialize)]
struct SubmitResponse {
    id: String,
}

#[derive(Deserialize)]
struct JobResponse {
    status: String,
    text: Option<String>,
    error: Option<String>,
}

impl HttpTranscriptionService {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>, api_key: Option<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client,
            base_url,
            api_key,
        }
    }

    fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => req.header("Authorization", key.clone()),
            None => req,
        }
    }
}

#[async_trait::async_trait]
impl TranscriptionService for HttpTranscriptionService {
    async fn upload(&self, audio: &[u8]) -> Result<String> {
        let url = format!("{}/upload", self.base_url);

        let res = self
            .authorize(self.client.post(&url))
            .header("Content-Type", "application/octet-stream")
            .body(audio.to_vec())
            .send()
            .await
            .context("Failed to reach upload endpoint")?;

        if !res.status().is_success() {
            return Err(anyhow!("Upload rejected with HTTP {}", res.status()));
        }

        let body: UploadResponse = res.json().await.context("Malformed upload response")?;
        Ok(body.upload_url)
    }

    async fn submit_job(&self, upload_handle: &str) -> Result<String> {
        let url = format!("{}/transcripts", self.base_url);

        let res = self
            .authorize(self.client.post(&url))
            .json(&serde_json::json!({ "audio_url": upload_handle }))
            .send()
            .await
            .context("Failed to reach job submission endpoint")?;

        if !res.status().is_success() {
            return Err(anyhow!("Job submission rejected with HTTP {}", res.status()));
        }

        let body: SubmitResponse = res.json().await.context("Malformed job submission response")?;
        Ok(body.id)
    }

    async fn poll_job(&self, job_id: &str) -> Result<JobStatus> {
        let url = format!("{}/transcripts/{}", self.base_url, job_id);

        let res = self
            .authorize(self.client.get(&url))
            .send()
            .await
            .context("Failed to reach job status endpoint")?;

        if !res.status().is_success() {
            return Err(anyhow!("Job status query rejected with HTTP {}", res.status()));
        }

        let body: JobResponse = res.json().await.context("Malformed job status response")?;

        let status = match body.status.as_str() {
            "completed" => JobStatus::Completed { text: body.text },
            "error" => JobStatus::Errored { error: body.error },
            // "queued", "processing" and anything the service adds later
            _ => JobStatus::Pending,
        };

        Ok(status)
    }
}
