// Integration tests for the transcription job driver
//
// These tests script the upload/submit/poll protocol to verify the poll
// loop, the degraded-to-empty failure contract and the poll budget.

use anyhow::Result;
use confab::transcription::{JobStatus, Transcriber, TranscriptionService};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Plays back a scripted sequence of poll answers
struct ScriptedService {
    uploads: AtomicUsize,
    submissions: AtomicUsize,
    polls: AtomicUsize,
    statuses: Mutex<VecDeque<JobStatus>>,
}

impl ScriptedService {
    fn new(statuses: Vec<JobStatus>) -> Self {
        Self {
            uploads: AtomicUsize::new(0),
            submissions: AtomicUsize::new(0),
            polls: AtomicUsize::new(0),
            statuses: Mutex::new(statuses.into()),
        }
    }
}

#[async_trait::async_trait]
impl TranscriptionService for ScriptedService {
    async fn upload(&self, _audio: &[u8]) -> Result<String> {
        self.uploads.fetch_add(1, Ordering::SeqCst);
        Ok("upload-1".to_string())
    }

    async fn submit_job(&self, upload_handle: &str) -> Result<String> {
        self.submissions.fetch_add(1, Ordering::SeqCst);
        assert_eq!(upload_handle, "upload-1");
        Ok("job-1".to_string())
    }

    async fn poll_job(&self, job_id: &str) -> Result<JobStatus> {
        self.polls.fetch_add(1, Ordering::SeqCst);
        assert_eq!(job_id, "job-1");
        let mut statuses = self.statuses.lock().unwrap();
        // A drained script keeps reporting Pending
        Ok(statuses.pop_front().unwrap_or(JobStatus::Pending))
    }
}

/// Upload endpoint is unreachable
struct BrokenUpload;

#[async_trait::async_trait]
impl TranscriptionService for BrokenUpload {
    async fn upload(&self, _audio: &[u8]) -> Result<String> {
        Err(anyhow::anyhow!("connection refused"))
    }

    async fn submit_job(&self, _upload_handle: &str) -> Result<String> {
        unreachable!("submit must not be reached when upload fails")
    }

    async fn poll_job(&self, _job_id: &str) -> Result<JobStatus> {
        unreachable!("poll must not be reached when upload fails")
    }
}

fn transcriber(service: Arc<dyn TranscriptionService>) -> Transcriber {
    Transcriber::new(service, Duration::from_millis(1), Duration::from_secs(1))
}

#[tokio::test]
async fn test_polls_until_job_completes() -> Result<()> {
    let service = Arc::new(ScriptedService::new(vec![
        JobStatus::Pending,
        JobStatus::Pending,
        JobStatus::Completed {
            text: Some("hello world".to_string()),
        },
    ]));

    let text = transcriber(service.clone()).transcribe(b"pcm bytes").await;

    assert_eq!(text, "hello world");
    assert_eq!(service.uploads.load(Ordering::SeqCst), 1);
    assert_eq!(service.submissions.load(Ordering::SeqCst), 1);
    assert_eq!(service.polls.load(Ordering::SeqCst), 3);

    Ok(())
}

#[tokio::test]
async fn test_service_error_degrades_to_empty_string() -> Result<()> {
    let service = Arc::new(ScriptedService::new(vec![JobStatus::Errored {
        error: Some("unsupported codec".to_string()),
    }]));

    let text = transcriber(service).transcribe(b"pcm bytes").await;

    assert_eq!(text, "", "terminal job errors collapse to empty text");

    Ok(())
}

#[tokio::test]
async fn test_completed_job_without_text_yields_empty_string() -> Result<()> {
    let service = Arc::new(ScriptedService::new(vec![JobStatus::Completed {
        text: None,
    }]));

    let text = transcriber(service).transcribe(b"pcm bytes").await;

    assert_eq!(text, "");

    Ok(())
}

#[tokio::test]
async fn test_poll_budget_bounds_waiting() -> Result<()> {
    // Script never completes; the budget must cut the loop off
    let service = Arc::new(ScriptedService::new(vec![]));
    let transcriber = Transcriber::new(
        service.clone(),
        Duration::from_millis(5),
        Duration::from_millis(40),
    );

    let text = transcriber.transcribe(b"pcm bytes").await;

    assert_eq!(text, "", "an exhausted budget degrades to empty text");
    assert!(
        service.polls.load(Ordering::SeqCst) >= 2,
        "the job should have been polled more than once before giving up"
    );

    Ok(())
}

#[tokio::test]
async fn test_upload_failure_degrades_to_empty_string() -> Result<()> {
    let text = transcriber(Arc::new(BrokenUpload)).transcribe(b"pcm bytes").await;

    assert_eq!(text, "");

    Ok(())
}

#[tokio::test]
async fn test_empty_audio_skips_the_service_entirely() -> Result<()> {
    let service = Arc::new(ScriptedService::new(vec![]));

    let text = transcriber(service.clone()).transcribe(&[]).await;

    assert_eq!(text, "");
    assert_eq!(
        service.uploads.load(Ordering::SeqCst),
        0,
        "no audio means no upload"
    );

    Ok(())
}
