use super::service::{RawResponse, SummarizationService};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Returned when the model answered but carried no usable summary text
const NO_SUMMARY_MESSAGE: &str = "A summary could not be generated for this session.";
const NO_SUMMARY_KEY_POINT: &str = "Summary unavailable";

/// Minimum length for a key-point fragment, in characters
const MIN_KEY_POINT_CHARS: usize = 5;
const MAX_KEY_POINTS: usize = 5;

/// Result of one summarization pass
///
/// `failed` marks a degraded outcome (service error, malformed body or an
/// exhausted warm-up retry budget); the summary then carries the error
/// message so the caller can decide whether to substitute its own fallback.
#[derive(Debug, Clone)]
pub struct Summarization {
    pub summary: String,
    pub key_points: Vec<String>,
    pub failed: bool,
}

impl Summarization {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            summary: message.into(),
            key_points: Vec::new(),
            failed: true,
        }
    }
}

/// Closed set of body shapes the model endpoint is known to produce
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SummaryBody {
    /// `{"error": "..."}`, including "model ... is currently loading"
    Error { error: String },
    /// `[{"summary_text": "..."}]`
    Batch(Vec<SummaryFields>),
    /// `{"summary_text": "..."}`
    Single(SummaryFields),
    /// A bare JSON string
    Text(String),
}

/// Field names under which equivalent endpoints carry the summary text
#[derive(Debug, Default, Deserialize)]
struct SummaryFields {
    summary_text: Option<String>,
    generated_text: Option<String>,
    summary: Option<String>,
}

impl SummaryFields {
    fn into_text(self) -> Option<String> {
        self.summary_text
            .or(self.generated_text)
            .or(self.summary)
            .filter(|t| !t.trim().is_empty())
    }
}

enum Classified {
    /// Model is warming up; wait and try again
    Retry(String),
    /// Permanent failure for this call
    Failure(String),
    /// Parsed body ready for text extraction
    Success(SummaryBody),
}

/// Produces a summary and key points for a joined session transcript
pub struct Summarizer {
    service: Arc<dyn SummarizationService>,

    /// Characters of transcript kept before transmission
    max_input_chars: usize,

    /// Pause before retrying a warming-up model
    retry_backoff: Duration,

    /// Attempt budget across warm-up retries
    max_attempts: u32,
}

impl Summarizer {
    pub fn new(
        service: Arc<dyn SummarizationService>,
        max_input_chars: usize,
        retry_backoff: Duration,
        max_attempts: u32,
    ) -> Self {
        Self {
            service,
            max_input_chars,
            retry_backoff,
            max_attempts,
        }
    }

    /// Summarize a transcript, retrying while the model warms up
    ///
    /// Never returns an error: every failure mode collapses into a
    /// `Summarization` with `failed` set.
    pub async fn summarize(&self, transcript: &str) -> Summarization {
        let input = truncate_chars(transcript, self.max_input_chars);
        let mut attempt = 0u32;

        loop {
            attempt += 1;

            let response = match self.service.summarize(&input).await {
                Ok(r) => r,
                Err(e) => {
                    warn!("Summarization request failed: {:#}", e);
                    return Summarization::failure(format!("Summarization request failed: {e}"));
                }
            };

            match classify(&response) {
                Classified::Retry(reason) => {
                    if attempt >= self.max_attempts {
                        warn!(
                            "Summarization model still not ready after {} attempts",
                            attempt
                        );
                        return Summarization::failure(format!(
                            "Summarization model not ready after {attempt} attempts"
                        ));
                    }
                    info!(
                        "Summarization attempt {}: {}; retrying in {:?}",
                        attempt, reason, self.retry_backoff
                    );
                    tokio::time::sleep(self.retry_backoff).await;
                }
                Classified::Failure(message) => {
                    warn!("Summarization degraded: {}", message);
                    return Summarization::failure(message);
                }
                Classified::Success(body) => {
                    return finish(body);
                }
            }
        }
    }
}

fn classify(response: &RawResponse) -> Classified {
    if response.status == 503 {
        return Classified::Retry("model not ready (HTTP 503)".to_string());
    }

    if !(200..300).contains(&response.status) {
        return Classified::Failure(format!(
            "Summarization service returned HTTP {}",
            response.status
        ));
    }

    if !response.is_json() {
        return Classified::Failure(format!(
            "Summarization service returned unexpected content type '{}'",
            response.content_type
        ));
    }

    let body: SummaryBody = match serde_json::from_str(&response.body) {
        Ok(b) => b,
        Err(e) => {
            return Classified::Failure(format!("Unparsable summarization response: {e}"));
        }
    };

    if let SummaryBody::Error { error } = &body {
        if error.to_lowercase().contains("loading") {
            return Classified::Retry(format!("model loading ({error})"));
        }
        return Classified::Failure(error.clone());
    }

    Classified::Success(body)
}

fn finish(body: SummaryBody) -> Summarization {
    let text = match body {
        // handled during classification
        SummaryBody::Error { error } => return Summarization::failure(error),
        SummaryBody::Batch(items) => items.into_iter().next().and_then(SummaryFields::into_text),
        SummaryBody::Single(fields) => fields.into_text(),
        SummaryBody::Text(text) => Some(text).filter(|t| !t.trim().is_empty()),
    };

    match text {
        Some(summary) => {
            let key_points = extract_key_points(&summary);
            Summarization {
                summary,
                key_points,
                failed: false,
            }
        }
        None => Summarization {
            summary: NO_SUMMARY_MESSAGE.to_string(),
            key_points: vec![NO_SUMMARY_KEY_POINT.to_string()],
            failed: false,
        },
    }
}

/// Split a summary into key points on sentence-terminating punctuation
///
/// Fragments are trimmed; anything shorter than five characters is dropped
/// and at most five points are kept.
pub fn extract_key_points(summary: &str) -> Vec<String> {
    summary
        .split(['.', '?', '!'])
        .map(str::trim)
        .filter(|fragment| fragment.chars().count() >= MIN_KEY_POINT_CHARS)
        .take(MAX_KEY_POINTS)
        .map(String::from)
        .collect()
}

/// Keep at most `max` characters of `text`
pub fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}
