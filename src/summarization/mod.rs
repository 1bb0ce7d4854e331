//! Summarization via an external text model
//!
//! The joined session transcript is POSTed to a hosted model endpoint. The
//! endpoint may answer 503 or a structured "loading" error while the model
//! warms up; the `Summarizer` retries those with a fixed backoff under a
//! bounded attempt budget and surfaces every other failure as a degraded
//! result rather than an error.

mod service;
mod summarizer;

pub use service::{HttpSummarizationService, RawResponse, SummarizationService};
pub use summarizer::{extract_key_points, truncate_chars, Summarization, Summarizer};
