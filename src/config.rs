use anyhow::Result;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub transcription: TranscriptionConfig,
    pub summarization: SummarizationConfig,
    pub directory: DirectoryConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
}

#[derive(Debug, Deserialize)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

#[derive(Debug, Deserialize)]
pub struct TranscriptionConfig {
    /// Base URL of the speech-to-text job service
    pub base_url: String,
    pub api_key: Option<String>,
    /// Seconds between job status polls
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    /// Total seconds to wait for one job before giving up
    #[serde(default = "default_poll_budget_secs")]
    pub poll_budget_secs: u64,
}

#[derive(Debug, Deserialize)]
pub struct SummarizationConfig {
    /// Summarization model endpoint (POST target)
    pub endpoint: String,
    pub api_key: Option<String>,
    /// Maximum characters of transcript sent to the model
    #[serde(default = "default_max_input_chars")]
    pub max_input_chars: usize,
    /// Seconds to wait before retrying a warming-up model
    #[serde(default = "default_retry_backoff_secs")]
    pub retry_backoff_secs: u64,
    /// Maximum attempts before giving up on a warming-up model
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

#[derive(Debug, Deserialize)]
pub struct DirectoryConfig {
    /// Base URL of the member directory service
    pub base_url: String,
    /// Members fetched per page
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

#[derive(Debug, Deserialize)]
pub struct StorageConfig {
    /// Directory where finished meeting records are written
    pub notes_path: String,
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}

impl TranscriptionConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn poll_budget(&self) -> Duration {
        Duration::from_secs(self.poll_budget_secs)
    }
}

impl SummarizationConfig {
    pub fn retry_backoff(&self) -> Duration {
        Duration::from_secs(self.retry_backoff_secs)
    }
}

fn default_poll_interval_secs() -> u64 {
    3
}

fn default_poll_budget_secs() -> u64 {
    600
}

fn default_max_input_chars() -> usize {
    4000
}

fn default_retry_backoff_secs() -> u64 {
    15
}

fn default_max_attempts() -> u32 {
    8
}

fn default_page_size() -> usize {
    200
}
