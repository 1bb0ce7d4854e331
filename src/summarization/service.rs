use anyhow::{Context, Result};

/// Raw HTTP answer from the summarization endpoint
///
/// The body is kept as text on purpose: classification by status and content
/// type happens before any attempt to parse it as structured data.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub content_type: String,
    pub body: String,
}

impl RawResponse {
    pub fn is_json(&self) -> bool {
        self.content_type
            .split(';')
            .next()
            .map(str::trim)
            .is_some_and(|t| t.eq_ignore_ascii_case("application/json"))
    }
}

/// Text summarization model endpoint
#[async_trait::async_trait]
pub trait SummarizationService: Send + Sync {
    /// POST the (already truncated) transcript and return the raw answer
    async fn summarize(&self, text: &str) -> Result<RawResponse>;
}

/// HTTP implementation posting `{"inputs": text}` to a hosted model
pub struct HttpSummarizationService {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl HttpSummarizationService {
    pub fn new(client: reqwest::Client, endpoint: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            api_key,
        }
    }
}

#[async_trait::async_trait]
impl SummarizationService for HttpSummarizationService {
    async fn summarize(&self, text: &str) -> Result<RawResponse> {
        let mut req = self
            .client
            .post(&self.endpoint)
            .json(&serde_json::json!({ "inputs": text }));

        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }

        let res = req
            .send()
            .await
            .context("Failed to reach summarization endpoint")?;

        let status = res.status().as_u16();
        let content_type = res
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();
        let body = res
            .text()
            .await
            .context("Failed to read summarization response body")?;

        Ok(RawResponse {
            status,
            content_type,
            body,
        })
    }
}
