use reqwest::Client;
use thiserror::Error;

use super::types::{GenerateRequest, GenerateResponse};

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("language model request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("language model error: {0}")]
    Service(String),
}

/// Client for the hosted generative-language endpoint.
#[derive(Debug, Clone)]
pub struct LlmClient {
    http: Client,
    api_url: String,
    api_key: String,
}

impl LlmClient {
    pub fn new(http: Client, api_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http,
            api_url: api_url.into(),
            api_key: api_key.into(),
        }
    }

    /// Send one prompt. `Ok(None)` means the model answered without any text.
    pub async fn generate(&self, prompt: &str) -> Result<Option<String>, LlmError> {
        let resp = self
            .http
            .post(&self.api_url)
            .header("X-goog-api-key", &self.api_key)
            .json(&GenerateRequest::from_prompt(prompt))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(LlmError::Service(format!("{status}: {body}")));
        }

        let body = resp.text().await?;
        let parsed: GenerateResponse = serde_json::from_str(&body)
            .map_err(|e| LlmError::Service(format!("unreadable response: {e}")))?;

        Ok(parsed.first_text())
    }
}
