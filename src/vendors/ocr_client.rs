use reqwest::multipart::{Form, Part};
use reqwest::Client;
use thiserror::Error;

use super::types::OcrResponse;

#[derive(Debug, Error)]
pub enum OcrError {
    #[error("OCR request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("OCR service error: {0}")]
    Service(String),

    #[error("No text found in image. Please check image clarity.")]
    NoTextFound,
}

/// Client for the screenshot text-recognition service.
#[derive(Debug, Clone)]
pub struct OcrClient {
    http: Client,
    api_url: String,
    api_key: String,
}

impl OcrClient {
    pub fn new(http: Client, api_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http,
            api_url: api_url.into(),
            api_key: api_key.into(),
        }
    }

    /// Send one image and return its recognized text. Single attempt, no retry.
    pub async fn extract_text(&self, file_name: &str, bytes: Vec<u8>) -> Result<String, OcrError> {
        let form = Form::new()
            .part("file", Part::bytes(bytes).file_name(file_name.to_string()))
            .text("apikey", self.api_key.clone())
            .text("language", "eng");

        let resp = self.http.post(&self.api_url).multipart(form).send().await?;

        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            return Err(OcrError::Service(format!("{status}: {body}")));
        }

        let parsed: OcrResponse = serde_json::from_str(&body)
            .map_err(|e| OcrError::Service(format!("unreadable response: {e}")))?;

        if parsed.is_errored_on_processing {
            return Err(OcrError::Service(parsed.error_text()));
        }

        let text = parsed.first_text().ok_or(OcrError::NoTextFound)?;

        tracing::debug!(chars = text.len(), "OCR text extracted");
        Ok(text.to_string())
    }
}
