use chrono::NaiveDate;
use metrics::{counter, histogram};
use std::time::Instant;
use thiserror::Error;

use super::parser::{build_prompt, parse_model_output, StructuredExtraction};
use crate::vendors::{LlmClient, LlmError, OcrClient, OcrError};

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error(transparent)]
    Ocr(#[from] OcrError),

    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error("language model returned no text")]
    EmptyModelResponse,
}

impl ExtractionError {
    fn stage(&self) -> &'static str {
        match self {
            ExtractionError::Ocr(_) => "ocr",
            ExtractionError::Llm(_) | ExtractionError::EmptyModelResponse => "llm",
        }
    }
}

/// Screenshot → OCR text → language model → candidate trades.
#[derive(Debug, Clone)]
pub struct ExtractionPipeline {
    ocr: OcrClient,
    llm: LlmClient,
}

impl ExtractionPipeline {
    pub fn new(ocr: OcrClient, llm: LlmClient) -> Self {
        Self { ocr, llm }
    }

    /// Run the whole chain once. Any vendor failure halts it; an answer that is
    /// not JSON is *not* a failure (see [`parse_model_output`]).
    pub async fn run(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
        today: NaiveDate,
    ) -> Result<StructuredExtraction, ExtractionError> {
        let start = Instant::now();
        counter!("extractions_total").increment(1);

        let result = self.run_inner(file_name, bytes, today).await;

        histogram!("extraction_latency_seconds").record(start.elapsed().as_secs_f64());

        match &result {
            Ok(extraction) => {
                if extraction.is_fallback() {
                    counter!("extraction_parse_fallbacks_total").increment(1);
                }
                tracing::info!(
                    file = file_name,
                    trades = extraction.trades.len(),
                    has_summary = extraction.summary.is_some(),
                    fallback = extraction.is_fallback(),
                    "Screenshot extraction finished"
                );
            }
            Err(e) => {
                counter!("extraction_failures_total", "stage" => e.stage()).increment(1);
                tracing::warn!(file = file_name, error = %e, "Screenshot extraction failed");
            }
        }

        result
    }

    async fn run_inner(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
        today: NaiveDate,
    ) -> Result<StructuredExtraction, ExtractionError> {
        let text = self.ocr.extract_text(file_name, bytes).await?;

        let answer = self
            .llm
            .generate(&build_prompt(&text))
            .await?
            .ok_or(ExtractionError::EmptyModelResponse)?;

        Ok(parse_model_output(&answer, today))
    }
}
