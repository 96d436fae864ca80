use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ---------------------------------------------------------------------------
// OCR service
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OcrResponse {
    #[serde(default)]
    pub is_errored_on_processing: bool,
    /// Either a list of strings or a single string, depending on the failure.
    #[serde(default)]
    pub error_message: Option<Value>,
    #[serde(default)]
    pub parsed_results: Vec<OcrParsedResult>,
}

impl OcrResponse {
    /// Error messages joined for display.
    pub fn error_text(&self) -> String {
        match &self.error_message {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|v| v.as_str())
                .collect::<Vec<_>>()
                .join(", "),
            Some(Value::String(s)) => s.clone(),
            _ => "unknown OCR error".into(),
        }
    }

    /// Text of the first parsed result, if it has any.
    pub fn first_text(&self) -> Option<&str> {
        self.parsed_results
            .first()
            .and_then(|r| r.parsed_text.as_deref())
            .filter(|t| !t.trim().is_empty())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OcrParsedResult {
    #[serde(default)]
    pub parsed_text: Option<String>,
}

// ---------------------------------------------------------------------------
// Generative-language service
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct GenerateRequest {
    pub contents: Vec<GenerateContent>,
}

impl GenerateRequest {
    pub fn from_prompt(prompt: impl Into<String>) -> Self {
        Self {
            contents: vec![GenerateContent {
                parts: vec![GeneratePart {
                    text: prompt.into(),
                }],
            }],
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerateContent {
    pub parts: Vec<GeneratePart>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GeneratePart {
    pub text: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerateResponse {
    #[serde(default)]
    pub candidates: Vec<GenerateCandidate>,
}

impl GenerateResponse {
    /// `candidates[0].content.parts[0].text`
    pub fn first_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|c| c.parts.into_iter().next())
            .and_then(|p| p.text)
            .filter(|t| !t.trim().is_empty())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerateCandidate {
    #[serde(default)]
    pub content: Option<GenerateCandidateContent>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerateCandidateContent {
    #[serde(default)]
    pub parts: Vec<GenerateResponsePart>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerateResponsePart {
    #[serde(default)]
    pub text: Option<String>,
}

// ---------------------------------------------------------------------------
// Payment gateway
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerDetails {
    pub customer_id: String,
    #[serde(default)]
    pub customer_email: Option<String>,
    #[serde(default)]
    pub customer_phone: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderMeta {
    pub return_url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateOrderRequest {
    pub order_id: String,
    pub order_amount: f64,
    pub order_currency: String,
    pub customer_details: CustomerDetails,
    pub order_meta: OrderMeta,
    pub order_note: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateOrderResponse {
    #[serde(default)]
    pub order_id: Option<String>,
    #[serde(default)]
    pub payment_session_id: Option<String>,
    #[serde(default)]
    pub order_status: Option<String>,
}

/// `GET /orders/{order_id}`
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayOrder {
    pub order_id: String,
    #[serde(default)]
    pub order_status: Option<String>,
    #[serde(default)]
    pub order_amount: Option<Decimal>,
    #[serde(default)]
    pub order_note: Option<String>,
    #[serde(default)]
    pub customer_details: Option<CustomerDetails>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GatewayErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
}
