pub mod gateway_client;
pub mod llm_client;
pub mod ocr_client;
pub mod types;
pub mod webhook_auth;

pub use gateway_client::{GatewayClient, GatewayCredentials, GatewayError};
pub use llm_client::{LlmClient, LlmError};
pub use ocr_client::{OcrClient, OcrError};
pub use webhook_auth::{SignatureError, WebhookVerifier};
