use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

pub const SIGNATURE_HEADER: &str = "x-webhook-signature";
pub const TIMESTAMP_HEADER: &str = "x-webhook-timestamp";

#[derive(Debug, Error)]
pub enum SignatureError {
    #[error("missing {0} header")]
    MissingHeader(&'static str),

    #[error("signature is not valid base64")]
    Malformed(#[from] base64::DecodeError),

    #[error("signature mismatch")]
    Mismatch,

    #[error("HMAC computation failed: {0}")]
    HmacError(String),
}

/// Verifies payment-gateway webhook signatures.
///
/// signature = base64(HMAC-SHA256(secret, `{timestamp}{raw body}`))
#[derive(Clone)]
pub struct WebhookVerifier {
    secret: String,
}

impl std::fmt::Debug for WebhookVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookVerifier").finish_non_exhaustive()
    }
}

impl WebhookVerifier {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    fn mac(&self, timestamp: &str, body: &[u8]) -> Result<HmacSha256, SignatureError> {
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .map_err(|e| SignatureError::HmacError(e.to_string()))?;
        mac.update(timestamp.as_bytes());
        mac.update(body);
        Ok(mac)
    }

    pub fn sign(&self, timestamp: &str, body: &[u8]) -> Result<String, SignatureError> {
        let result = self.mac(timestamp, body)?.finalize();
        Ok(BASE64.encode(result.into_bytes()))
    }

    /// Check a signature over the raw request body. Comparison is constant-time.
    pub fn verify(
        &self,
        timestamp: Option<&str>,
        body: &[u8],
        signature: Option<&str>,
    ) -> Result<(), SignatureError> {
        let timestamp = timestamp.ok_or(SignatureError::MissingHeader(TIMESTAMP_HEADER))?;
        let signature = signature.ok_or(SignatureError::MissingHeader(SIGNATURE_HEADER))?;

        let expected = BASE64.decode(signature.trim())?;

        self.mac(timestamp, body)?
            .verify_slice(&expected)
            .map_err(|_| SignatureError::Mismatch)
    }
}
