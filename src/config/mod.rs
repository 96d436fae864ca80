use std::env;

const DEFAULT_OCR_URL: &str = "https://api.ocr.space/parse/image";
const DEFAULT_LLM_URL: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent";
const DEFAULT_GATEWAY_URL: &str = "https://sandbox.cashfree.com/pg";
const DEFAULT_GATEWAY_API_VERSION: &str = "2023-08-01";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,

    // Usage gate
    pub free_upload_limit: i64,

    // Unsaved drafts are dropped after this long without an edit
    pub draft_idle_secs: u64,

    // OCR / generative-language vendors; extraction answers 503 without them
    pub ocr_api_url: String,
    pub ocr_api_key: Option<String>,
    pub llm_api_url: String,
    pub llm_api_key: Option<String>,

    // Screenshot storage
    pub storage_dir: String,
    pub public_base_url: String,

    // Payment gateway
    pub gateway_base_url: String,
    pub gateway_api_version: String,
    pub gateway_client_id: Option<String>,
    pub gateway_client_secret: Option<String>,
    pub gateway_webhook_secret: Option<String>,
    pub payment_return_url: String,
    pub payment_currency: String,

    // Reconciliation poll
    pub payment_poll_interval_secs: u64,
    pub payment_poll_window_secs: u64,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let public_base_url = env::var("PUBLIC_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:8080".into())
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            database_url: env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?,
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".into())
                .parse()?,

            free_upload_limit: env::var("FREE_UPLOAD_LIMIT")
                .unwrap_or_else(|_| "10".into())
                .parse()
                .unwrap_or(10),
            draft_idle_secs: env::var("DRAFT_IDLE_SECS")
                .unwrap_or_else(|_| "21600".into())
                .parse()
                .unwrap_or(21600),

            ocr_api_url: env::var("OCR_API_URL").unwrap_or_else(|_| DEFAULT_OCR_URL.into()),
            ocr_api_key: env::var("OCR_API_KEY").ok(),
            llm_api_url: env::var("LLM_API_URL").unwrap_or_else(|_| DEFAULT_LLM_URL.into()),
            llm_api_key: env::var("LLM_API_KEY").ok(),

            storage_dir: env::var("STORAGE_DIR").unwrap_or_else(|_| "./storage".into()),
            payment_return_url: env::var("PAYMENT_RETURN_URL").unwrap_or_else(|_| {
                format!("{public_base_url}/payment-status?order_id={{order_id}}")
            }),
            public_base_url,

            gateway_base_url: env::var("GATEWAY_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_GATEWAY_URL.into()),
            gateway_api_version: env::var("GATEWAY_API_VERSION")
                .unwrap_or_else(|_| DEFAULT_GATEWAY_API_VERSION.into()),
            gateway_client_id: env::var("GATEWAY_CLIENT_ID").ok(),
            gateway_client_secret: env::var("GATEWAY_CLIENT_SECRET").ok(),
            gateway_webhook_secret: env::var("GATEWAY_WEBHOOK_SECRET").ok(),
            payment_currency: env::var("PAYMENT_CURRENCY").unwrap_or_else(|_| "INR".into()),

            payment_poll_interval_secs: env::var("PAYMENT_POLL_INTERVAL_SECS")
                .unwrap_or_else(|_| "2".into())
                .parse()
                .unwrap_or(2),
            payment_poll_window_secs: env::var("PAYMENT_POLL_WINDOW_SECS")
                .unwrap_or_else(|_| "20".into())
                .parse()
                .unwrap_or(20),
        })
    }

    /// Returns true if both vendor keys needed for screenshot extraction are configured.
    pub fn has_extraction_keys(&self) -> bool {
        self.ocr_api_key.is_some() && self.llm_api_key.is_some()
    }

    /// Returns true if the payment gateway order API credentials are configured.
    pub fn has_gateway_auth(&self) -> bool {
        self.gateway_client_id.is_some() && self.gateway_client_secret.is_some()
    }

    /// Minimal configuration for tests and local tooling; every vendor disabled.
    pub fn for_database(database_url: impl Into<String>) -> Self {
        let public_base_url = "http://localhost:8080".to_string();
        Self {
            database_url: database_url.into(),
            host: "127.0.0.1".into(),
            port: 0,
            free_upload_limit: 10,
            draft_idle_secs: 21600,
            ocr_api_url: DEFAULT_OCR_URL.into(),
            ocr_api_key: None,
            llm_api_url: DEFAULT_LLM_URL.into(),
            llm_api_key: None,
            storage_dir: "./storage".into(),
            payment_return_url: format!("{public_base_url}/payment-status?order_id={{order_id}}"),
            public_base_url,
            gateway_base_url: DEFAULT_GATEWAY_URL.into(),
            gateway_api_version: DEFAULT_GATEWAY_API_VERSION.into(),
            gateway_client_id: None,
            gateway_client_secret: None,
            gateway_webhook_secret: None,
            payment_currency: "INR".into(),
            payment_poll_interval_secs: 2,
            payment_poll_window_secs: 20,
        }
    }
}
