pub mod access;
pub mod api;
pub mod config;
pub mod db;
pub mod errors;
pub mod extraction;
pub mod journal;
pub mod metrics;
pub mod models;
pub mod payments;
pub mod storage;
pub mod vendors;

use tokio::sync::broadcast;

use crate::api::ws_types::WsMessage;
use crate::config::AppConfig;
use crate::extraction::{DraftStore, ExtractionPipeline};
use crate::journal::TradeWriter;
use crate::storage::ScreenshotStore;
use crate::vendors::{GatewayClient, GatewayCredentials, LlmClient, OcrClient, WebhookVerifier};

#[derive(Clone)]
pub struct AppState {
    pub db: sqlx::PgPool,
    pub config: AppConfig,
    pub ws_tx: broadcast::Sender<WsMessage>,
    pub metrics_handle: metrics_exporter_prometheus::PrometheusHandle,
    pub drafts: DraftStore,
    pub store: ScreenshotStore,
    pub writer: TradeWriter,
    /// None without OCR and model keys; extraction then answers 503.
    pub extraction: Option<ExtractionPipeline>,
    pub gateway: Option<GatewayClient>,
    pub webhook_verifier: Option<WebhookVerifier>,
}

impl AppState {
    /// Wire up every component from configuration. Vendors whose keys are
    /// missing are left out and their endpoints report themselves unavailable.
    pub fn build(
        db: sqlx::PgPool,
        config: AppConfig,
        ws_tx: broadcast::Sender<WsMessage>,
        metrics_handle: metrics_exporter_prometheus::PrometheusHandle,
        http: reqwest::Client,
    ) -> Self {
        let store = ScreenshotStore::new(&config.storage_dir, &config.public_base_url);
        let writer = TradeWriter::new(db.clone(), store.clone());

        let extraction = match (&config.ocr_api_key, &config.llm_api_key) {
            (Some(ocr_key), Some(llm_key)) => Some(ExtractionPipeline::new(
                OcrClient::new(http.clone(), &config.ocr_api_url, ocr_key),
                LlmClient::new(http.clone(), &config.llm_api_url, llm_key),
            )),
            _ => None,
        };

        let gateway = match (&config.gateway_client_id, &config.gateway_client_secret) {
            (Some(id), Some(secret)) => Some(GatewayClient::new(
                http,
                GatewayCredentials {
                    client_id: id.clone(),
                    client_secret: secret.clone(),
                    api_version: config.gateway_api_version.clone(),
                },
                &config.gateway_base_url,
            )),
            _ => None,
        };

        let webhook_verifier = config
            .gateway_webhook_secret
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(WebhookVerifier::new);

        Self {
            db,
            config,
            ws_tx,
            metrics_handle,
            drafts: DraftStore::new(),
            store,
            writer,
            extraction,
            gateway,
            webhook_verifier,
        }
    }
}
