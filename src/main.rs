use std::time::Duration;

use tokio::sync::broadcast;

use mypnl::api::router::create_router;
use mypnl::api::ws_types::WsMessage;
use mypnl::config::AppConfig;
use mypnl::{db, metrics, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = AppConfig::from_env()?;
    let addr = format!("{}:{}", config.host, config.port);

    tracing::info!("Connecting to database...");
    let db = db::init_pool(&config.database_url).await?;
    tracing::info!("Database connected");

    let metrics_handle = metrics::init_metrics();

    if !config.has_extraction_keys() {
        tracing::warn!("OCR_API_KEY / LLM_API_KEY not set, screenshot extraction disabled");
    }
    if !config.has_gateway_auth() {
        tracing::warn!("Gateway credentials not set, payment orders disabled");
    }
    if config.gateway_webhook_secret.is_none() {
        tracing::warn!("GATEWAY_WEBHOOK_SECRET not set, payment webhooks will be refused");
    }

    tokio::fs::create_dir_all(&config.storage_dir).await?;

    let draft_idle = Duration::from_secs(config.draft_idle_secs);

    let (ws_tx, _) = broadcast::channel::<WsMessage>(256);
    let state = AppState::build(db, config, ws_tx, metrics_handle, reqwest::Client::new());

    tokio::spawn(state.drafts.clone().run_sweeper(draft_idle));
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {addr}");
    axum::serve(listener, router).await?;

    Ok(())
}

/// `RUST_LOG` filters; `LOG_FORMAT=json` switches to one JSON object per line.
fn init_tracing() {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json")) {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }
}
