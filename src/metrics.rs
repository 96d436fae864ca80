use std::sync::OnceLock;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

static HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the Prometheus exporter and register all application metrics.
/// Returns a `PrometheusHandle` whose `render()` method produces the
/// text/plain Prometheus scrape payload. Safe to call more than once; the
/// recorder is installed on the first call only.
pub fn init_metrics() -> PrometheusHandle {
    HANDLE
        .get_or_init(|| {
            let handle = PrometheusBuilder::new().install_recorder().unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Prometheus recorder already installed, using a detached one");
                PrometheusBuilder::new().build_recorder().handle()
            });
            register();
            handle
        })
        .clone()
}

/// Pre-register counters so they appear even before the first increment.
fn register() {
    counter!("extractions_total").absolute(0);
    counter!("extraction_parse_fallbacks_total").absolute(0);
    counter!("trades_committed_total", "source" => "manual").absolute(0);
    counter!("trades_committed_total", "source" => "extraction").absolute(0);
    counter!("usage_limit_refusals_total").absolute(0);
    counter!("payment_orders_failed_total").absolute(0);
    counter!("webhook_rejected_total").absolute(0);

    // Histogram is lazily created on first record; force creation.
    histogram!("extraction_latency_seconds").record(0.0);
}
