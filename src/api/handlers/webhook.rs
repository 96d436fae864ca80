use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde_json::{json, Value};

use crate::errors::AppError;
use crate::payments::{apply_outcome, interpret_webhook, ApplyResult};
use crate::vendors::webhook_auth::{SIGNATURE_HEADER, TIMESTAMP_HEADER};
use crate::AppState;

/// The gateway probes the endpoint with a GET before enabling it.
pub async fn probe() -> impl IntoResponse {
    (StatusCode::OK, "Webhook endpoint is active")
}

/// Payment notifications. The signature is checked over the raw body before
/// anything is parsed; unsigned or mis-signed requests are refused.
pub async fn receive(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, AppError> {
    let verifier = state
        .webhook_verifier
        .as_ref()
        .ok_or_else(|| AppError::Unavailable("webhook secret is not configured".into()))?;

    let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());

    if let Err(e) = verifier.verify(header(TIMESTAMP_HEADER), &body, header(SIGNATURE_HEADER)) {
        metrics::counter!("webhook_rejected_total").increment(1);
        tracing::warn!(error = %e, "Payment webhook rejected");
        return Err(AppError::Unauthorized);
    }

    let payload: Value = serde_json::from_slice(&body)
        .map_err(|e| AppError::BadRequest(format!("invalid webhook JSON: {e}")))?;

    let outcome = interpret_webhook(&payload);
    tracing::info!(?outcome, "Payment webhook received");

    let result = apply_outcome(&state.db, &state.ws_tx, outcome).await?;

    let status = match result {
        ApplyResult::Activated(_) => "activated",
        ApplyResult::AlreadyConfirmed => "already_confirmed",
        ApplyResult::OrderClosed(_) => "order_closed",
        ApplyResult::Unresolved(reason) => {
            tracing::warn!(reason, "Paid notification could not be applied");
            "unresolved"
        }
        ApplyResult::Ignored => "ignored",
    };

    Ok(Json(json!({ "status": "ok", "result": status })))
}
