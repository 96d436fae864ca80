use axum::extract::{Path, State};
use axum::Json;
use tokio::time::Duration;

use super::ApiResponse;
use crate::api::auth::AuthUser;
use crate::db::payment_repo;
use crate::errors::AppError;
use crate::models::PaymentOrder;
use crate::payments::{self, CheckoutSession, ConfirmationStatus, NewOrder};
use crate::AppState;

pub async fn create_order(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<NewOrder>,
) -> Result<Json<ApiResponse<CheckoutSession>>, AppError> {
    let gateway = state
        .gateway
        .as_ref()
        .ok_or_else(|| AppError::Unavailable("payments are not configured".into()))?;

    let session = payments::create_order(
        &state.db,
        gateway,
        &state.config,
        &user.id,
        user.email.as_deref(),
        &req,
    )
    .await?;

    Ok(Json(ApiResponse::ok(session)))
}

/// Stored state of one of the caller's orders.
pub async fn get_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(order_id): Path<String>,
) -> Result<Json<ApiResponse<PaymentOrder>>, AppError> {
    let order = payment_repo::get_order_for_user(&state.db, &order_id, &user.id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {order_id}")))?;

    Ok(Json(ApiResponse::ok(order)))
}

/// Return-page poll: waits for the webhook to settle the order, up to the configured window.
pub async fn await_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(order_id): Path<String>,
) -> Result<Json<ApiResponse<ConfirmationStatus>>, AppError> {
    let status = payments::await_confirmation(
        &state.db,
        state.gateway.as_ref(),
        &user.id,
        &order_id,
        Duration::from_secs(state.config.payment_poll_interval_secs.max(1)),
        Duration::from_secs(state.config.payment_poll_window_secs),
    )
    .await?;

    Ok(Json(ApiResponse::ok(status)))
}
