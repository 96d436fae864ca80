use chrono::Utc;
use metrics::counter;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tokio::sync::broadcast;
use tokio::time::{interval, Duration, Instant};

use super::plans::{generate_order_id, plan_price};
use super::webhook::WebhookOutcome;
use crate::api::ws_types::{SubscriptionEvent, WsMessage};
use crate::config::AppConfig;
use crate::db::{payment_repo, subscription_repo};
use crate::errors::AppError;
use crate::models::{PaymentState, PlanType, Subscription};
use crate::vendors::types::{CreateOrderRequest, CustomerDetails, OrderMeta};
use crate::vendors::GatewayClient;

pub const PENDING_MESSAGE: &str = "pending — will update automatically";

#[derive(Debug, Clone, Deserialize)]
pub struct NewOrder {
    pub plan: PlanType,
    #[serde(default)]
    pub phone: Option<String>,
}

/// What the browser needs to open the hosted checkout.
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutSession {
    pub order_id: String,
    pub payment_session_id: String,
    pub plan: PlanType,
    pub amount: Decimal,
    pub currency: String,
}

/// Record the order, then ask the gateway for a checkout session.
/// Gateway refusal marks the order failed and surfaces the gateway's message.
pub async fn create_order(
    pool: &PgPool,
    gateway: &GatewayClient,
    config: &AppConfig,
    user_id: &str,
    email: Option<&str>,
    req: &NewOrder,
) -> Result<CheckoutSession, AppError> {
    let amount = plan_price(req.plan)
        .ok_or_else(|| AppError::BadRequest(format!("plan '{}' cannot be purchased", req.plan)))?;

    let order_id = generate_order_id(user_id, Utc::now().timestamp_millis());
    payment_repo::insert_order(pool, &order_id, user_id, req.plan, amount, &config.payment_currency)
        .await?;

    let request = CreateOrderRequest {
        order_id: order_id.clone(),
        order_amount: amount.to_f64().unwrap_or_default(),
        order_currency: config.payment_currency.clone(),
        customer_details: CustomerDetails {
            customer_id: user_id.to_string(),
            customer_email: email.map(str::to_string),
            customer_phone: req.phone.clone(),
        },
        order_meta: OrderMeta {
            return_url: config.payment_return_url.clone(),
        },
        order_note: format!("MyPnL {} plan", req.plan),
    };

    let created = match gateway.create_order(&request).await {
        Ok(created) => created,
        Err(e) => {
            let message = e.to_string();
            payment_repo::transition(pool, &order_id, PaymentState::Failed, None, Some(&message))
                .await?;
            counter!("payment_orders_failed_total").increment(1);
            tracing::warn!(user_id, order_id = %order_id, error = %message, "Gateway refused order");
            return Err(e.into());
        }
    };

    if created.order_id.as_deref().is_some_and(|id| id != order_id) {
        tracing::warn!(order_id = %order_id, gateway_order_id = ?created.order_id, "Gateway echoed a different order id");
    }

    // create_order guarantees a session id
    let session_id = created.payment_session_id.unwrap_or_default();

    // The webhook may already have confirmed it; then the order stays confirmed.
    if payment_repo::transition(pool, &order_id, PaymentState::Pending, Some(&session_id), None)
        .await?
        .is_none()
    {
        tracing::info!(order_id = %order_id, "Order left its created state before the session returned");
    }

    counter!("payment_orders_created_total", "plan" => req.plan.as_str()).increment(1);
    tracing::info!(
        user_id,
        order_id = %order_id,
        plan = %req.plan,
        amount = %amount,
        gateway_status = ?created.order_status,
        "Payment order created"
    );

    Ok(CheckoutSession {
        order_id,
        payment_session_id: session_id,
        plan: req.plan,
        amount,
        currency: config.payment_currency.clone(),
    })
}

#[derive(Debug, Clone, PartialEq)]
pub enum ApplyResult {
    Activated(Subscription),
    AlreadyConfirmed,
    OrderClosed(PaymentState),
    /// Paid, but the payload and the stored order together do not name a user and plan.
    Unresolved(&'static str),
    Ignored,
}

/// Act on a verified notification. This is the only writer of `confirmed` and of
/// payment failures; subscription and order move together in one transaction.
pub async fn apply_outcome(
    pool: &PgPool,
    ws_tx: &broadcast::Sender<WsMessage>,
    outcome: WebhookOutcome,
) -> anyhow::Result<ApplyResult> {
    match outcome {
        WebhookOutcome::Paid {
            order_id,
            user_id,
            amount,
            plan,
        } => {
            let mut tx = pool.begin().await?;

            let stored = match order_id.as_deref() {
                Some(id) => payment_repo::get_order(&mut *tx, id).await?,
                None => None,
            };

            if stored.as_ref().and_then(|o| o.state()) == Some(PaymentState::Confirmed) {
                tracing::info!(order_id = ?order_id, "Duplicate payment notification acknowledged");
                return Ok(ApplyResult::AlreadyConfirmed);
            }

            if let (Some(paid), Some(order)) = (amount, &stored) {
                if paid != order.amount {
                    tracing::warn!(
                        order_id = %order.order_id,
                        paid = %paid,
                        expected = %order.amount,
                        "Paid amount differs from the order amount"
                    );
                }
            }

            let Some(user_id) = user_id.or_else(|| stored.as_ref().map(|o| o.user_id.clone()))
            else {
                tracing::warn!(order_id = ?order_id, "Paid notification without a customer");
                return Ok(ApplyResult::Unresolved("no customer id"));
            };

            let plan = plan.or_else(|| {
                stored
                    .as_ref()
                    .and_then(|o| PlanType::from_api_str(&o.plan_type))
                    .filter(PlanType::is_unlimited)
            });
            let Some(plan) = plan else {
                tracing::warn!(user_id = %user_id, order_id = ?order_id, "Paid notification for an unknown plan");
                return Ok(ApplyResult::Unresolved("unknown plan"));
            };

            let now = Utc::now();
            let sub = subscription_repo::upsert_subscription(
                &mut *tx,
                &user_id,
                plan,
                now,
                plan.end_date_from(now),
            )
            .await?;

            if let Some(order) = &stored {
                if payment_repo::transition(
                    &mut *tx,
                    &order.order_id,
                    PaymentState::Confirmed,
                    None,
                    None,
                )
                .await?
                .is_none()
                {
                    tracing::warn!(
                        order_id = %order.order_id,
                        status = %order.status,
                        "Payment received for an order that can no longer be confirmed"
                    );
                }
            }

            tx.commit().await?;

            counter!("payments_confirmed_total", "plan" => plan.as_str()).increment(1);
            tracing::info!(
                user_id = %user_id,
                order_id = ?order_id,
                plan = %plan,
                version = sub.version,
                "Subscription activated from payment"
            );

            publish_subscription(ws_tx, &sub);
            Ok(ApplyResult::Activated(sub))
        }

        WebhookOutcome::Failed { order_id, reason } => {
            close_order(pool, order_id, PaymentState::Failed, reason.as_deref()).await
        }

        WebhookOutcome::Expired { order_id } => {
            close_order(pool, order_id, PaymentState::Expired, None).await
        }

        WebhookOutcome::Ignored {
            event_type,
            order_status,
        } => {
            tracing::debug!(?event_type, ?order_status, "Payment notification ignored");
            Ok(ApplyResult::Ignored)
        }
    }
}

async fn close_order(
    pool: &PgPool,
    order_id: Option<String>,
    to: PaymentState,
    reason: Option<&str>,
) -> anyhow::Result<ApplyResult> {
    let Some(order_id) = order_id else {
        return Ok(ApplyResult::Ignored);
    };

    match payment_repo::transition(pool, &order_id, to, None, reason).await? {
        Some(_) => {
            counter!("payments_closed_total", "state" => to.as_str()).increment(1);
            tracing::info!(order_id = %order_id, state = %to, "Payment order closed");
            Ok(ApplyResult::OrderClosed(to))
        }
        None => {
            tracing::debug!(order_id = %order_id, state = %to, "No open order to close");
            Ok(ApplyResult::Ignored)
        }
    }
}

/// Push a subscription change to the owner's sockets. Nobody listening is fine.
pub fn publish_subscription(ws_tx: &broadcast::Sender<WsMessage>, sub: &Subscription) {
    let _ = ws_tx.send(WsMessage::SubscriptionUpdated(SubscriptionEvent::from(sub)));
}

#[derive(Debug, Clone, Serialize)]
pub struct ConfirmationStatus {
    pub order_id: String,
    pub state: PaymentState,
    pub message: String,
    /// The gateway's own status, reported only while we still show pending.
    pub gateway_status: Option<String>,
}

impl ConfirmationStatus {
    fn settled(order_id: &str, state: PaymentState) -> Self {
        Self {
            order_id: order_id.to_string(),
            state,
            message: state.as_str().to_string(),
            gateway_status: None,
        }
    }
}

/// Watch the stored order until it settles or the window closes. Reads only:
/// confirmation is written by the webhook alone.
pub async fn await_confirmation(
    pool: &PgPool,
    gateway: Option<&GatewayClient>,
    user_id: &str,
    order_id: &str,
    poll_interval: Duration,
    window: Duration,
) -> Result<ConfirmationStatus, AppError> {
    let deadline = Instant::now() + window;
    let mut ticker = interval(poll_interval);

    let mut state = loop {
        ticker.tick().await;

        let order = payment_repo::get_order_for_user(pool, order_id, user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("order {order_id}")))?;
        let state = order.state().unwrap_or(PaymentState::Pending);

        if state.is_terminal() {
            return Ok(ConfirmationStatus::settled(order_id, state));
        }
        if Instant::now() >= deadline {
            break state;
        }
    };

    if state == PaymentState::Created {
        state = PaymentState::Pending;
    }

    let gateway_status = match gateway {
        Some(gw) => match gw.fetch_order(order_id).await {
            Ok(order) => order.order_status,
            Err(e) => {
                tracing::warn!(order_id, error = %e, "Gateway status lookup failed");
                None
            }
        },
        None => None,
    };

    Ok(ConfirmationStatus {
        order_id: order_id.to_string(),
        state,
        message: PENDING_MESSAGE.to_string(),
        gateway_status,
    })
}
