use std::str::FromStr;

use rust_decimal::Decimal;
use serde_json::Value;

use super::plans::{plan_for_amount, plan_from_note};
use crate::models::PlanType;

const PAID: &str = "PAID";
const FAILED: &str = "FAILED";
const EXPIRED: &str = "EXPIRED";
const FAILED_EVENT: &str = "PAYMENT_FAILED_WEBHOOK";

/// What a verified gateway notification asks us to do.
#[derive(Debug, Clone, PartialEq)]
pub enum WebhookOutcome {
    Paid {
        order_id: Option<String>,
        user_id: Option<String>,
        amount: Option<Decimal>,
        /// Plan read from the amount, else the order note, else the order tags.
        plan: Option<PlanType>,
    },
    Failed {
        order_id: Option<String>,
        reason: Option<String>,
    },
    Expired {
        order_id: Option<String>,
    },
    Ignored {
        event_type: Option<String>,
        order_status: Option<String>,
    },
}

/// Classify a notification payload. Payload shapes differ by event type, so
/// every field is optional here and resolved against the stored order later.
pub fn interpret_webhook(payload: &Value) -> WebhookOutcome {
    let event_type = str_at(payload, &["type"])
        .or_else(|| str_at(payload, &["event_type"]))
        .map(str::to_string);

    let order = payload.pointer("/data/order");
    let order_status = order
        .and_then(|o| o.get("order_status"))
        .and_then(Value::as_str)
        .map(str::to_string);
    let order_id = order
        .and_then(|o| o.get("order_id"))
        .and_then(Value::as_str)
        .map(str::to_string);

    let failed = event_type.as_deref() == Some(FAILED_EVENT)
        || order_status.as_deref() == Some(FAILED);

    if failed {
        let reason = str_at(payload, &["data", "payment", "payment_message"])
            .or_else(|| str_at(payload, &["data", "error_details", "error_description"]))
            .map(str::to_string);
        return WebhookOutcome::Failed { order_id, reason };
    }

    if order_status.as_deref() == Some(EXPIRED) {
        return WebhookOutcome::Expired { order_id };
    }

    if order_status.as_deref() != Some(PAID) {
        return WebhookOutcome::Ignored {
            event_type,
            order_status,
        };
    }

    let user_id = str_at(payload, &["data", "customer_details", "customer_id"])
        .or_else(|| str_at(payload, &["data", "customer", "customer_id"]))
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string);

    let amount = order.and_then(|o| o.get("order_amount")).and_then(decimal);

    let plan = amount
        .and_then(plan_for_amount)
        .or_else(|| {
            order
                .and_then(|o| o.get("order_note"))
                .and_then(Value::as_str)
                .and_then(plan_from_note)
        })
        .or_else(|| {
            order
                .and_then(|o| o.pointer("/order_tags/plan_name"))
                .and_then(Value::as_str)
                .and_then(PlanType::from_api_str)
                .filter(PlanType::is_unlimited)
        });

    WebhookOutcome::Paid {
        order_id,
        user_id,
        amount,
        plan,
    }
}

fn str_at<'a>(value: &'a Value, path: &[&str]) -> Option<&'a str> {
    path.iter()
        .try_fold(value, |v, key| v.get(key))
        .and_then(Value::as_str)
}

/// Amounts arrive as JSON numbers or numeric strings.
fn decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => Decimal::from_str(&n.to_string()).ok(),
        Value::String(s) => Decimal::from_str(s.trim()).ok(),
        _ => None,
    }
}
