use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;

/// Database row for payment_orders table.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PaymentOrder {
    pub order_id: String,
    pub user_id: String,
    pub plan_type: String,
    pub amount: Decimal,
    pub currency: String,
    pub status: String,
    pub payment_session_id: Option<String>,
    pub error_message: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl PaymentOrder {
    pub fn state(&self) -> Option<PaymentState> {
        PaymentState::from_api_str(&self.status)
    }
}

/// created → pending → confirmed | failed | expired
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentState {
    Created,
    Pending,
    Confirmed,
    Failed,
    Expired,
}

impl PaymentState {
    pub fn from_api_str(s: &str) -> Option<Self> {
        match s {
            "created" => Some(PaymentState::Created),
            "pending" => Some(PaymentState::Pending),
            "confirmed" => Some(PaymentState::Confirmed),
            "failed" => Some(PaymentState::Failed),
            "expired" => Some(PaymentState::Expired),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentState::Created => "created",
            PaymentState::Pending => "pending",
            PaymentState::Confirmed => "confirmed",
            PaymentState::Failed => "failed",
            PaymentState::Expired => "expired",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PaymentState::Confirmed | PaymentState::Failed | PaymentState::Expired
        )
    }

    pub fn can_transition_to(&self, next: PaymentState) -> bool {
        use PaymentState::*;
        matches!(
            (self, next),
            (Created, Pending)
                | (Created, Failed)
                | (Pending, Confirmed)
                | (Pending, Failed)
                | (Pending, Expired)
                // the webhook can beat the order-creation response back
                | (Created, Confirmed)
        )
    }
}

impl fmt::Display for PaymentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
