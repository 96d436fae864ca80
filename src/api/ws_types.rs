use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::Subscription;

/// Messages pushed to connected WebSocket clients.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum WsMessage {
    #[serde(rename = "subscription_updated")]
    SubscriptionUpdated(SubscriptionEvent),
}

impl WsMessage {
    /// The user a message concerns; each socket only receives its own.
    pub fn user_id(&self) -> &str {
        match self {
            WsMessage::SubscriptionUpdated(e) => &e.user_id,
        }
    }
}

/// Snapshot of a subscription row after a write. Clients keep the highest
/// `version` they have seen and drop anything older.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubscriptionEvent {
    pub user_id: String,
    pub plan_type: String,
    pub status: String,
    pub end_date: Option<DateTime<Utc>>,
    pub version: i64,
}

impl From<&Subscription> for SubscriptionEvent {
    fn from(sub: &Subscription) -> Self {
        Self {
            user_id: sub.user_id.clone(),
            plan_type: sub.plan_type.clone(),
            status: sub.status.clone(),
            end_date: sub.end_date,
            version: sub.version,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_tagged() {
        let msg = WsMessage::SubscriptionUpdated(SubscriptionEvent {
            user_id: "u1".into(),
            plan_type: "yearly".into(),
            status: "active".into(),
            end_date: None,
            version: 3,
        });

        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "subscription_updated");
        assert_eq!(json["data"]["version"], 3);
        assert_eq!(msg.user_id(), "u1");
    }
}
