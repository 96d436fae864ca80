use chrono::{DateTime, Months, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;

/// Database row for subscriptions table. One row per user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Subscription {
    pub user_id: String,
    pub plan_type: String,
    pub status: String,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub version: i64,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Subscription {
    pub fn plan(&self) -> PlanType {
        PlanType::from_api_str(&self.plan_type).unwrap_or(PlanType::Free)
    }

    pub fn is_active(&self) -> bool {
        self.status == subscription_status::ACTIVE
    }
}

/// Subscription status constants.
pub mod subscription_status {
    pub const ACTIVE: &str = "active";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanType {
    Free,
    Monthly,
    Yearly,
    Lifetime,
}

impl PlanType {
    pub fn from_api_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "free" => Some(PlanType::Free),
            "monthly" => Some(PlanType::Monthly),
            "yearly" => Some(PlanType::Yearly),
            "lifetime" => Some(PlanType::Lifetime),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PlanType::Free => "free",
            PlanType::Monthly => "monthly",
            PlanType::Yearly => "yearly",
            PlanType::Lifetime => "lifetime",
        }
    }

    /// Paid and lifetime plans upload without limit.
    pub fn is_unlimited(&self) -> bool {
        !matches!(self, PlanType::Free)
    }

    /// Access end for a plan starting at `start`. Free and lifetime never end.
    pub fn end_date_from(&self, start: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            PlanType::Monthly => start.checked_add_months(Months::new(1)),
            PlanType::Yearly => start.checked_add_months(Months::new(12)),
            PlanType::Free | PlanType::Lifetime => None,
        }
    }
}

impl fmt::Display for PlanType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
