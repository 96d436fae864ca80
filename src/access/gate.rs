use serde::Serialize;
use sqlx::PgPool;

use crate::db::{subscription_repo, trade_repo};
use crate::models::PlanType;

/// Whether a user on `plan` with `count` stored trades may record another one.
pub fn admitted(count: i64, plan: PlanType, free_limit: i64) -> bool {
    plan.is_unlimited() || count < free_limit
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UsageDecision {
    pub uploads_count: i64,
    pub free_limit: i64,
    pub has_reached_limit: bool,
    pub admitted: bool,
    pub plan_type: PlanType,
}

impl UsageDecision {
    pub fn new(uploads_count: i64, plan: PlanType, free_limit: i64) -> Self {
        Self {
            uploads_count,
            free_limit,
            has_reached_limit: uploads_count >= free_limit,
            admitted: admitted(uploads_count, plan, free_limit),
            plan_type: plan,
        }
    }
}

/// Recount the user's trades and read their plan. Called before every recording
/// path, never cached.
///
/// A failed count is treated as zero so an unreachable counter never locks
/// anyone out; a failed plan lookup falls back to free.
pub async fn evaluate(pool: &PgPool, user_id: &str, free_limit: i64) -> UsageDecision {
    let count = match trade_repo::count_trades_for_user(pool, user_id).await {
        Ok(n) => n,
        Err(e) => {
            tracing::warn!(user_id, error = %e, "Usage count failed, admitting");
            0
        }
    };

    let plan = match subscription_repo::get_active_subscription(pool, user_id).await {
        Ok(Some(sub)) => sub.plan(),
        Ok(None) => PlanType::Free,
        Err(e) => {
            tracing::warn!(user_id, error = %e, "Subscription lookup failed, treating as free");
            PlanType::Free
        }
    };

    let decision = UsageDecision::new(count, plan, free_limit);
    tracing::debug!(
        user_id,
        count,
        plan = %plan,
        admitted = decision.admitted,
        "Usage gate evaluated"
    );
    decision
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn free_users_stop_at_the_limit() {
        assert!(admitted(0, PlanType::Free, 10));
        assert!(admitted(9, PlanType::Free, 10));
        assert!(!admitted(10, PlanType::Free, 10));
        assert!(!admitted(25, PlanType::Free, 10));
    }

    #[test]
    fn paid_plans_are_never_refused() {
        for plan in [PlanType::Monthly, PlanType::Yearly, PlanType::Lifetime] {
            for count in [0, 10, 10_000] {
                assert!(admitted(count, plan, 10), "{plan} refused at {count}");
            }
        }
    }

    #[test]
    fn decision_reports_limit_separately_from_admission() {
        let d = UsageDecision::new(12, PlanType::Yearly, 10);
        assert!(d.has_reached_limit);
        assert!(d.admitted);

        let d = UsageDecision::new(10, PlanType::Free, 10);
        assert!(d.has_reached_limit);
        assert!(!d.admitted);
    }
}
