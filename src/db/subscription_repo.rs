use chrono::{DateTime, Utc};
use sqlx::{PgExecutor, PgPool};

use crate::models::{PlanType, Subscription};

/// The user's active subscription. No row is the ordinary free-tier state.
pub async fn get_active_subscription(
    pool: &PgPool,
    user_id: &str,
) -> anyhow::Result<Option<Subscription>> {
    let sub = sqlx::query_as::<_, Subscription>(
        "SELECT * FROM subscriptions WHERE user_id = $1 AND status = 'active'",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(sub)
}

pub async fn list_subscriptions(pool: &PgPool) -> anyhow::Result<Vec<Subscription>> {
    let subs = sqlx::query_as::<_, Subscription>("SELECT * FROM subscriptions ORDER BY user_id")
        .fetch_all(pool)
        .await?;

    Ok(subs)
}

/// Insert or replace the user's plan, marking it active. Every write bumps `version`
/// so listeners can drop notifications older than what they hold.
pub async fn upsert_subscription<'e, E>(
    executor: E,
    user_id: &str,
    plan: PlanType,
    start_date: DateTime<Utc>,
    end_date: Option<DateTime<Utc>>,
) -> anyhow::Result<Subscription>
where
    E: PgExecutor<'e>,
{
    let sub = sqlx::query_as::<_, Subscription>(
        r#"
        INSERT INTO subscriptions (user_id, plan_type, status, start_date, end_date, version, updated_at)
        VALUES ($1, $2, 'active', $3, $4, 1, NOW())
        ON CONFLICT (user_id) DO UPDATE
            SET plan_type = EXCLUDED.plan_type,
                status = 'active',
                start_date = EXCLUDED.start_date,
                end_date = EXCLUDED.end_date,
                version = subscriptions.version + 1,
                updated_at = NOW()
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(plan.as_str())
    .bind(start_date)
    .bind(end_date)
    .fetch_one(executor)
    .await?;

    Ok(sub)
}
