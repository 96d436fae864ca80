use rust_decimal::Decimal;
use sqlx::{PgExecutor, PgPool};

use crate::models::{PaymentOrder, PaymentState, PlanType};

const ALL_STATES: [PaymentState; 5] = [
    PaymentState::Created,
    PaymentState::Pending,
    PaymentState::Confirmed,
    PaymentState::Failed,
    PaymentState::Expired,
];

/// Record a freshly generated order before the gateway is called.
pub async fn insert_order(
    pool: &PgPool,
    order_id: &str,
    user_id: &str,
    plan: PlanType,
    amount: Decimal,
    currency: &str,
) -> anyhow::Result<PaymentOrder> {
    let order = sqlx::query_as::<_, PaymentOrder>(
        r#"
        INSERT INTO payment_orders (order_id, user_id, plan_type, amount, currency, status)
        VALUES ($1, $2, $3, $4, $5, 'created')
        RETURNING *
        "#,
    )
    .bind(order_id)
    .bind(user_id)
    .bind(plan.as_str())
    .bind(amount)
    .bind(currency)
    .fetch_one(pool)
    .await?;

    Ok(order)
}

pub async fn get_order<'e, E>(executor: E, order_id: &str) -> anyhow::Result<Option<PaymentOrder>>
where
    E: PgExecutor<'e>,
{
    let order =
        sqlx::query_as::<_, PaymentOrder>("SELECT * FROM payment_orders WHERE order_id = $1")
            .bind(order_id)
            .fetch_optional(executor)
            .await?;

    Ok(order)
}

pub async fn get_order_for_user(
    pool: &PgPool,
    order_id: &str,
    user_id: &str,
) -> anyhow::Result<Option<PaymentOrder>> {
    let order = sqlx::query_as::<_, PaymentOrder>(
        "SELECT * FROM payment_orders WHERE order_id = $1 AND user_id = $2",
    )
    .bind(order_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(order)
}

/// Move an order to `to` if its current state allows it. Returns `None` when the
/// order does not exist or sits in a state that cannot move to `to`.
pub async fn transition<'e, E>(
    executor: E,
    order_id: &str,
    to: PaymentState,
    payment_session_id: Option<&str>,
    error_message: Option<&str>,
) -> anyhow::Result<Option<PaymentOrder>>
where
    E: PgExecutor<'e>,
{
    let from: Vec<String> = ALL_STATES
        .iter()
        .filter(|s| s.can_transition_to(to))
        .map(|s| s.as_str().to_string())
        .collect();

    let order = sqlx::query_as::<_, PaymentOrder>(
        r#"
        UPDATE payment_orders
        SET status = $2,
            payment_session_id = COALESCE($3, payment_session_id),
            error_message = COALESCE($4, error_message),
            updated_at = NOW()
        WHERE order_id = $1 AND status = ANY($5)
        RETURNING *
        "#,
    )
    .bind(order_id)
    .bind(to.as_str())
    .bind(payment_session_id)
    .bind(error_message)
    .bind(from)
    .fetch_optional(executor)
    .await?;

    Ok(order)
}
