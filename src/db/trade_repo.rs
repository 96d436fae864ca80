use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::models::{NewTrade, TradeRecord};

/// Insert a single trade for a user.
pub async fn insert_trade(
    pool: &PgPool,
    user_id: &str,
    trade: &NewTrade,
    screenshot_url: Option<&str>,
) -> anyhow::Result<TradeRecord> {
    let record = sqlx::query_as::<_, TradeRecord>(
        r#"
        INSERT INTO trades (user_id, symbol, trade_type, entry_price, exit_price, lot_size, pnl,
                            trade_date, strategy_tag, notes, screenshot_url)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(&trade.symbol)
    .bind(trade.trade_type.map(|t| t.as_str()))
    .bind(trade.entry_price)
    .bind(trade.exit_price)
    .bind(trade.lot_size)
    .bind(trade.pnl)
    .bind(trade.trade_date)
    .bind(trade.strategy_tag.as_deref())
    .bind(trade.notes.as_deref())
    .bind(screenshot_url)
    .fetch_one(pool)
    .await?;

    Ok(record)
}

/// Insert many trades in one multi-row statement: either every row lands or none do.
pub async fn insert_trades(
    pool: &PgPool,
    user_id: &str,
    trades: &[NewTrade],
    screenshot_url: Option<&str>,
) -> anyhow::Result<Vec<TradeRecord>> {
    if trades.is_empty() {
        return Ok(Vec::new());
    }

    let mut qb = QueryBuilder::<Postgres>::new(
        "INSERT INTO trades (user_id, symbol, trade_type, entry_price, exit_price, lot_size, pnl, \
         trade_date, strategy_tag, notes, screenshot_url) ",
    );

    qb.push_values(trades, |mut row, trade| {
        row.push_bind(user_id.to_string())
            .push_bind(trade.symbol.clone())
            .push_bind(trade.trade_type.map(|t| t.as_str()))
            .push_bind(trade.entry_price)
            .push_bind(trade.exit_price)
            .push_bind(trade.lot_size)
            .push_bind(trade.pnl)
            .push_bind(trade.trade_date)
            .push_bind(trade.strategy_tag.clone())
            .push_bind(trade.notes.clone())
            .push_bind(screenshot_url.map(str::to_string));
    });
    qb.push(" RETURNING *");

    let records = qb
        .build_query_as::<TradeRecord>()
        .fetch_all(pool)
        .await?;

    Ok(records)
}

/// All trades for a user, newest trade date first.
pub async fn list_trades_for_user(
    pool: &PgPool,
    user_id: &str,
) -> anyhow::Result<Vec<TradeRecord>> {
    let trades = sqlx::query_as::<_, TradeRecord>(
        "SELECT * FROM trades WHERE user_id = $1 ORDER BY trade_date DESC, created_at DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(trades)
}

pub async fn get_trade(
    pool: &PgPool,
    user_id: &str,
    trade_id: Uuid,
) -> anyhow::Result<Option<TradeRecord>> {
    let trade = sqlx::query_as::<_, TradeRecord>(
        "SELECT * FROM trades WHERE id = $1 AND user_id = $2",
    )
    .bind(trade_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(trade)
}

/// Rewrite every mutable field of a trade. Returns `None` if the user owns no such trade.
pub async fn update_trade(
    pool: &PgPool,
    user_id: &str,
    trade_id: Uuid,
    trade: &NewTrade,
    strategy_chart_url: Option<&str>,
) -> anyhow::Result<Option<TradeRecord>> {
    let record = sqlx::query_as::<_, TradeRecord>(
        r#"
        UPDATE trades
        SET symbol = $3, trade_type = $4, entry_price = $5, exit_price = $6, lot_size = $7,
            pnl = $8, trade_date = $9, strategy_tag = $10, notes = $11, strategy_chart_url = $12
        WHERE id = $1 AND user_id = $2
        RETURNING *
        "#,
    )
    .bind(trade_id)
    .bind(user_id)
    .bind(&trade.symbol)
    .bind(trade.trade_type.map(|t| t.as_str()))
    .bind(trade.entry_price)
    .bind(trade.exit_price)
    .bind(trade.lot_size)
    .bind(trade.pnl)
    .bind(trade.trade_date)
    .bind(trade.strategy_tag.as_deref())
    .bind(trade.notes.as_deref())
    .bind(strategy_chart_url)
    .fetch_optional(pool)
    .await?;

    Ok(record)
}

/// Delete one trade. Returns whether a row was removed.
pub async fn delete_trade(pool: &PgPool, user_id: &str, trade_id: Uuid) -> anyhow::Result<bool> {
    let result = sqlx::query("DELETE FROM trades WHERE id = $1 AND user_id = $2")
        .bind(trade_id)
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn delete_trades_for_user(pool: &PgPool, user_id: &str) -> anyhow::Result<u64> {
    let result = sqlx::query("DELETE FROM trades WHERE user_id = $1")
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}

/// The usage counter: number of trades a user has recorded.
pub async fn count_trades_for_user(pool: &PgPool, user_id: &str) -> anyhow::Result<i64> {
    let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM trades WHERE user_id = $1")
        .bind(user_id)
        .fetch_one(pool)
        .await?;

    Ok(row.0)
}
