use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use super::ApiResponse;
use crate::api::auth::AuthUser;
use crate::db::trade_repo;
use crate::errors::AppError;
use crate::journal::{compute_stats, daily_pnl, DailyPnl, JournalStats};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct DailyQuery {
    pub year: Option<i32>,
}

pub async fn summary(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<ApiResponse<JournalStats>>, AppError> {
    let trades = trade_repo::list_trades_for_user(&state.db, &user.id).await?;
    Ok(Json(ApiResponse::ok(compute_stats(&trades))))
}

/// Per-day pnl for the streak calendar.
pub async fn daily(
    State(state): State<AppState>,
    user: AuthUser,
    Query(q): Query<DailyQuery>,
) -> Result<Json<ApiResponse<Vec<DailyPnl>>>, AppError> {
    let trades = trade_repo::list_trades_for_user(&state.db, &user.id).await?;
    Ok(Json(ApiResponse::ok(daily_pnl(&trades, q.year))))
}
