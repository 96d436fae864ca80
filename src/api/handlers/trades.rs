use axum::extract::{Multipart, Path, State};
use axum::Json;
use uuid::Uuid;

use super::extract::{next_field, read_image};
use super::usage::ensure_admitted;
use super::ApiResponse;
use crate::api::auth::AuthUser;
use crate::db::trade_repo;
use crate::errors::AppError;
use crate::extraction::PendingScreenshot;
use crate::models::{TradeInput, TradeRecord};
use crate::AppState;

pub async fn list(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<ApiResponse<Vec<TradeRecord>>>, AppError> {
    let trades = trade_repo::list_trades_for_user(&state.db, &user.id).await?;
    Ok(Json(ApiResponse::ok(trades)))
}

/// Manual entry: multipart with a `trade` JSON part and an optional `file` screenshot.
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    multipart: Multipart,
) -> Result<Json<ApiResponse<TradeRecord>>, AppError> {
    ensure_admitted(&state, &user.id).await?;

    let (input, screenshot) = read_trade_form(multipart, "file").await?;
    let trade = state
        .writer
        .commit_single(&user.id, &input, screenshot.as_ref())
        .await?;

    Ok(Json(ApiResponse::ok(trade)))
}

/// Journal edit: `trade` JSON part and an optional `strategy_chart` image.
pub async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    Path(trade_id): Path<Uuid>,
    multipart: Multipart,
) -> Result<Json<ApiResponse<TradeRecord>>, AppError> {
    let (input, chart) = read_trade_form(multipart, "strategy_chart").await?;
    let trade = state
        .writer
        .update(&user.id, trade_id, &input, chart.as_ref())
        .await?;

    Ok(Json(ApiResponse::ok(trade)))
}

pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    Path(trade_id): Path<Uuid>,
) -> Result<Json<ApiResponse<Uuid>>, AppError> {
    if !trade_repo::delete_trade(&state.db, &user.id, trade_id).await? {
        return Err(AppError::NotFound(format!("trade {trade_id}")));
    }

    tracing::info!(user_id = %user.id, trade_id = %trade_id, "Trade deleted");
    Ok(Json(ApiResponse::ok(trade_id)))
}

async fn read_trade_form(
    mut multipart: Multipart,
    image_part: &str,
) -> Result<(TradeInput, Option<PendingScreenshot>), AppError> {
    let mut input = None;
    let mut image = None;

    while let Some(field) = next_field(&mut multipart).await? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("trade") => {
                let raw = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("failed to read trade: {e}")))?;
                input = Some(
                    serde_json::from_slice::<TradeInput>(&raw)
                        .map_err(|e| AppError::BadRequest(format!("invalid trade JSON: {e}")))?,
                );
            }
            Some(name) if name == image_part => image = Some(read_image(field).await?),
            _ => {}
        }
    }

    let input = input.ok_or_else(|| AppError::BadRequest("missing 'trade' part".into()))?;
    Ok((input, image))
}
