use axum::extract::{Path, State};
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::usage::ensure_admitted;
use super::ApiResponse;
use crate::api::auth::AuthUser;
use crate::errors::AppError;
use crate::extraction::{CandidateField, Draft};
use crate::models::{CandidateTrade, TradeInput, TradeRecord};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct FieldEdit {
    pub field: CandidateField,
    pub value: String,
}

#[derive(Serialize)]
pub struct CommitResult {
    pub saved: usize,
    pub trades: Vec<TradeRecord>,
}

pub async fn get_draft(
    State(state): State<AppState>,
    user: AuthUser,
) -> Json<ApiResponse<Draft>> {
    Json(ApiResponse::ok(state.drafts.get(&user.id).await))
}

pub async fn add_row(
    State(state): State<AppState>,
    user: AuthUser,
) -> Json<ApiResponse<CandidateTrade>> {
    let today = Utc::now().date_naive();
    let row = state
        .drafts
        .update(&user.id, |d| d.trades.append_blank(today).clone())
        .await;
    Json(ApiResponse::ok(row))
}

pub async fn edit_row(
    State(state): State<AppState>,
    user: AuthUser,
    Path(row_id): Path<Uuid>,
    Json(edit): Json<FieldEdit>,
) -> Result<Json<ApiResponse<Draft>>, AppError> {
    let draft = state
        .drafts
        .update(&user.id, |d| {
            d.trades
                .update_field(row_id, edit.field, edit.value)
                .then(|| d.clone())
        })
        .await
        .ok_or_else(|| AppError::NotFound(format!("draft row {row_id}")))?;

    Ok(Json(ApiResponse::ok(draft)))
}

pub async fn remove_row(
    State(state): State<AppState>,
    user: AuthUser,
    Path(row_id): Path<Uuid>,
) -> Result<Json<ApiResponse<Draft>>, AppError> {
    let draft = state
        .drafts
        .update(&user.id, |d| d.trades.remove(row_id).then(|| d.clone()))
        .await
        .ok_or_else(|| AppError::NotFound(format!("draft row {row_id}")))?;

    Ok(Json(ApiResponse::ok(draft)))
}

pub async fn clear(State(state): State<AppState>, user: AuthUser) -> Json<ApiResponse<Draft>> {
    state.drafts.remove(&user.id).await;
    Json(ApiResponse::ok(Draft::default()))
}

/// "Save All": write every reviewed row at once. On any failure the draft is
/// left exactly as it was so the user can fix the offending row. A second save
/// for the same user while one is running gets 409.
pub async fn commit(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<ApiResponse<CommitResult>>, AppError> {
    ensure_admitted(&state, &user.id).await?;

    let _commit = state
        .drafts
        .begin_commit(&user.id)
        .ok_or_else(|| AppError::Conflict("a save for this draft is already running".into()))?;

    let draft = state.drafts.get(&user.id).await;
    let inputs: Vec<TradeInput> = draft.trades.rows().iter().map(CandidateTrade::to_input).collect();
    let ids: Vec<Uuid> = draft.trades.rows().iter().map(|r| r.id).collect();

    let trades = state
        .writer
        .commit_batch(&user.id, &inputs, draft.screenshot.as_ref())
        .await?;

    // rows added while the commit ran stay in the draft
    state
        .drafts
        .update(&user.id, |d| {
            d.trades.remove_committed(&ids);
            if d.trades.is_empty() {
                *d = Draft::default();
            }
        })
        .await;

    Ok(Json(ApiResponse::ok(CommitResult {
        saved: trades.len(),
        trades,
    })))
}
