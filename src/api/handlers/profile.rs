use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use super::ApiResponse;
use crate::api::auth::AuthUser;
use crate::db::{profile_repo, subscription_repo, trade_repo};
use crate::errors::AppError;
use crate::models::{PlanType, Profile, Subscription};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ProfileUpdate {
    pub full_name: Option<String>,
    pub timezone: Option<String>,
    pub currency: Option<String>,
}

#[derive(Serialize)]
pub struct SubscriptionView {
    pub plan_type: PlanType,
    pub subscription: Option<Subscription>,
}

#[derive(Serialize)]
pub struct DeletedAccount {
    pub trades_deleted: u64,
}

pub async fn get_profile(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<ApiResponse<Profile>>, AppError> {
    let profile = profile_repo::ensure_profile(&state.db, &user.id, user.email.as_deref()).await?;
    Ok(Json(ApiResponse::ok(profile)))
}

pub async fn update_profile(
    State(state): State<AppState>,
    user: AuthUser,
    Json(body): Json<ProfileUpdate>,
) -> Result<Json<ApiResponse<Profile>>, AppError> {
    profile_repo::ensure_profile(&state.db, &user.id, user.email.as_deref()).await?;

    let profile = profile_repo::update_profile(
        &state.db,
        &user.id,
        non_blank(&body.full_name),
        non_blank(&body.timezone),
        non_blank(&body.currency),
    )
    .await?
    .ok_or_else(|| AppError::NotFound("profile".into()))?;

    Ok(Json(ApiResponse::ok(profile)))
}

/// Remove the caller's journal, then their profile.
pub async fn delete_profile(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<ApiResponse<DeletedAccount>>, AppError> {
    let trades_deleted = trade_repo::delete_trades_for_user(&state.db, &user.id).await?;
    profile_repo::delete_profile(&state.db, &user.id).await?;
    state.drafts.remove(&user.id).await;

    tracing::info!(user_id = %user.id, trades_deleted, "Account data deleted");
    Ok(Json(ApiResponse::ok(DeletedAccount { trades_deleted })))
}

/// The caller's active plan; no row means free.
pub async fn get_subscription(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<ApiResponse<SubscriptionView>>, AppError> {
    let subscription = subscription_repo::get_active_subscription(&state.db, &user.id).await?;
    let plan_type = subscription.as_ref().map(Subscription::plan).unwrap_or(PlanType::Free);

    Ok(Json(ApiResponse::ok(SubscriptionView {
        plan_type,
        subscription,
    })))
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
