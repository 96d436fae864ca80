use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::ApiResponse;
use crate::access::require_admin;
use crate::api::auth::AuthUser;
use crate::db::{profile_repo, subscription_repo};
use crate::errors::AppError;
use crate::models::{PlanType, Profile, Subscription};
use crate::payments::reconcile::publish_subscription;
use crate::AppState;

#[derive(Serialize)]
pub struct UserWithPlan {
    #[serde(flatten)]
    pub profile: Profile,
    pub plan_type: PlanType,
    pub subscription: Option<Subscription>,
}

#[derive(Debug, Deserialize)]
pub struct GrantRequest {
    pub user_id: String,
    pub plan_type: PlanType,
}

pub async fn list_users(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<ApiResponse<Vec<UserWithPlan>>>, AppError> {
    require_admin(&state.db, &user.id).await?;

    let profiles = profile_repo::list_profiles(&state.db).await?;
    let mut subs = subscription_repo::list_subscriptions(&state.db).await?;

    let users = profiles
        .into_iter()
        .map(|profile| {
            let subscription = subs
                .iter()
                .position(|s| s.user_id == profile.id && s.is_active())
                .map(|i| subs.swap_remove(i));
            UserWithPlan {
                plan_type: subscription.as_ref().map(Subscription::plan).unwrap_or(PlanType::Free),
                profile,
                subscription,
            }
        })
        .collect();

    Ok(Json(ApiResponse::ok(users)))
}

/// Set a user's plan by hand. The change is pushed to the user's sockets right away.
pub async fn grant_subscription(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<GrantRequest>,
) -> Result<Json<ApiResponse<Subscription>>, AppError> {
    require_admin(&state.db, &user.id).await?;

    if req.user_id.trim().is_empty() {
        return Err(AppError::BadRequest("user_id is required".into()));
    }

    let now = Utc::now();
    let sub = subscription_repo::upsert_subscription(
        &state.db,
        &req.user_id,
        req.plan_type,
        now,
        req.plan_type.end_date_from(now),
    )
    .await?;

    tracing::info!(
        admin = %user.id,
        user_id = %req.user_id,
        plan = %req.plan_type,
        version = sub.version,
        "Subscription granted by admin"
    );

    publish_subscription(&state.ws_tx, &sub);
    Ok(Json(ApiResponse::ok(sub)))
}
