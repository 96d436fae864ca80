use axum::extract::State;
use axum::Json;

use super::ApiResponse;
use crate::access::{self, UsageDecision};
use crate::api::auth::AuthUser;
use crate::db::profile_repo;
use crate::errors::AppError;
use crate::AppState;

pub async fn get_usage(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<ApiResponse<UsageDecision>>, AppError> {
    // first request of a session; make sure the user shows up for admins
    profile_repo::ensure_profile(&state.db, &user.id, user.email.as_deref()).await?;

    let decision = access::evaluate(&state.db, &user.id, state.config.free_upload_limit).await;
    Ok(Json(ApiResponse::ok(decision)))
}

/// Gate every recording path: refuse with 403 once a free user is at the limit.
pub(crate) async fn ensure_admitted(state: &AppState, user_id: &str) -> Result<UsageDecision, AppError> {
    let decision = access::evaluate(&state.db, user_id, state.config.free_upload_limit).await;

    if !decision.admitted {
        metrics::counter!("usage_limit_refusals_total").increment(1);
        tracing::info!(user_id, used = decision.uploads_count, "Upload refused at free limit");
        return Err(AppError::UsageLimitReached {
            used: decision.uploads_count,
            limit: decision.free_limit,
        });
    }

    Ok(decision)
}
