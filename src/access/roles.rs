use sqlx::PgPool;

use crate::db::profile_repo;
use crate::errors::AppError;
use crate::models::Role;

/// The one place admin rights are decided: the caller's profile role.
pub async fn require_admin(pool: &PgPool, user_id: &str) -> Result<(), AppError> {
    let profile = profile_repo::get_profile(pool, user_id).await?;

    match profile.map(|p| p.role()) {
        Some(Role::Admin) => Ok(()),
        _ => {
            tracing::warn!(user_id, "Admin action refused");
            Err(AppError::Forbidden("admin access required".into()))
        }
    }
}
