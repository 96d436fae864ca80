use sqlx::PgPool;

use crate::models::Profile;

pub async fn get_profile(pool: &PgPool, user_id: &str) -> anyhow::Result<Option<Profile>> {
    let profile = sqlx::query_as::<_, Profile>("SELECT * FROM profiles WHERE id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

    Ok(profile)
}

/// Create the profile on first sight of a user; keeps the stored e-mail if none is supplied.
pub async fn ensure_profile(
    pool: &PgPool,
    user_id: &str,
    email: Option<&str>,
) -> anyhow::Result<Profile> {
    let profile = sqlx::query_as::<_, Profile>(
        r#"
        INSERT INTO profiles (id, email)
        VALUES ($1, $2)
        ON CONFLICT (id) DO UPDATE SET email = COALESCE(EXCLUDED.email, profiles.email)
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(email)
    .fetch_one(pool)
    .await?;

    Ok(profile)
}

pub async fn update_profile(
    pool: &PgPool,
    user_id: &str,
    full_name: Option<&str>,
    timezone: Option<&str>,
    currency: Option<&str>,
) -> anyhow::Result<Option<Profile>> {
    let profile = sqlx::query_as::<_, Profile>(
        r#"
        UPDATE profiles
        SET full_name = $2, timezone = $3, currency = $4
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(full_name)
    .bind(timezone)
    .bind(currency)
    .fetch_optional(pool)
    .await?;

    Ok(profile)
}

pub async fn delete_profile(pool: &PgPool, user_id: &str) -> anyhow::Result<bool> {
    let result = sqlx::query("DELETE FROM profiles WHERE id = $1")
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn list_profiles(pool: &PgPool) -> anyhow::Result<Vec<Profile>> {
    let profiles =
        sqlx::query_as::<_, Profile>("SELECT * FROM profiles ORDER BY created_at DESC")
            .fetch_all(pool)
            .await?;

    Ok(profiles)
}
