use axum::extract::multipart::Field;
use axum::extract::{Multipart, State};
use axum::Json;
use chrono::Utc;

use super::usage::ensure_admitted;
use super::ApiResponse;
use crate::api::auth::AuthUser;
use crate::errors::AppError;
use crate::extraction::{Draft, PendingScreenshot};
use crate::AppState;

/// Upload a broker screenshot and replace the caller's draft with what was read from it.
pub async fn extract(
    State(state): State<AppState>,
    user: AuthUser,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<Draft>>, AppError> {
    ensure_admitted(&state, &user.id).await?;

    let pipeline = state
        .extraction
        .as_ref()
        .ok_or_else(|| AppError::Unavailable("screenshot extraction is not configured".into()))?;

    let mut screenshot = None;
    while let Some(field) = next_field(&mut multipart).await? {
        if field.name() == Some("file") {
            screenshot = Some(read_image(field).await?);
        }
    }
    let screenshot =
        screenshot.ok_or_else(|| AppError::BadRequest("missing 'file' part".into()))?;

    let today = Utc::now().date_naive();
    let extraction = pipeline
        .run(&screenshot.file_name, screenshot.bytes.clone(), today)
        .await?;

    let draft = Draft::from_extraction(extraction, screenshot);
    state.drafts.put(&user.id, draft.clone()).await;

    Ok(Json(ApiResponse::ok(draft)))
}

pub(crate) async fn next_field(multipart: &mut Multipart) -> Result<Option<Field<'_>>, AppError> {
    multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("malformed multipart body: {e}")))
}

/// Read an image part. Parts that declare a non-image content type are refused.
pub(crate) async fn read_image(field: Field<'_>) -> Result<PendingScreenshot, AppError> {
    if let Some(ct) = field.content_type() {
        if !ct.starts_with("image/") && ct != "application/octet-stream" {
            return Err(AppError::BadRequest(format!("expected an image, got {ct}")));
        }
    }

    let file_name = field.file_name().unwrap_or("screenshot.png").to_string();
    let bytes = field
        .bytes()
        .await
        .map_err(|e| AppError::BadRequest(format!("failed to read upload: {e}")))?;

    if bytes.is_empty() {
        return Err(AppError::BadRequest("uploaded file is empty".into()));
    }

    Ok(PendingScreenshot {
        file_name,
        bytes: bytes.to_vec(),
    })
}
