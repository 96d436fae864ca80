use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::extraction::pipeline::ExtractionError;
use crate::journal::validation::ValidationError;
use crate::journal::writer::WriteError;
use crate::storage::StorageError;
use crate::vendors::gateway_client::GatewayError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Authentication required")]
    Unauthorized,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Upload limit reached: {used} of {limit} free uploads used")]
    UsageLimitReached { used: i64, limit: i64 },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{0}")]
    Upstream(String),

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, self.to_string()),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            AppError::UsageLimitReached { .. } => (StatusCode::FORBIDDEN, self.to_string()),
            AppError::Validation(e) => (StatusCode::UNPROCESSABLE_ENTITY, e.to_string()),
            AppError::Upstream(msg) => {
                tracing::warn!(error = %msg, "Upstream vendor error");
                (StatusCode::BAD_GATEWAY, msg.clone())
            }
            AppError::Unavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg.clone()),
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".into())
            }
        };

        (
            status,
            Json(ErrorBody {
                success: false,
                error: message,
            }),
        )
            .into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        AppError::Internal(e.into())
    }
}

impl From<ExtractionError> for AppError {
    fn from(e: ExtractionError) -> Self {
        AppError::Upstream(e.to_string())
    }
}

impl From<GatewayError> for AppError {
    fn from(e: GatewayError) -> Self {
        AppError::Upstream(e.to_string())
    }
}

impl From<StorageError> for AppError {
    fn from(e: StorageError) -> Self {
        AppError::Internal(e.into())
    }
}

impl From<WriteError> for AppError {
    fn from(e: WriteError) -> Self {
        match e {
            WriteError::Validation(v) => AppError::Validation(v),
            WriteError::NotFound => AppError::NotFound("trade not found".into()),
            WriteError::Storage(s) => s.into(),
            WriteError::Database(e) => match e.downcast_ref::<sqlx::Error>() {
                // constraint violations and the like reach the user as the database wrote them
                Some(sqlx::Error::Database(db)) => AppError::BadRequest(db.message().to_string()),
                _ => AppError::Internal(e),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use std::borrow::Cow;
    use std::error::Error as StdError;
    use std::fmt;

    use sqlx::error::{DatabaseError, ErrorKind};

    use super::*;

    #[derive(Debug)]
    struct CheckViolation;

    impl fmt::Display for CheckViolation {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(self.message())
        }
    }

    impl StdError for CheckViolation {}

    impl DatabaseError for CheckViolation {
        fn message(&self) -> &str {
            "new row for relation \"trades\" violates check constraint \"trades_lot_size_check\""
        }

        fn code(&self) -> Option<Cow<'_, str>> {
            Some(Cow::Borrowed("23514"))
        }

        fn as_error(&self) -> &(dyn StdError + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn StdError + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn StdError + Send + Sync + 'static> {
            self
        }

        fn kind(&self) -> ErrorKind {
            ErrorKind::CheckViolation
        }
    }

    async fn body_text(resp: Response) -> String {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn database_rejection_is_passed_through() {
        let db_err = anyhow::Error::from(sqlx::Error::Database(Box::new(CheckViolation)))
            .context("insert trades");
        let resp = AppError::from(WriteError::Database(db_err)).into_response();

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert!(body_text(resp).await.contains("trades_lot_size_check"));
    }

    #[tokio::test]
    async fn other_database_failures_stay_internal() {
        let db_err = anyhow::Error::from(sqlx::Error::PoolTimedOut);
        let resp = AppError::from(WriteError::Database(db_err)).into_response();

        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body_text(resp).await.contains("Internal server error"));
    }
}
