use crate::api::permissions::guard::GuardError;
use crate::database::DbError;
use crate::database::tables::permission_override::UnknownAction;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use color_eyre::eyre;
use serde_json::json;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum PermissionError {
    #[error("Database error")]
    Database(#[from] sqlx::Error),

    #[error("internal error")]
    Internal(#[from] eyre::Report),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Validation: {0}")]
    Validation(String),
}

fn log_error(error: &PermissionError) {
    match error {
        PermissionError::Database(e) => warn!("Permissions -> Database query failed: {}", e),
        PermissionError::Internal(e) => warn!("Permissions -> Internal error: {:?}", e),
        PermissionError::NotFound(detail) => warn!("Permissions -> Not found: {}", detail),
        PermissionError::Forbidden(detail) => warn!("Permissions -> Forbidden: {}", detail),
        PermissionError::Validation(detail) => warn!("Permissions -> Validation: {}", detail),
    }
}

impl IntoResponse for PermissionError {
    fn into_response(self) -> Response {
        log_error(&self);

        // Detailed deny reasons stay in the logs; the response body is kept
        // generic so callers cannot probe for album or member existence.
        let (status, error_message) = match self {
            Self::Database(_) | Self::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "An unexpected internal error occurred.".to_string(),
            ),
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "Not found.".to_string()),
            Self::Forbidden(_) => (StatusCode::FORBIDDEN, "Forbidden.".to_string()),
            Self::Validation(message) => (StatusCode::UNPROCESSABLE_ENTITY, message),
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}

impl From<DbError> for PermissionError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::UniqueViolation(sql_err) => Self::Database(sql_err),
            DbError::Sqlx(sql_err) => {
                if matches!(sql_err, sqlx::Error::RowNotFound) {
                    Self::NotFound("row not found".into())
                } else {
                    Self::Database(sql_err)
                }
            }
        }
    }
}

impl From<UnknownAction> for PermissionError {
    fn from(err: UnknownAction) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<GuardError> for PermissionError {
    fn from(err: GuardError) -> Self {
        Self::Forbidden(err.to_string())
    }
}
