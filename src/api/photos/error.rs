use crate::api::permissions::error::PermissionError;
use crate::database::DbError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use color_eyre::eyre;
use serde_json::json;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum VisibilityError {
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

fn log_error(error: &VisibilityError) {
    match error {
        VisibilityError::Database(e) => warn!("Visibility -> Database query failed: {}", e),
        VisibilityError::Internal(e) => warn!("Visibility -> Internal error: {:?}", e),
        VisibilityError::NotFound(detail) => warn!("Visibility -> Not found: {}", detail),
        VisibilityError::Forbidden(detail) => warn!("Visibility -> Forbidden: {}", detail),
        VisibilityError::Validation(detail) => warn!("Visibility -> Validation: {}", detail),
    }
}

impl IntoResponse for VisibilityError {
    fn into_response(self) -> Response {
        log_error(&self);

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

impl From<DbError> for VisibilityError {
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

impl From<PermissionError> for VisibilityError {
    fn from(err: PermissionError) -> Self {
        match err {
            PermissionError::Database(e) => Self::Database(e),
            PermissionError::Internal(e) => Self::Internal(e),
            PermissionError::NotFound(detail) => Self::NotFound(detail),
            PermissionError::Forbidden(detail) => Self::Forbidden(detail),
            PermissionError::Validation(detail) => Self::Validation(detail),
        }
    }
}
