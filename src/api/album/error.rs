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
pub enum AlbumError {
    #[error("Database error")]
    Database(#[from] sqlx::Error),

    #[error("internal error")]
    Internal(#[from] eyre::Report),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),
}

fn log_error(error: &AlbumError) {
    match error {
        AlbumError::Database(e) => warn!("Album -> Database query failed: {}", e),
        AlbumError::Internal(e) => warn!("Album -> Internal error: {:?}", e),
        AlbumError::NotFound(detail) => warn!("Album -> Not found: {}", detail),
        AlbumError::Forbidden(detail) => warn!("Album -> Forbidden: {}", detail),
    }
}

impl IntoResponse for AlbumError {
    fn into_response(self) -> Response {
        log_error(&self);

        let (status, error_message) = match self {
            Self::Database(_) | Self::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "An unexpected internal error occurred.".to_string(),
            ),
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "Not found.".to_string()),
            Self::Forbidden(_) => (StatusCode::FORBIDDEN, "Forbidden.".to_string()),
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}

impl From<DbError> for AlbumError {
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

impl From<PermissionError> for AlbumError {
    fn from(err: PermissionError) -> Self {
        match err {
            PermissionError::Database(e) => Self::Database(e),
            PermissionError::Internal(e) => Self::Internal(e),
            PermissionError::NotFound(detail) => Self::NotFound(detail),
            PermissionError::Forbidden(detail) | PermissionError::Validation(detail) => {
                Self::Forbidden(detail)
            }
        }
    }
}
