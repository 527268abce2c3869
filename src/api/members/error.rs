use crate::api::permissions::error::PermissionError;
use crate::api::permissions::guard::GuardError;
use crate::database::DbError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use color_eyre::eyre;
use serde_json::json;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum MemberError {
    #[error("Database error")]
    Database(#[from] sqlx::Error),

    #[error("internal error")]
    Internal(#[from] eyre::Report),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation: {0}")]
    Validation(String),
}

fn log_error(error: &MemberError) {
    match error {
        MemberError::Database(e) => warn!("Members -> Database query failed: {}", e),
        MemberError::Internal(e) => warn!("Members -> Internal error: {:?}", e),
        MemberError::NotFound(detail) => warn!("Members -> Not found: {}", detail),
        MemberError::Forbidden(detail) => warn!("Members -> Forbidden: {}", detail),
        MemberError::Conflict(detail) => warn!("Members -> Conflict: {}", detail),
        MemberError::Validation(detail) => warn!("Members -> Validation: {}", detail),
    }
}

impl IntoResponse for MemberError {
    fn into_response(self) -> Response {
        log_error(&self);

        let (status, error_message) = match self {
            Self::Database(_) | Self::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "An unexpected internal error occurred.".to_string(),
            ),
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "Not found.".to_string()),
            Self::Forbidden(_) => (StatusCode::FORBIDDEN, "Forbidden.".to_string()),
            Self::Conflict(message) => (StatusCode::CONFLICT, message),
            Self::Validation(message) => (StatusCode::UNPROCESSABLE_ENTITY, message),
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}

impl From<DbError> for MemberError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::UniqueViolation(_) => Self::Conflict("Already a member.".into()),
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

impl From<PermissionError> for MemberError {
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

impl From<GuardError> for MemberError {
    fn from(err: GuardError) -> Self {
        Self::Forbidden(err.to_string())
    }
}
