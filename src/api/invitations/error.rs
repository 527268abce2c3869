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
pub enum InvitationError {
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

    #[error("Gone: {0}")]
    Gone(String),

    #[error("Validation: {0}")]
    Validation(String),
}

fn log_error(error: &InvitationError) {
    match error {
        InvitationError::Database(e) => warn!("Invitations -> Database query failed: {}", e),
        InvitationError::Internal(e) => warn!("Invitations -> Internal error: {:?}", e),
        InvitationError::NotFound(detail) => warn!("Invitations -> Not found: {}", detail),
        InvitationError::Forbidden(detail) => warn!("Invitations -> Forbidden: {}", detail),
        InvitationError::Conflict(detail) => warn!("Invitations -> Conflict: {}", detail),
        InvitationError::Gone(detail) => warn!("Invitations -> Gone: {}", detail),
        InvitationError::Validation(detail) => warn!("Invitations -> Validation: {}", detail),
    }
}

impl IntoResponse for InvitationError {
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
            // A Gone invitation is no longer usable; the body stays vague
            // about why.
            Self::Gone(_) => (
                StatusCode::GONE,
                "This invitation is no longer valid.".to_string(),
            ),
            Self::Validation(message) => (StatusCode::UNPROCESSABLE_ENTITY, message),
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}

impl From<DbError> for InvitationError {
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

impl From<PermissionError> for InvitationError {
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

impl From<GuardError> for InvitationError {
    fn from(err: GuardError) -> Self {
        Self::Forbidden(err.to_string())
    }
}
