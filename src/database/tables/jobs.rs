use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Background work dispatched by the engine. Delivery itself is handled by
/// the worker processes; the engine only enqueues, best-effort.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, ToSchema, PartialEq, Eq)]
#[sqlx(type_name = "job_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum JobType {
    InvitationEmail,
}
