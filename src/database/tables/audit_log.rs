use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One immutable audit record per state-changing operation.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuditRecord {
    pub id: i64,
    pub album_id: String,
    /// None for system-initiated changes.
    pub actor_id: Option<i32>,
    pub event: String,
    pub detail: serde_json::Value,
    pub created_at: DateTime<Utc>,
}
