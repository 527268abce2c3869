use crate::database::audit_store::AuditStore;
use sqlx::PgPool;

/// Appends one audit record for a state-changing operation.
///
/// Best-effort by contract: a failed audit write must never fail the
/// operation it describes, so the error is swallowed and alerted on.
pub async fn record(
    pool: &PgPool,
    album_id: &str,
    actor_id: Option<i32>,
    event: &str,
    detail: serde_json::Value,
) {
    if let Err(err) = AuditStore::insert(pool, album_id, actor_id, event, &detail).await {
        crate::alert!("Failed to write audit record '{event}' for album {album_id}: {err}");
    }
}
