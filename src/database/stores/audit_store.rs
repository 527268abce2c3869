use crate::database::DbError;
use sqlx::{Executor, Postgres};

pub struct AuditStore;

impl AuditStore {
    /// Appends one audit record. The table is append-only; there is no
    /// update or delete path.
    pub async fn insert(
        executor: impl Executor<'_, Database = Postgres>,
        album_id: &str,
        actor_id: Option<i32>,
        event: &str,
        detail: &serde_json::Value,
    ) -> Result<(), DbError> {
        sqlx::query(
            r"
            INSERT INTO audit_log (album_id, actor_id, event, detail)
            VALUES ($1, $2, $3, $4)
            ",
        )
        .bind(album_id)
        .bind(actor_id)
        .bind(event)
        .bind(detail)
        .execute(executor)
        .await?;
        Ok(())
    }
}
