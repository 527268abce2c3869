use crate::database::DbError;
use crate::database::tables::permission_override::{AlbumAction, PermissionOverride};
use sqlx::{Executor, Postgres};

pub struct OverrideStore;

impl OverrideStore {
    /// Sets or replaces the override for one (member, action) pair.
    pub async fn upsert(
        executor: impl Executor<'_, Database = Postgres>,
        member_id: i64,
        action: AlbumAction,
        granted: bool,
        set_by: i32,
        reason: Option<String>,
    ) -> Result<PermissionOverride, DbError> {
        Ok(sqlx::query_as::<_, PermissionOverride>(
            r"
            INSERT INTO permission_override (member_id, action, granted, set_by, reason)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (member_id, action)
            DO UPDATE SET granted = EXCLUDED.granted,
                          set_by = EXCLUDED.set_by,
                          reason = EXCLUDED.reason
            RETURNING *
            ",
        )
        .bind(member_id)
        .bind(action)
        .bind(granted)
        .bind(set_by)
        .bind(reason)
        .fetch_one(executor)
        .await?)
    }

    pub async fn find(
        executor: impl Executor<'_, Database = Postgres>,
        member_id: i64,
        action: AlbumAction,
    ) -> Result<Option<PermissionOverride>, DbError> {
        Ok(sqlx::query_as::<_, PermissionOverride>(
            "SELECT * FROM permission_override WHERE member_id = $1 AND action = $2",
        )
        .bind(member_id)
        .bind(action)
        .fetch_optional(executor)
        .await?)
    }

    pub async fn remove(
        executor: impl Executor<'_, Database = Postgres>,
        member_id: i64,
        action: AlbumAction,
    ) -> Result<u64, DbError> {
        let result =
            sqlx::query("DELETE FROM permission_override WHERE member_id = $1 AND action = $2")
                .bind(member_id)
                .bind(action)
                .execute(executor)
                .await?;
        Ok(result.rows_affected())
    }

    pub async fn list_for_member(
        executor: impl Executor<'_, Database = Postgres>,
        member_id: i64,
    ) -> Result<Vec<PermissionOverride>, DbError> {
        Ok(sqlx::query_as::<_, PermissionOverride>(
            "SELECT * FROM permission_override WHERE member_id = $1 ORDER BY action",
        )
        .bind(member_id)
        .fetch_all(executor)
        .await?)
    }
}
