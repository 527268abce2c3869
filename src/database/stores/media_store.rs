use crate::database::DbError;
use crate::database::tables::media_item::{MediaItem, MediaVisibility};
use sqlx::{Executor, Postgres};

pub struct MediaStore;

impl MediaStore {
    pub async fn find_by_id(
        executor: impl Executor<'_, Database = Postgres>,
        media_item_id: &str,
    ) -> Result<Option<MediaItem>, DbError> {
        Ok(sqlx::query_as::<_, MediaItem>(
            "SELECT * FROM media_item WHERE id = $1 AND deleted = false",
        )
        .bind(media_item_id)
        .fetch_optional(executor)
        .await?)
    }

    /// Fetches a batch of live media items; missing ids are simply absent
    /// from the result, the caller decides whether that is an error.
    pub async fn list_by_ids(
        executor: impl Executor<'_, Database = Postgres>,
        media_item_ids: &[String],
    ) -> Result<Vec<MediaItem>, DbError> {
        Ok(sqlx::query_as::<_, MediaItem>(
            "SELECT * FROM media_item WHERE id = ANY($1) AND deleted = false",
        )
        .bind(media_item_ids)
        .fetch_all(executor)
        .await?)
    }

    pub async fn set_visibility(
        executor: impl Executor<'_, Database = Postgres>,
        media_item_id: &str,
        visibility: MediaVisibility,
    ) -> Result<u64, DbError> {
        let result = sqlx::query("UPDATE media_item SET visibility = $2 WHERE id = $1")
            .bind(media_item_id)
            .bind(visibility)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn clear_allowlist(
        executor: impl Executor<'_, Database = Postgres>,
        media_item_id: &str,
    ) -> Result<u64, DbError> {
        let result = sqlx::query("DELETE FROM media_item_viewer WHERE media_item_id = $1")
            .bind(media_item_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn insert_allowlist(
        executor: impl Executor<'_, Database = Postgres>,
        media_item_id: &str,
        user_ids: &[i32],
    ) -> Result<u64, DbError> {
        let result = sqlx::query(
            r"
            INSERT INTO media_item_viewer (media_item_id, user_id)
            SELECT $1, uid FROM UNNEST($2::INT[]) AS uid
            ",
        )
        .bind(media_item_id)
        .bind(user_ids)
        .execute(executor)
        .await?;
        Ok(result.rows_affected())
    }

    pub async fn is_allowlisted(
        executor: impl Executor<'_, Database = Postgres>,
        media_item_id: &str,
        user_id: i32,
    ) -> Result<bool, DbError> {
        Ok(sqlx::query_scalar::<_, bool>(
            r"
            SELECT EXISTS (
                SELECT 1 FROM media_item_viewer
                WHERE media_item_id = $1 AND user_id = $2
            )
            ",
        )
        .bind(media_item_id)
        .bind(user_id)
        .fetch_one(executor)
        .await?)
    }

    pub async fn list_allowlist(
        executor: impl Executor<'_, Database = Postgres>,
        media_item_id: &str,
    ) -> Result<Vec<i32>, DbError> {
        Ok(sqlx::query_scalar::<_, i32>(
            "SELECT user_id FROM media_item_viewer WHERE media_item_id = $1 ORDER BY user_id",
        )
        .bind(media_item_id)
        .fetch_all(executor)
        .await?)
    }
}
