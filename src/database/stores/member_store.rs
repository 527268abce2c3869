use crate::database::DbError;
use crate::database::tables::album::AlbumRole;
use crate::database::tables::album_member::AlbumMember;
use sqlx::{Executor, Postgres};

pub struct MemberStore;

impl MemberStore {
    /// Inserts a membership. A duplicate (album, user) pair surfaces as
    /// `DbError::UniqueViolation` for the caller to map to Conflict.
    pub async fn insert(
        executor: impl Executor<'_, Database = Postgres>,
        album_id: &str,
        user_id: i32,
        role: AlbumRole,
    ) -> Result<AlbumMember, DbError> {
        Ok(sqlx::query_as::<_, AlbumMember>(
            r"
            INSERT INTO album_member (album_id, user_id, role)
            VALUES ($1, $2, $3)
            RETURNING *
            ",
        )
        .bind(album_id)
        .bind(user_id)
        .bind(role)
        .fetch_one(executor)
        .await?)
    }

    pub async fn find(
        executor: impl Executor<'_, Database = Postgres>,
        album_id: &str,
        user_id: i32,
    ) -> Result<Option<AlbumMember>, DbError> {
        Ok(sqlx::query_as::<_, AlbumMember>(
            "SELECT * FROM album_member WHERE album_id = $1 AND user_id = $2",
        )
        .bind(album_id)
        .bind(user_id)
        .fetch_optional(executor)
        .await?)
    }

    pub async fn find_by_id(
        executor: impl Executor<'_, Database = Postgres>,
        member_id: i64,
    ) -> Result<Option<AlbumMember>, DbError> {
        Ok(
            sqlx::query_as::<_, AlbumMember>("SELECT * FROM album_member WHERE id = $1")
                .bind(member_id)
                .fetch_optional(executor)
                .await?,
        )
    }

    pub async fn update_role(
        executor: impl Executor<'_, Database = Postgres>,
        member_id: i64,
        role: AlbumRole,
    ) -> Result<AlbumMember, DbError> {
        Ok(sqlx::query_as::<_, AlbumMember>(
            "UPDATE album_member SET role = $2 WHERE id = $1 RETURNING *",
        )
        .bind(member_id)
        .bind(role)
        .fetch_one(executor)
        .await?)
    }

    /// Removes a membership row. The owner row is protected by the service
    /// layer; this store does not re-check.
    pub async fn remove(
        executor: impl Executor<'_, Database = Postgres>,
        member_id: i64,
    ) -> Result<u64, DbError> {
        let result = sqlx::query("DELETE FROM album_member WHERE id = $1")
            .bind(member_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    /// All user ids that are members of an album, for allowlist validation.
    pub async fn list_user_ids(
        executor: impl Executor<'_, Database = Postgres>,
        album_id: &str,
    ) -> Result<Vec<i32>, DbError> {
        Ok(
            sqlx::query_scalar::<_, i32>("SELECT user_id FROM album_member WHERE album_id = $1")
                .bind(album_id)
                .fetch_all(executor)
                .await?,
        )
    }

    pub async fn list_by_album(
        executor: impl Executor<'_, Database = Postgres>,
        album_id: &str,
    ) -> Result<Vec<AlbumMember>, DbError> {
        Ok(sqlx::query_as::<_, AlbumMember>(
            "SELECT * FROM album_member WHERE album_id = $1 ORDER BY added_at",
        )
        .bind(album_id)
        .fetch_all(executor)
        .await?)
    }
}
