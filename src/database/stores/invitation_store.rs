use crate::database::DbError;
use crate::database::tables::album::AlbumRole;
use crate::database::tables::invitation::{AlbumInvitation, InvitationStatus};
use chrono::{DateTime, Utc};
use sqlx::{Executor, Postgres};

pub struct InvitationStore;

impl InvitationStore {
    #[allow(clippy::too_many_arguments)]
    pub async fn insert(
        executor: impl Executor<'_, Database = Postgres>,
        album_id: &str,
        invited_by: i32,
        invited_email: Option<&str>,
        invited_role: AlbumRole,
        token_hash: &str,
        expires_at: DateTime<Utc>,
        max_uses: Option<i32>,
    ) -> Result<AlbumInvitation, DbError> {
        Ok(sqlx::query_as::<_, AlbumInvitation>(
            r"
            INSERT INTO album_invitation
                (album_id, invited_by, invited_email, invited_role, token_hash, expires_at, max_uses)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            ",
        )
        .bind(album_id)
        .bind(invited_by)
        .bind(invited_email)
        .bind(invited_role)
        .bind(token_hash)
        .bind(expires_at)
        .bind(max_uses)
        .fetch_one(executor)
        .await?)
    }

    pub async fn find_by_hash(
        executor: impl Executor<'_, Database = Postgres>,
        token_hash: &str,
    ) -> Result<Option<AlbumInvitation>, DbError> {
        Ok(sqlx::query_as::<_, AlbumInvitation>(
            "SELECT * FROM album_invitation WHERE token_hash = $1",
        )
        .bind(token_hash)
        .fetch_optional(executor)
        .await?)
    }

    /// Row-locked lookup for the accept path, so two concurrent accepts on
    /// the same token serialize at the row.
    pub async fn find_by_hash_for_update(
        executor: impl Executor<'_, Database = Postgres>,
        token_hash: &str,
    ) -> Result<Option<AlbumInvitation>, DbError> {
        Ok(sqlx::query_as::<_, AlbumInvitation>(
            "SELECT * FROM album_invitation WHERE token_hash = $1 FOR UPDATE",
        )
        .bind(token_hash)
        .fetch_optional(executor)
        .await?)
    }

    pub async fn find_by_id(
        executor: impl Executor<'_, Database = Postgres>,
        invitation_id: i64,
    ) -> Result<Option<AlbumInvitation>, DbError> {
        Ok(
            sqlx::query_as::<_, AlbumInvitation>("SELECT * FROM album_invitation WHERE id = $1")
                .bind(invitation_id)
                .fetch_optional(executor)
                .await?,
        )
    }

    /// Supersedes any still-pending invitation for the same (album, email).
    pub async fn revoke_pending_for_email(
        executor: impl Executor<'_, Database = Postgres>,
        album_id: &str,
        invited_email: &str,
    ) -> Result<u64, DbError> {
        let result = sqlx::query(
            r"
            UPDATE album_invitation
            SET status = 'revoked'
            WHERE album_id = $1 AND invited_email = $2 AND status = 'pending'
            ",
        )
        .bind(album_id)
        .bind(invited_email)
        .execute(executor)
        .await?;
        Ok(result.rows_affected())
    }

    /// Moves a pending invitation to a terminal state. Returns 0 rows when
    /// the invitation already left `pending`, which callers map to Gone.
    pub async fn set_status_from_pending(
        executor: impl Executor<'_, Database = Postgres>,
        invitation_id: i64,
        status: InvitationStatus,
    ) -> Result<u64, DbError> {
        let result = sqlx::query(
            "UPDATE album_invitation SET status = $2 WHERE id = $1 AND status = 'pending'",
        )
        .bind(invitation_id)
        .bind(status)
        .execute(executor)
        .await?;
        Ok(result.rows_affected())
    }

    /// Writes the outcome of one accepted use. Guarded on the previous
    /// `use_count` so a racing accept that slipped past the row lock still
    /// cannot double-spend.
    pub async fn record_use(
        executor: impl Executor<'_, Database = Postgres>,
        invitation_id: i64,
        new_use_count: i32,
        new_status: InvitationStatus,
        expected_use_count: i32,
    ) -> Result<u64, DbError> {
        let result = sqlx::query(
            r"
            UPDATE album_invitation
            SET use_count = $2, status = $3
            WHERE id = $1 AND status = 'pending' AND use_count = $4
            ",
        )
        .bind(invitation_id)
        .bind(new_use_count)
        .bind(new_status)
        .bind(expected_use_count)
        .execute(executor)
        .await?;
        Ok(result.rows_affected())
    }

    pub async fn list_by_album(
        executor: impl Executor<'_, Database = Postgres>,
        album_id: &str,
    ) -> Result<Vec<AlbumInvitation>, DbError> {
        Ok(sqlx::query_as::<_, AlbumInvitation>(
            "SELECT * FROM album_invitation WHERE album_id = $1 ORDER BY created_at DESC",
        )
        .bind(album_id)
        .fetch_all(executor)
        .await?)
    }
}
