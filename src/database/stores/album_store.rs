use crate::database::DbError;
use crate::database::tables::album::{Album, AlbumRole};
use crate::database::tables::permission_override::AlbumAction;
use sqlx::{Executor, FromRow, Postgres};

/// One row of the aggregated access query: the album, the subject's
/// membership (if any) and one of that membership's overrides (if any).
#[derive(Debug, FromRow)]
pub struct AccessRow {
    pub id: String,
    pub owner_id: i32,
    pub name: String,
    pub description: Option<String>,
    pub is_public: bool,
    pub public_token: Option<String>,
    pub deleted: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
    pub member_id: Option<i64>,
    pub member_user_id: Option<i32>,
    pub member_role: Option<AlbumRole>,
    pub member_added_at: Option<chrono::DateTime<chrono::Utc>>,
    pub override_action: Option<AlbumAction>,
    pub override_granted: Option<bool>,
}

impl AccessRow {
    #[must_use]
    pub fn album(&self) -> Album {
        Album {
            id: self.id.clone(),
            owner_id: self.owner_id,
            name: self.name.clone(),
            description: self.description.clone(),
            is_public: self.is_public,
            public_token: self.public_token.clone(),
            deleted: self.deleted,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    #[must_use]
    pub fn membership(&self) -> Option<crate::database::tables::album_member::AlbumMember> {
        Some(crate::database::tables::album_member::AlbumMember {
            id: self.member_id?,
            album_id: self.id.clone(),
            user_id: self.member_user_id?,
            role: self.member_role?,
            added_at: self.member_added_at?,
        })
    }
}

pub struct AlbumStore;

impl AlbumStore {
    /// Inserts a new album row. The owner membership is inserted by the
    /// caller inside the same transaction.
    pub async fn create(
        executor: impl Executor<'_, Database = Postgres>,
        album_id: &str,
        owner_id: i32,
        name: &str,
        description: Option<String>,
        is_public: bool,
        public_token: Option<&str>,
    ) -> Result<Album, DbError> {
        Ok(sqlx::query_as::<_, Album>(
            r"
            INSERT INTO album (id, owner_id, name, description, is_public, public_token)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            ",
        )
        .bind(album_id)
        .bind(owner_id)
        .bind(name)
        .bind(description)
        .bind(is_public)
        .bind(public_token)
        .fetch_one(executor)
        .await?)
    }

    /// Retrieves a single album by its ID, soft-deleted ones included.
    pub async fn find_by_id(
        executor: impl Executor<'_, Database = Postgres>,
        album_id: &str,
    ) -> Result<Option<Album>, DbError> {
        Ok(
            sqlx::query_as::<_, Album>("SELECT * FROM album WHERE id = $1")
                .bind(album_id)
                .fetch_optional(executor)
                .await?,
        )
    }

    /// Retrieves a live public album by its share token.
    pub async fn find_by_public_token(
        executor: impl Executor<'_, Database = Postgres>,
        token: &str,
    ) -> Result<Option<Album>, DbError> {
        Ok(sqlx::query_as::<_, Album>(
            r"
            SELECT * FROM album
            WHERE public_token = $1 AND is_public = true AND deleted = false
            ",
        )
        .bind(token)
        .fetch_optional(executor)
        .await?)
    }

    /// Flips `is_public` and `public_token` together, in one statement, so
    /// the two can never disagree.
    pub async fn set_public(
        executor: impl Executor<'_, Database = Postgres>,
        album_id: &str,
        is_public: bool,
        public_token: Option<&str>,
    ) -> Result<Album, DbError> {
        Ok(sqlx::query_as::<_, Album>(
            r"
            UPDATE album
            SET is_public = $2, public_token = $3, updated_at = now()
            WHERE id = $1
            RETURNING *
            ",
        )
        .bind(album_id)
        .bind(is_public)
        .bind(public_token)
        .fetch_one(executor)
        .await?)
    }

    /// Marks an album as deleted. Rows stay in place for cascade semantics.
    pub async fn soft_delete(
        executor: impl Executor<'_, Database = Postgres>,
        album_id: &str,
    ) -> Result<u64, DbError> {
        let result =
            sqlx::query("UPDATE album SET deleted = true, updated_at = now() WHERE id = $1")
                .bind(album_id)
                .execute(executor)
                .await?;
        Ok(result.rows_affected())
    }

    /// The one-round-trip access aggregation: album, the subject's
    /// membership and all overrides attached to it. Returns one row per
    /// override, or a single row with NULL override columns.
    pub async fn fetch_access_rows(
        executor: impl Executor<'_, Database = Postgres>,
        album_id: &str,
        user_id: Option<i32>,
    ) -> Result<Vec<AccessRow>, DbError> {
        Ok(sqlx::query_as::<_, AccessRow>(
            r"
            SELECT
                a.id, a.owner_id, a.name, a.description, a.is_public,
                a.public_token, a.deleted, a.created_at, a.updated_at,
                m.id AS member_id,
                m.user_id AS member_user_id,
                m.role AS member_role,
                m.added_at AS member_added_at,
                po.action AS override_action,
                po.granted AS override_granted
            FROM album a
            LEFT JOIN album_member m ON m.album_id = a.id AND m.user_id = $2
            LEFT JOIN permission_override po ON po.member_id = m.id
            WHERE a.id = $1
            ",
        )
        .bind(album_id)
        .bind(user_id)
        .fetch_all(executor)
        .await?)
    }
}
