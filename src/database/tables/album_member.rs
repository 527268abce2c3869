use crate::database::tables::album::AlbumRole;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A user's membership in an album. Unique per (album, user); exactly one
/// `owner` row exists per album and it is created together with the album.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AlbumMember {
    pub id: i64,
    pub album_id: String,
    pub user_id: i32,
    pub role: AlbumRole,
    pub added_at: DateTime<Utc>,
}
