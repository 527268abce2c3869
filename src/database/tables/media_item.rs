use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fmt::Display;
use utoipa::ToSchema;

/// Per-photo visibility, layered on top of album-level access.
///
/// `Restricted` is the only state where allowlist rows carry meaning.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, ToSchema, PartialEq, Eq)]
#[sqlx(type_name = "media_visibility", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MediaVisibility {
    AlbumDefault,
    Restricted,
    Hidden,
}

impl Display for MediaVisibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::AlbumDefault => "album_default",
            Self::Restricted => "restricted",
            Self::Hidden => "hidden",
        };
        f.write_str(s)
    }
}

/// A photo or video in an album.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MediaItem {
    pub id: String,
    pub album_id: String,
    pub uploaded_by: i32,
    pub visibility: MediaVisibility,
    pub deleted: bool,
    pub created_at: DateTime<Utc>,
}
