use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fmt::Display;
use std::str::FromStr;
use utoipa::ToSchema;

/// The actions a subject can attempt against an album.
///
/// This is the full action vocabulary; the role-permission table in
/// `api::permissions::roles` is the only place that maps roles onto it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, ToSchema, PartialEq, Eq, Hash)]
#[sqlx(type_name = "album_action", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AlbumAction {
    ViewAlbum,
    EditAlbum,
    DeleteAlbum,
    ManageMembers,
    UploadPhoto,
    RemovePhoto,
    Comment,
}

impl AlbumAction {
    pub const ALL: [Self; 7] = [
        Self::ViewAlbum,
        Self::EditAlbum,
        Self::DeleteAlbum,
        Self::ManageMembers,
        Self::UploadPhoto,
        Self::RemovePhoto,
        Self::Comment,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ViewAlbum => "view_album",
            Self::EditAlbum => "edit_album",
            Self::DeleteAlbum => "delete_album",
            Self::ManageMembers => "manage_members",
            Self::UploadPhoto => "upload_photo",
            Self::RemovePhoto => "remove_photo",
            Self::Comment => "comment",
        }
    }
}

impl Display for AlbumAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown action names are a validation failure, not a deny.
#[derive(Debug, thiserror::Error)]
#[error("Unknown album action: {0}")]
pub struct UnknownAction(pub String);

impl FromStr for AlbumAction {
    type Err = UnknownAction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|action| action.as_str() == s)
            .ok_or_else(|| UnknownAction(s.to_string()))
    }
}

/// An explicit per-member grant or deny for one action. Beats the member's
/// role-derived outcome in either direction. Never created for owner rows.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PermissionOverride {
    pub id: i64,
    pub member_id: i64,
    pub action: AlbumAction,
    pub granted: bool,
    pub set_by: i32,
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
}
