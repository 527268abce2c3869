use crate::database::tables::media_item::MediaVisibility;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fmt::Display;
use utoipa::ToSchema;

/// Why a photo was shown or withheld. Only meaningful after the caller has
/// already passed the album-view check.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PhotoAccessReason {
    AlbumDefault,
    AlbumOwner,
    Uploader,
    Allowlisted,
    HiddenFromMembers,
    NotAllowlisted,
}

impl PhotoAccessReason {
    #[must_use]
    pub const fn allows(self) -> bool {
        matches!(
            self,
            Self::AlbumDefault | Self::AlbumOwner | Self::Uploader | Self::Allowlisted
        )
    }
}

impl Display for PhotoAccessReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::AlbumDefault => "allowed: album default visibility",
            Self::AlbumOwner => "allowed: album owner",
            Self::Uploader => "allowed: photo uploader",
            Self::Allowlisted => "allowed: on the photo's allowlist",
            Self::HiddenFromMembers => "denied: photo is hidden",
            Self::NotAllowlisted => "denied: not on the photo's allowlist",
        };
        f.write_str(s)
    }
}

/// Structured outcome of the photo visibility resolver.
#[derive(Debug, Clone, Copy, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PhotoDecision {
    pub allowed: bool,
    pub reason: PhotoAccessReason,
}

/// Payload for a visibility change on one or more photos.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SetVisibilityRequest {
    pub visibility: MediaVisibility,
    /// Must be non-empty for `restricted` and empty for everything else.
    #[serde(default)]
    pub allowed_user_ids: Vec<i32>,
}
