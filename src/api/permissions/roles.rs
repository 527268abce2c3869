use crate::database::tables::album::AlbumRole;
use crate::database::tables::permission_override::AlbumAction;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Platform-level role of the subject, supplied by the caller's auth layer.
/// Operators bypass album-level checks entirely.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SystemRole {
    #[default]
    User,
    Operator,
}

impl SystemRole {
    #[must_use]
    pub const fn is_operator(self) -> bool {
        matches!(self, Self::Operator)
    }
}

/// The single role→permitted-actions table. Both the resolver and the
/// access-context builder read from here; nothing else in the crate may
/// encode role permissions.
#[must_use]
pub const fn permitted_actions(role: AlbumRole) -> &'static [AlbumAction] {
    use AlbumAction::{
        Comment, DeleteAlbum, EditAlbum, ManageMembers, RemovePhoto, UploadPhoto, ViewAlbum,
    };
    match role {
        AlbumRole::Viewer => &[ViewAlbum, Comment],
        AlbumRole::Contributor => &[ViewAlbum, Comment, UploadPhoto, RemovePhoto],
        AlbumRole::Admin => &[
            ViewAlbum,
            Comment,
            UploadPhoto,
            RemovePhoto,
            EditAlbum,
            ManageMembers,
        ],
        AlbumRole::Owner => &[
            ViewAlbum,
            Comment,
            UploadPhoto,
            RemovePhoto,
            EditAlbum,
            ManageMembers,
            DeleteAlbum,
        ],
    }
}

#[must_use]
pub fn role_allows(role: AlbumRole, action: AlbumAction) -> bool {
    permitted_actions(role).contains(&action)
}
