use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fmt::Display;
use utoipa::ToSchema;

/// A user's role within a single album.
///
/// Roles form a strict rank order; every escalation check in the crate goes
/// through [`AlbumRole::rank`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, ToSchema, PartialEq, Eq, Hash)]
#[sqlx(type_name = "album_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AlbumRole {
    Viewer,
    Contributor,
    Admin,
    Owner,
}

impl AlbumRole {
    /// Total rank order: viewer < contributor < admin < owner.
    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            Self::Viewer => 0,
            Self::Contributor => 1,
            Self::Admin => 2,
            Self::Owner => 3,
        }
    }
}

impl Display for AlbumRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Viewer => "viewer",
            Self::Contributor => "contributor",
            Self::Admin => "admin",
            Self::Owner => "owner",
        };
        f.write_str(s)
    }
}

/// Represents a single album in the database.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Album {
    pub id: String,
    pub owner_id: i32,
    pub name: String,
    pub description: Option<String>,
    pub is_public: bool,
    /// Set if and only if `is_public` is true; both change in the same UPDATE.
    pub public_token: Option<String>,
    pub deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::AlbumRole;

    #[test]
    fn rank_order_is_total() {
        assert!(AlbumRole::Viewer.rank() < AlbumRole::Contributor.rank());
        assert!(AlbumRole::Contributor.rank() < AlbumRole::Admin.rank());
        assert!(AlbumRole::Admin.rank() < AlbumRole::Owner.rank());
    }
}
