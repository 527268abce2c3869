use crate::database::tables::album::AlbumRole;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fmt::Display;
use utoipa::ToSchema;

/// Lifecycle of an invitation token. `Pending` is the only live state;
/// every other state is terminal and never reverts.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, ToSchema, PartialEq, Eq)]
#[sqlx(type_name = "invitation_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum InvitationStatus {
    Pending,
    Accepted,
    Declined,
    Expired,
    Revoked,
}

impl InvitationStatus {
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl Display for InvitationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Declined => "declined",
            Self::Expired => "expired",
            Self::Revoked => "revoked",
        };
        f.write_str(s)
    }
}

/// A capability token inviting someone into an album.
///
/// Only the SHA-256 of the secret is stored; the raw secret leaves the
/// engine exactly once, in the response to `create`.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AlbumInvitation {
    pub id: i64,
    pub album_id: String,
    pub invited_by: i32,
    pub invited_email: Option<String>,
    /// The role granted on acceptance. Never `Owner`.
    pub invited_role: AlbumRole,
    #[serde(skip_serializing)]
    pub token_hash: String,
    pub status: InvitationStatus,
    pub expires_at: DateTime<Utc>,
    pub max_uses: Option<i32>,
    pub use_count: i32,
    pub created_at: DateTime<Utc>,
}

impl AlbumInvitation {
    /// Whether the token is past its expiry at `now`. Expiry is applied
    /// lazily on read; this does not look at `status`.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at < now
    }

    /// Uses left before the token exhausts, if it is capped.
    #[must_use]
    pub fn uses_remaining(&self) -> Option<i32> {
        self.max_uses.map(|max| (max - self.use_count).max(0))
    }
}
