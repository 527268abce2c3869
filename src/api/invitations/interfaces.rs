use crate::database::tables::album::AlbumRole;
use crate::database::tables::album_member::AlbumMember;
use crate::database::tables::invitation::{AlbumInvitation, InvitationStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// The create response: the only place the raw secret ever appears.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatedInvitation {
    pub token: String,
    pub invitation: AlbumInvitation,
}

/// Token-authenticated preview of a pending invitation; no session needed.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InvitationPreview {
    pub album_id: String,
    pub album_name: String,
    pub invited_role: AlbumRole,
    pub invited_email: Option<String>,
    pub expires_at: DateTime<Utc>,
    pub uses_remaining: Option<i32>,
}

/// Outcome of a successful accept: the membership it created and where the
/// invitation's counter landed.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AcceptedInvitation {
    pub membership: AlbumMember,
    pub invitation_status: InvitationStatus,
    pub use_count: i32,
}
