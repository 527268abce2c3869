use crate::database::tables::album::{Album, AlbumRole};
use crate::database::tables::album_member::AlbumMember;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fmt::Display;
use utoipa::ToSchema;

/// Why the resolver allowed or denied, named after the rule that decided.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DecisionReason {
    SystemOperator,
    AlbumOwner,
    PublicAlbum,
    OverrideGranted,
    RoleGranted,
    AuthenticationRequired,
    NotAMember,
    OverrideDenied,
    RoleDenied,
}

impl DecisionReason {
    #[must_use]
    pub const fn allows(self) -> bool {
        matches!(
            self,
            Self::SystemOperator
                | Self::AlbumOwner
                | Self::PublicAlbum
                | Self::OverrideGranted
                | Self::RoleGranted
        )
    }
}

impl Display for DecisionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::SystemOperator => "allowed: platform operator",
            Self::AlbumOwner => "allowed: album owner",
            Self::PublicAlbum => "allowed: public album view",
            Self::OverrideGranted => "allowed: explicit grant override",
            Self::RoleGranted => "allowed: permitted by role",
            Self::AuthenticationRequired => "denied: authentication required",
            Self::NotAMember => "denied: not a member of this album",
            Self::OverrideDenied => "denied: explicit deny override",
            Self::RoleDenied => "denied: not permitted by role",
        };
        f.write_str(s)
    }
}

/// Structured resolver outcome. Callers inspect it (`resolve`) or let
/// `assert_can` turn a deny into an error.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AccessDecision {
    pub allowed: bool,
    pub reason: DecisionReason,
    pub album: Album,
    pub membership: Option<AlbumMember>,
}

/// Immutable per-request view of what a subject can do in an album, built
/// from a single aggregated query over the same rules as the resolver.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AlbumAccessContext {
    pub album: Album,
    pub membership: Option<AlbumMember>,
    /// None for anonymous public viewers; owners report `Owner` whether or
    /// not a membership row was joined.
    pub effective_role: Option<AlbumRole>,
    pub can_view: bool,
    pub can_edit: bool,
    pub can_delete: bool,
    pub can_manage_members: bool,
    pub can_upload: bool,
    pub can_comment: bool,
}
