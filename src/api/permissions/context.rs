use crate::api::permissions::error::PermissionError;
use crate::api::permissions::interfaces::{AlbumAccessContext, DecisionReason};
use crate::api::permissions::resolver::{
    MembershipFacts, ResolveRequest, evaluate_membership, evaluate_pre_membership,
};
use crate::api::permissions::roles::SystemRole;
use crate::database::album_store::AlbumStore;
use crate::database::tables::album::{Album, AlbumRole};
use crate::database::tables::album_member::AlbumMember;
use crate::database::tables::permission_override::AlbumAction;
use sqlx::PgPool;
use std::collections::HashMap;
use tracing::instrument;

/// The role a subject effectively holds in an album: `Owner` for the album
/// owner (with or without a joined membership row), the membership role for
/// members, `None` for everyone else (operators included; their bypass is
/// not a role).
#[must_use]
pub fn effective_role(
    album: &Album,
    subject: Option<i32>,
    membership: Option<&AlbumMember>,
) -> Option<AlbumRole> {
    if subject == Some(album.owner_id) {
        return Some(AlbumRole::Owner);
    }
    membership.map(|member| member.role)
}

/// The rank a requester carries into the escalation guard: platform
/// operators act at owner rank, everyone else at their effective role.
#[must_use]
pub fn guard_role(
    album: &Album,
    actor: i32,
    system_role: SystemRole,
    membership: Option<&AlbumMember>,
) -> Option<AlbumRole> {
    if system_role.is_operator() {
        return Some(AlbumRole::Owner);
    }
    effective_role(album, Some(actor), membership)
}

/// Runs the full rule chain for one action against already-loaded state.
/// This is the same chain `resolver::resolve` executes; the context builder
/// and the resolver cannot diverge because both end here.
#[must_use]
pub fn decide(
    album: &Album,
    subject: Option<i32>,
    system_role: SystemRole,
    membership: Option<&AlbumMember>,
    overrides: &HashMap<AlbumAction, bool>,
    action: AlbumAction,
) -> DecisionReason {
    let request = ResolveRequest {
        album,
        subject,
        action,
        system_role,
    };
    if let Some(reason) = evaluate_pre_membership(&request) {
        return reason;
    }
    evaluate_membership(
        &MembershipFacts {
            membership,
            override_granted: overrides.get(&action).copied(),
        },
        action,
    )
}

fn build_context(
    album: Album,
    subject: Option<i32>,
    system_role: SystemRole,
    membership: Option<AlbumMember>,
    overrides: &HashMap<AlbumAction, bool>,
) -> AlbumAccessContext {
    let allowed = |action: AlbumAction| {
        decide(
            &album,
            subject,
            system_role,
            membership.as_ref(),
            overrides,
            action,
        )
        .allows()
    };

    AlbumAccessContext {
        can_view: allowed(AlbumAction::ViewAlbum),
        can_edit: allowed(AlbumAction::EditAlbum),
        can_delete: allowed(AlbumAction::DeleteAlbum),
        can_manage_members: allowed(AlbumAction::ManageMembers),
        can_upload: allowed(AlbumAction::UploadPhoto),
        can_comment: allowed(AlbumAction::Comment),
        effective_role: effective_role(&album, subject, membership.as_ref()),
        album,
        membership,
    }
}

/// Builds the access context for a subject and album in one round trip:
/// album, membership and that membership's overrides come back from a
/// single aggregated query.
#[instrument(skip(pool))]
pub async fn resolve_access(
    pool: &PgPool,
    album_id: &str,
    subject: Option<i32>,
    system_role: SystemRole,
) -> Result<AlbumAccessContext, PermissionError> {
    let rows = AlbumStore::fetch_access_rows(pool, album_id, subject).await?;

    let first = rows
        .first()
        .filter(|row| !row.deleted)
        .ok_or_else(|| PermissionError::NotFound(format!("album {album_id}")))?;

    let album = first.album();
    let membership = first.membership();
    let overrides: HashMap<AlbumAction, bool> = rows
        .iter()
        .filter_map(|row| Some((row.override_action?, row.override_granted?)))
        .collect();

    Ok(build_context(
        album,
        subject,
        system_role,
        membership,
        &overrides,
    ))
}

#[cfg(test)]
mod tests {
    use super::{build_context, effective_role};
    use crate::api::permissions::roles::SystemRole;
    use crate::database::tables::album::{Album, AlbumRole};
    use crate::database::tables::album_member::AlbumMember;
    use crate::database::tables::permission_override::AlbumAction;
    use chrono::Utc;
    use std::collections::HashMap;

    fn album(owner_id: i32, is_public: bool) -> Album {
        Album {
            id: "alb_ctx".into(),
            owner_id,
            name: "Context".into(),
            description: None,
            is_public,
            public_token: is_public.then(|| "tok_ctx".into()),
            deleted: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn member(user_id: i32, role: AlbumRole) -> AlbumMember {
        AlbumMember {
            id: 10,
            album_id: "alb_ctx".into(),
            user_id,
            role,
            added_at: Utc::now(),
        }
    }

    #[test]
    fn owner_context_allows_everything() {
        let ctx = build_context(
            album(1, false),
            Some(1),
            SystemRole::User,
            None,
            &HashMap::new(),
        );
        assert_eq!(ctx.effective_role, Some(AlbumRole::Owner));
        assert!(
            ctx.can_view
                && ctx.can_edit
                && ctx.can_delete
                && ctx.can_manage_members
                && ctx.can_upload
                && ctx.can_comment
        );
    }

    #[test]
    fn anonymous_public_viewer_can_only_view() {
        let ctx = build_context(album(1, true), None, SystemRole::User, None, &HashMap::new());
        assert_eq!(ctx.effective_role, None);
        assert!(ctx.can_view);
        assert!(!ctx.can_edit && !ctx.can_upload && !ctx.can_comment && !ctx.can_manage_members);
    }

    #[test]
    fn viewer_with_upload_override_can_upload() {
        let overrides = HashMap::from([(AlbumAction::UploadPhoto, true)]);
        let ctx = build_context(
            album(1, false),
            Some(2),
            SystemRole::User,
            Some(member(2, AlbumRole::Viewer)),
            &overrides,
        );
        assert_eq!(ctx.effective_role, Some(AlbumRole::Viewer));
        assert!(ctx.can_view && ctx.can_upload);
        assert!(!ctx.can_edit);
    }

    #[test]
    fn admin_with_deny_override_loses_member_management() {
        let overrides = HashMap::from([(AlbumAction::ManageMembers, false)]);
        let ctx = build_context(
            album(1, false),
            Some(3),
            SystemRole::User,
            Some(member(3, AlbumRole::Admin)),
            &overrides,
        );
        assert!(!ctx.can_manage_members);
        assert!(ctx.can_edit);
    }

    #[test]
    fn operator_has_full_capabilities_but_no_role() {
        let ctx = build_context(
            album(1, false),
            Some(50),
            SystemRole::Operator,
            None,
            &HashMap::new(),
        );
        assert_eq!(ctx.effective_role, None);
        assert!(ctx.can_view && ctx.can_delete && ctx.can_manage_members);
    }

    #[test]
    fn effective_role_prefers_ownership() {
        let album = album(4, false);
        let membership = member(4, AlbumRole::Admin);
        assert_eq!(
            effective_role(&album, Some(4), Some(&membership)),
            Some(AlbumRole::Owner)
        );
    }
}
