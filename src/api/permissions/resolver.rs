use crate::api::permissions::error::PermissionError;
use crate::api::permissions::interfaces::{AccessDecision, DecisionReason};
use crate::api::permissions::roles::{SystemRole, role_allows};
use crate::database::album_store::AlbumStore;
use crate::database::member_store::MemberStore;
use crate::database::override_store::OverrideStore;
use crate::database::tables::album::Album;
use crate::database::tables::album_member::AlbumMember;
use crate::database::tables::permission_override::AlbumAction;
use sqlx::PgPool;
use tracing::instrument;

/// Everything the pre-membership steps may look at. Membership is
/// deliberately absent: steps 2-5 must decide without a membership lookup.
#[derive(Debug, Clone, Copy)]
pub struct ResolveRequest<'a> {
    pub album: &'a Album,
    pub subject: Option<i32>,
    pub action: AlbumAction,
    pub system_role: SystemRole,
}

/// Membership-phase inputs: the joined row and the override outcome for the
/// requested action, if one exists.
#[derive(Debug, Clone, Copy)]
pub struct MembershipFacts<'a> {
    pub membership: Option<&'a AlbumMember>,
    pub override_granted: Option<bool>,
}

pub type PreMembershipStep = fn(&ResolveRequest) -> Option<DecisionReason>;
pub type MembershipStep = fn(&MembershipFacts, AlbumAction) -> Option<DecisionReason>;

/// The ordered rule chain, phase one. Each step assumes every earlier step
/// declined to decide; the order is the contract.
pub const PRE_MEMBERSHIP_STEPS: [(&str, PreMembershipStep); 4] = [
    ("system_operator", step_system_operator),
    ("album_owner", step_album_owner),
    ("public_view", step_public_view),
    ("authentication_required", step_authentication_required),
];

/// The ordered rule chain, phase two, evaluated only when phase one left
/// the request undecided.
pub const MEMBERSHIP_STEPS: [(&str, MembershipStep); 3] = [
    ("not_a_member", step_not_a_member),
    ("explicit_override", step_explicit_override),
    ("role_permission", step_role_permission),
];

fn step_system_operator(req: &ResolveRequest) -> Option<DecisionReason> {
    req.system_role
        .is_operator()
        .then_some(DecisionReason::SystemOperator)
}

fn step_album_owner(req: &ResolveRequest) -> Option<DecisionReason> {
    (req.subject == Some(req.album.owner_id)).then_some(DecisionReason::AlbumOwner)
}

fn step_public_view(req: &ResolveRequest) -> Option<DecisionReason> {
    (req.action == AlbumAction::ViewAlbum && req.album.is_public)
        .then_some(DecisionReason::PublicAlbum)
}

fn step_authentication_required(req: &ResolveRequest) -> Option<DecisionReason> {
    req.subject
        .is_none()
        .then_some(DecisionReason::AuthenticationRequired)
}

fn step_not_a_member(facts: &MembershipFacts, _action: AlbumAction) -> Option<DecisionReason> {
    facts
        .membership
        .is_none()
        .then_some(DecisionReason::NotAMember)
}

fn step_explicit_override(facts: &MembershipFacts, _action: AlbumAction) -> Option<DecisionReason> {
    facts.override_granted.map(|granted| {
        if granted {
            DecisionReason::OverrideGranted
        } else {
            DecisionReason::OverrideDenied
        }
    })
}

fn step_role_permission(facts: &MembershipFacts, action: AlbumAction) -> Option<DecisionReason> {
    facts.membership.map(|member| {
        if role_allows(member.role, action) {
            DecisionReason::RoleGranted
        } else {
            DecisionReason::RoleDenied
        }
    })
}

/// Runs phase one of the rule chain. `None` means the membership phase must
/// decide.
#[must_use]
pub fn evaluate_pre_membership(req: &ResolveRequest) -> Option<DecisionReason> {
    PRE_MEMBERSHIP_STEPS.iter().find_map(|(_, step)| step(req))
}

/// Runs phase two of the rule chain; always decides.
#[must_use]
pub fn evaluate_membership(facts: &MembershipFacts, action: AlbumAction) -> DecisionReason {
    MEMBERSHIP_STEPS
        .iter()
        .find_map(|(_, step)| step(facts, action))
        // The role-permission step decides for every present membership and
        // the not-a-member step for every absent one.
        .unwrap_or(DecisionReason::NotAMember)
}

/// Resolves whether `subject` may perform `action` on the album.
///
/// Read-only: the decision never mutates state. A missing or soft-deleted
/// album is an error; a deny is a structured `Ok` outcome.
#[instrument(skip(pool))]
pub async fn resolve(
    pool: &PgPool,
    album_id: &str,
    subject: Option<i32>,
    action: AlbumAction,
    system_role: SystemRole,
) -> Result<AccessDecision, PermissionError> {
    let album = AlbumStore::find_by_id(pool, album_id)
        .await?
        .filter(|album| !album.deleted)
        .ok_or_else(|| PermissionError::NotFound(format!("album {album_id}")))?;

    let request = ResolveRequest {
        album: &album,
        subject,
        action,
        system_role,
    };

    if let Some(reason) = evaluate_pre_membership(&request) {
        return Ok(AccessDecision {
            allowed: reason.allows(),
            reason,
            album,
            membership: None,
        });
    }

    // Phase one guarantees an authenticated subject from here on.
    let Some(subject_id) = subject else {
        return Ok(AccessDecision {
            allowed: false,
            reason: DecisionReason::AuthenticationRequired,
            album,
            membership: None,
        });
    };

    let membership = MemberStore::find(pool, album_id, subject_id).await?;
    let override_granted = match &membership {
        Some(member) => OverrideStore::find(pool, member.id, action)
            .await?
            .map(|o| o.granted),
        None => None,
    };

    let reason = evaluate_membership(
        &MembershipFacts {
            membership: membership.as_ref(),
            override_granted,
        },
        action,
    );

    Ok(AccessDecision {
        allowed: reason.allows(),
        reason,
        album,
        membership,
    })
}

/// Enforcement variant: resolves and converts a deny into Forbidden. The
/// detailed reason goes to the logs, not the caller.
#[instrument(skip(pool))]
pub async fn assert_can(
    pool: &PgPool,
    album_id: &str,
    subject: Option<i32>,
    action: AlbumAction,
    system_role: SystemRole,
) -> Result<AccessDecision, PermissionError> {
    let decision = resolve(pool, album_id, subject, action, system_role).await?;
    if decision.allowed {
        Ok(decision)
    } else {
        Err(PermissionError::Forbidden(format!(
            "{} on album {} for subject {:?}: {}",
            action, album_id, subject, decision.reason
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::{
        MembershipFacts, ResolveRequest, evaluate_membership, evaluate_pre_membership,
    };
    use crate::api::permissions::interfaces::DecisionReason;
    use crate::api::permissions::roles::SystemRole;
    use crate::database::tables::album::{Album, AlbumRole};
    use crate::database::tables::album_member::AlbumMember;
    use crate::database::tables::permission_override::AlbumAction;
    use chrono::Utc;

    fn album(owner_id: i32, is_public: bool) -> Album {
        Album {
            id: "alb_test".into(),
            owner_id,
            name: "Test album".into(),
            description: None,
            is_public,
            public_token: is_public.then(|| "tok_test".into()),
            deleted: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn member(user_id: i32, role: AlbumRole) -> AlbumMember {
        AlbumMember {
            id: 1,
            album_id: "alb_test".into(),
            user_id,
            role,
            added_at: Utc::now(),
        }
    }

    fn request(album: &Album, subject: Option<i32>, action: AlbumAction) -> ResolveRequest<'_> {
        ResolveRequest {
            album,
            subject,
            action,
            system_role: SystemRole::User,
        }
    }

    #[test]
    fn operator_bypasses_everything() {
        let album = album(1, false);
        let req = ResolveRequest {
            system_role: SystemRole::Operator,
            ..request(&album, None, AlbumAction::DeleteAlbum)
        };
        assert_eq!(
            evaluate_pre_membership(&req),
            Some(DecisionReason::SystemOperator)
        );
    }

    #[test]
    fn owner_bypasses_role_table() {
        let album = album(7, false);
        let req = request(&album, Some(7), AlbumAction::DeleteAlbum);
        assert_eq!(
            evaluate_pre_membership(&req),
            Some(DecisionReason::AlbumOwner)
        );
    }

    #[test]
    fn public_album_view_needs_no_membership() {
        let album = album(1, true);
        for subject in [None, Some(99)] {
            let req = request(&album, subject, AlbumAction::ViewAlbum);
            assert_eq!(
                evaluate_pre_membership(&req),
                Some(DecisionReason::PublicAlbum)
            );
        }
    }

    #[test]
    fn public_album_does_not_open_other_actions() {
        let album = album(1, true);
        let req = request(&album, None, AlbumAction::UploadPhoto);
        assert_eq!(
            evaluate_pre_membership(&req),
            Some(DecisionReason::AuthenticationRequired)
        );
    }

    #[test]
    fn private_view_without_subject_requires_authentication() {
        let album = album(1, false);
        let req = request(&album, None, AlbumAction::ViewAlbum);
        assert_eq!(
            evaluate_pre_membership(&req),
            Some(DecisionReason::AuthenticationRequired)
        );
    }

    #[test]
    fn authenticated_non_owner_falls_through_to_membership_phase() {
        let album = album(1, false);
        let req = request(&album, Some(2), AlbumAction::ViewAlbum);
        assert_eq!(evaluate_pre_membership(&req), None);
    }

    #[test]
    fn missing_membership_denies() {
        let facts = MembershipFacts {
            membership: None,
            override_granted: None,
        };
        assert_eq!(
            evaluate_membership(&facts, AlbumAction::ViewAlbum),
            DecisionReason::NotAMember
        );
    }

    #[test]
    fn override_beats_role_in_both_directions() {
        let viewer = member(2, AlbumRole::Viewer);
        // Viewer's role would deny an upload; a grant override wins.
        let granted = MembershipFacts {
            membership: Some(&viewer),
            override_granted: Some(true),
        };
        assert_eq!(
            evaluate_membership(&granted, AlbumAction::UploadPhoto),
            DecisionReason::OverrideGranted
        );

        let admin = member(3, AlbumRole::Admin);
        // Admin's role would allow member management; a deny override wins.
        let denied = MembershipFacts {
            membership: Some(&admin),
            override_granted: Some(false),
        };
        assert_eq!(
            evaluate_membership(&denied, AlbumAction::ManageMembers),
            DecisionReason::OverrideDenied
        );
    }

    #[test]
    fn role_table_decides_without_override() {
        let contributor = member(2, AlbumRole::Contributor);
        let facts = MembershipFacts {
            membership: Some(&contributor),
            override_granted: None,
        };
        assert_eq!(
            evaluate_membership(&facts, AlbumAction::UploadPhoto),
            DecisionReason::RoleGranted
        );
        assert_eq!(
            evaluate_membership(&facts, AlbumAction::ManageMembers),
            DecisionReason::RoleDenied
        );
    }
}
