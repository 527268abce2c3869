//! End-to-end checks of the album rule chain against fixed in-memory state.

use chrono::Utc;
use photos_access::api::permissions::context::decide;
use photos_access::api::permissions::guard::{
    GuardError, assert_member_removal, assert_role_change, assert_role_grant,
};
use photos_access::api::permissions::interfaces::DecisionReason;
use photos_access::api::permissions::roles::SystemRole;
use photos_access::database::tables::album::{Album, AlbumRole};
use photos_access::database::tables::album_member::AlbumMember;
use photos_access::database::tables::permission_override::AlbumAction;
use rstest::rstest;
use std::collections::HashMap;

const OWNER: i32 = 1;

fn album(is_public: bool) -> Album {
    Album {
        id: "alb_rules".into(),
        owner_id: OWNER,
        name: "Rule chain".into(),
        description: None,
        is_public,
        public_token: is_public.then(|| "tok_rules".into()),
        deleted: false,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn member(user_id: i32, role: AlbumRole) -> AlbumMember {
    AlbumMember {
        id: 100,
        album_id: "alb_rules".into(),
        user_id,
        role,
        added_at: Utc::now(),
    }
}

fn decide_for(
    album: &Album,
    subject: Option<i32>,
    membership: Option<&AlbumMember>,
    overrides: &HashMap<AlbumAction, bool>,
    action: AlbumAction,
) -> DecisionReason {
    decide(album, subject, SystemRole::User, membership, overrides, action)
}

#[rstest]
#[case(AlbumRole::Viewer, AlbumAction::ViewAlbum, true)]
#[case(AlbumRole::Viewer, AlbumAction::Comment, true)]
#[case(AlbumRole::Viewer, AlbumAction::UploadPhoto, false)]
#[case(AlbumRole::Viewer, AlbumAction::RemovePhoto, false)]
#[case(AlbumRole::Viewer, AlbumAction::EditAlbum, false)]
#[case(AlbumRole::Viewer, AlbumAction::ManageMembers, false)]
#[case(AlbumRole::Viewer, AlbumAction::DeleteAlbum, false)]
#[case(AlbumRole::Contributor, AlbumAction::UploadPhoto, true)]
#[case(AlbumRole::Contributor, AlbumAction::RemovePhoto, true)]
#[case(AlbumRole::Contributor, AlbumAction::EditAlbum, false)]
#[case(AlbumRole::Contributor, AlbumAction::ManageMembers, false)]
#[case(AlbumRole::Admin, AlbumAction::EditAlbum, true)]
#[case(AlbumRole::Admin, AlbumAction::ManageMembers, true)]
#[case(AlbumRole::Admin, AlbumAction::DeleteAlbum, false)]
#[case(AlbumRole::Owner, AlbumAction::DeleteAlbum, true)]
fn role_defaults_decide_member_requests(
    #[case] role: AlbumRole,
    #[case] action: AlbumAction,
    #[case] expected: bool,
) {
    let album = album(false);
    let membership = member(2, role);
    let reason = decide_for(&album, Some(2), Some(&membership), &HashMap::new(), action);
    assert_eq!(reason.allows(), expected, "{role} / {action}");
}

#[rstest]
fn owner_id_wins_without_any_membership_row(
    #[values(
        AlbumAction::ViewAlbum,
        AlbumAction::EditAlbum,
        AlbumAction::DeleteAlbum,
        AlbumAction::ManageMembers,
        AlbumAction::UploadPhoto,
        AlbumAction::RemovePhoto,
        AlbumAction::Comment
    )]
    action: AlbumAction,
) {
    let album = album(false);
    let reason = decide_for(&album, Some(OWNER), None, &HashMap::new(), action);
    assert_eq!(reason, DecisionReason::AlbumOwner);
}

#[test]
fn operator_bypass_precedes_every_other_rule() {
    let album = album(false);
    let reason = decide(
        &album,
        Some(999),
        SystemRole::Operator,
        None,
        &HashMap::new(),
        AlbumAction::DeleteAlbum,
    );
    assert_eq!(reason, DecisionReason::SystemOperator);
}

#[test]
fn public_album_grants_anonymous_view_only() {
    let album = album(true);
    let view = decide_for(&album, None, None, &HashMap::new(), AlbumAction::ViewAlbum);
    assert_eq!(view, DecisionReason::PublicAlbum);

    let upload = decide_for(&album, None, None, &HashMap::new(), AlbumAction::UploadPhoto);
    assert_eq!(upload, DecisionReason::AuthenticationRequired);
}

#[test]
fn private_album_rejects_strangers_and_anonymous_differently() {
    let album = album(false);
    let anonymous = decide_for(&album, None, None, &HashMap::new(), AlbumAction::ViewAlbum);
    assert_eq!(anonymous, DecisionReason::AuthenticationRequired);

    let stranger = decide_for(&album, Some(42), None, &HashMap::new(), AlbumAction::ViewAlbum);
    assert_eq!(stranger, DecisionReason::NotAMember);
}

#[test]
fn override_beats_the_role_default_both_ways() {
    let album = album(false);

    let viewer = member(2, AlbumRole::Viewer);
    let grants = HashMap::from([(AlbumAction::UploadPhoto, true)]);
    let granted = decide_for(
        &album,
        Some(2),
        Some(&viewer),
        &grants,
        AlbumAction::UploadPhoto,
    );
    assert_eq!(granted, DecisionReason::OverrideGranted);

    let admin = member(3, AlbumRole::Admin);
    let denials = HashMap::from([(AlbumAction::EditAlbum, false)]);
    let denied = decide_for(
        &album,
        Some(3),
        Some(&admin),
        &denials,
        AlbumAction::EditAlbum,
    );
    assert_eq!(denied, DecisionReason::OverrideDenied);
}

#[test]
fn override_for_one_action_leaves_others_on_role_defaults() {
    let album = album(false);
    let viewer = member(2, AlbumRole::Viewer);
    let overrides = HashMap::from([(AlbumAction::UploadPhoto, true)]);

    let other = decide_for(
        &album,
        Some(2),
        Some(&viewer),
        &overrides,
        AlbumAction::RemovePhoto,
    );
    assert_eq!(other, DecisionReason::RoleDenied);
}

#[test]
fn deny_override_cannot_touch_the_owner() {
    // Owner bypass fires before the membership phase, so a deny override
    // on the owner's membership row is unreachable.
    let album = album(false);
    let owner_membership = member(OWNER, AlbumRole::Owner);
    let denials = HashMap::from([(AlbumAction::DeleteAlbum, false)]);
    let reason = decide_for(
        &album,
        Some(OWNER),
        Some(&owner_membership),
        &denials,
        AlbumAction::DeleteAlbum,
    );
    assert_eq!(reason, DecisionReason::AlbumOwner);
}

#[rstest]
#[case(AlbumRole::Admin, AlbumRole::Viewer, true)]
#[case(AlbumRole::Admin, AlbumRole::Contributor, true)]
#[case(AlbumRole::Admin, AlbumRole::Admin, true)]
#[case(AlbumRole::Admin, AlbumRole::Owner, false)]
#[case(AlbumRole::Owner, AlbumRole::Admin, true)]
#[case(AlbumRole::Owner, AlbumRole::Owner, false)]
fn role_grants_cap_at_the_requester_rank(
    #[case] requester: AlbumRole,
    #[case] offered: AlbumRole,
    #[case] ok: bool,
) {
    assert_eq!(assert_role_grant(requester, offered).is_ok(), ok);
}

#[test]
fn owner_role_is_never_grantable() {
    assert!(matches!(
        assert_role_grant(AlbumRole::Owner, AlbumRole::Owner),
        Err(GuardError::OwnerRoleNotGrantable)
    ));
}

#[test]
fn admins_cannot_reshape_their_superiors() {
    assert!(assert_role_change(AlbumRole::Admin, AlbumRole::Owner, AlbumRole::Viewer).is_err());
    assert!(assert_member_removal(AlbumRole::Admin, AlbumRole::Owner).is_err());
    assert!(assert_member_removal(AlbumRole::Owner, AlbumRole::Admin).is_ok());
}
