//! Invitation lifecycle accounting, driven through the pure claim logic and
//! the token codec.

use chrono::{Duration, Utc};
use photos_access::api::invitations::error::InvitationError;
use photos_access::api::invitations::service::claim_use;
use photos_access::api::invitations::token::{generate_invite_token, hash_invite_token};
use photos_access::database::tables::album::AlbumRole;
use photos_access::database::tables::invitation::{AlbumInvitation, InvitationStatus};
use rstest::rstest;

fn invitation(status: InvitationStatus, max_uses: Option<i32>, use_count: i32) -> AlbumInvitation {
    let now = Utc::now();
    AlbumInvitation {
        id: 1,
        album_id: "alb_invite".into(),
        invited_by: 1,
        invited_email: Some("friend@example.com".into()),
        invited_role: AlbumRole::Contributor,
        token_hash: hash_invite_token("raw-secret"),
        status,
        expires_at: now + Duration::days(7),
        max_uses,
        use_count,
        created_at: now,
    }
}

#[test]
fn capped_invitation_accepts_until_exhausted() {
    let now = Utc::now();
    let mut invite = invitation(InvitationStatus::Pending, Some(3), 0);

    for expected_count in 1..=3 {
        let (count, status) = claim_use(&invite, now).unwrap();
        assert_eq!(count, expected_count);
        let expected_status = if expected_count == 3 {
            InvitationStatus::Accepted
        } else {
            InvitationStatus::Pending
        };
        assert_eq!(status, expected_status);
        invite.use_count = count;
        invite.status = status;
    }

    // The fourth claimant finds a terminal invitation.
    assert!(matches!(
        claim_use(&invite, now),
        Err(InvitationError::Gone(_))
    ));
}

#[test]
fn uncapped_invitation_never_terminates_through_use() {
    let now = Utc::now();
    let mut invite = invitation(InvitationStatus::Pending, None, 0);

    for expected_count in 1..=50 {
        let (count, status) = claim_use(&invite, now).unwrap();
        assert_eq!(count, expected_count);
        assert_eq!(status, InvitationStatus::Pending);
        invite.use_count = count;
    }
    assert_eq!(invite.uses_remaining(), None);
}

#[rstest]
#[case(InvitationStatus::Accepted)]
#[case(InvitationStatus::Declined)]
#[case(InvitationStatus::Expired)]
#[case(InvitationStatus::Revoked)]
fn terminal_states_cannot_be_claimed(#[case] status: InvitationStatus) {
    let invite = invitation(status, None, 0);
    assert!(matches!(
        claim_use(&invite, Utc::now()),
        Err(InvitationError::Gone(_))
    ));
    assert!(status.is_terminal());
}

#[test]
fn expiry_is_checked_against_the_clock_not_the_status() {
    let mut invite = invitation(InvitationStatus::Pending, Some(5), 0);
    invite.expires_at = Utc::now() - Duration::hours(1);

    assert!(invite.is_expired(Utc::now()));
    assert!(matches!(
        claim_use(&invite, Utc::now()),
        Err(InvitationError::Gone(_))
    ));

    // One second before expiry the same invitation is claimable.
    let just_before = invite.expires_at - Duration::seconds(1);
    assert!(claim_use(&invite, just_before).is_ok());
}

#[test]
fn use_count_already_at_cap_is_gone_even_while_pending() {
    // A concurrent claimant can observe pending with an exhausted counter
    // in the window before the status flip commits.
    let invite = invitation(InvitationStatus::Pending, Some(2), 2);
    assert!(matches!(
        claim_use(&invite, Utc::now()),
        Err(InvitationError::Gone(_))
    ));
    assert_eq!(invite.uses_remaining(), Some(0));
}

#[test]
fn presented_tokens_match_their_stored_hash() {
    let parts = generate_invite_token();
    assert_eq!(hash_invite_token(&parts.raw_token), parts.token_hash);
    // URL-safe alphabet, no padding; safe to put in a link.
    assert!(
        !parts.raw_token.contains('=')
            && !parts.raw_token.contains('+')
            && !parts.raw_token.contains('/')
    );
}
