//! Photo visibility edge cases around the allowlist and the bypass order.

use photos_access::api::photos::interfaces::PhotoAccessReason;
use photos_access::api::photos::service::{decide_photo, validate_allowlist};
use photos_access::database::tables::media_item::MediaVisibility;
use rstest::rstest;
use std::collections::HashSet;

const OWNER: i32 = 1;
const UPLOADER: i32 = 2;
const MEMBER: i32 = 3;

#[rstest]
#[case(MediaVisibility::AlbumDefault)]
#[case(MediaVisibility::Restricted)]
#[case(MediaVisibility::Hidden)]
fn uploader_and_owner_see_through_every_state(#[case] visibility: MediaVisibility) {
    let uploader = decide_photo(visibility, UPLOADER, OWNER, Some(UPLOADER), false);
    assert_eq!(uploader, PhotoAccessReason::Uploader);

    let owner = decide_photo(visibility, UPLOADER, OWNER, Some(OWNER), false);
    assert_eq!(owner, PhotoAccessReason::AlbumOwner);
}

#[test]
fn hidden_beats_an_allowlist_leftover() {
    // Rows can linger in the allowlist after flipping restricted -> hidden;
    // hidden must not consult them.
    let reason = decide_photo(MediaVisibility::Hidden, UPLOADER, OWNER, Some(MEMBER), true);
    assert_eq!(reason, PhotoAccessReason::HiddenFromMembers);
}

#[test]
fn owner_uploading_their_own_photo_reads_as_owner() {
    // Ownership is checked before uploadership, so the reason is stable
    // when both apply.
    let reason = decide_photo(MediaVisibility::Hidden, OWNER, OWNER, Some(OWNER), false);
    assert_eq!(reason, PhotoAccessReason::AlbumOwner);
}

#[test]
fn duplicate_allowlist_entries_are_tolerated() {
    let members = HashSet::from([OWNER, UPLOADER, MEMBER]);
    assert!(validate_allowlist(MediaVisibility::Restricted, &[MEMBER, MEMBER], &members).is_ok());
}
