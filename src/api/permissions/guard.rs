use crate::database::tables::album::AlbumRole;
use thiserror::Error;

/// Escalation guard failures. All map to Forbidden at the API surface.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum GuardError {
    #[error("The owner role cannot be granted; it only moves via ownership transfer")]
    OwnerRoleNotGrantable,

    #[error("Cannot act on a member with an equal or higher role")]
    TargetOutranksRequester,

    #[error("Cannot grant a role equal to or above your own")]
    GrantOutranksRequester,
}

/// Checks that `requester` may hand out `offered` at all. Shared by direct
/// member-add and invitation creation (the inviter's rank gates the offered
/// role).
pub fn assert_role_grant(requester: AlbumRole, offered: AlbumRole) -> Result<(), GuardError> {
    if offered == AlbumRole::Owner {
        return Err(GuardError::OwnerRoleNotGrantable);
    }
    if offered.rank() >= requester.rank() {
        return Err(GuardError::GrantOutranksRequester);
    }
    Ok(())
}

/// Checks a role change of an existing member: the requester must strictly
/// outrank both the member's current role and the role being assigned.
pub fn assert_role_change(
    requester: AlbumRole,
    target: AlbumRole,
    new_role: AlbumRole,
) -> Result<(), GuardError> {
    if new_role == AlbumRole::Owner {
        return Err(GuardError::OwnerRoleNotGrantable);
    }
    if target.rank() >= requester.rank() {
        return Err(GuardError::TargetOutranksRequester);
    }
    if new_role.rank() >= requester.rank() {
        return Err(GuardError::GrantOutranksRequester);
    }
    Ok(())
}

/// Checks removal of an existing member; rank rules match a role change
/// without a new role.
pub fn assert_member_removal(requester: AlbumRole, target: AlbumRole) -> Result<(), GuardError> {
    if target.rank() >= requester.rank() {
        return Err(GuardError::TargetOutranksRequester);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{GuardError, assert_member_removal, assert_role_change, assert_role_grant};
    use crate::database::tables::album::AlbumRole::{self, Admin, Contributor, Owner, Viewer};
    use rstest::rstest;

    const ALL: [AlbumRole; 4] = [Viewer, Contributor, Admin, Owner];

    #[test]
    fn owner_is_never_grantable() {
        for requester in ALL {
            assert_eq!(
                assert_role_grant(requester, Owner),
                Err(GuardError::OwnerRoleNotGrantable)
            );
            for target in ALL {
                assert_eq!(
                    assert_role_change(requester, target, Owner),
                    Err(GuardError::OwnerRoleNotGrantable)
                );
            }
        }
    }

    #[test]
    fn grants_at_or_above_own_rank_are_rejected() {
        for requester in ALL {
            for offered in ALL {
                let result = assert_role_grant(requester, offered);
                if offered == Owner {
                    assert_eq!(result, Err(GuardError::OwnerRoleNotGrantable));
                } else if offered.rank() >= requester.rank() {
                    assert_eq!(result, Err(GuardError::GrantOutranksRequester));
                } else {
                    assert_eq!(result, Ok(()));
                }
            }
        }
    }

    #[rstest]
    #[case(Admin, Viewer, Contributor, Ok(()))]
    #[case(Owner, Admin, Viewer, Ok(()))]
    #[case(Admin, Admin, Viewer, Err(GuardError::TargetOutranksRequester))]
    #[case(Admin, Owner, Viewer, Err(GuardError::TargetOutranksRequester))]
    #[case(Contributor, Viewer, Viewer, Err(GuardError::GrantOutranksRequester))]
    #[case(Admin, Viewer, Admin, Err(GuardError::GrantOutranksRequester))]
    fn role_change_rank_grid(
        #[case] requester: AlbumRole,
        #[case] target: AlbumRole,
        #[case] new_role: AlbumRole,
        #[case] expected: Result<(), GuardError>,
    ) {
        assert_eq!(assert_role_change(requester, target, new_role), expected);
    }

    #[test]
    fn owner_membership_is_never_removable() {
        for requester in ALL {
            assert_eq!(
                assert_member_removal(requester, Owner),
                Err(GuardError::TargetOutranksRequester)
            );
        }
    }
}
