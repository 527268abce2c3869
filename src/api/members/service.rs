use crate::api::members::error::MemberError;
use crate::api::permissions::context::guard_role;
use crate::api::permissions::guard::{
    assert_member_removal, assert_role_change, assert_role_grant,
};
use crate::api::permissions::interfaces::AccessDecision;
use crate::api::permissions::resolver::assert_can;
use crate::api::permissions::roles::SystemRole;
use crate::audit;
use crate::database::member_store::MemberStore;
use crate::database::override_store::OverrideStore;
use crate::database::tables::album::AlbumRole;
use crate::database::tables::album_member::AlbumMember;
use crate::database::tables::permission_override::{AlbumAction, PermissionOverride};
use serde_json::json;
use sqlx::PgPool;
use tracing::instrument;

fn requester_rank(
    decision: &AccessDecision,
    actor: i32,
    system_role: SystemRole,
) -> Result<AlbumRole, MemberError> {
    guard_role(
        &decision.album,
        actor,
        system_role,
        decision.membership.as_ref(),
    )
    .ok_or_else(|| {
        MemberError::Forbidden(format!(
            "subject {actor} holds no role in album {}",
            decision.album.id
        ))
    })
}

/// Looks up a member and checks it belongs to the album being operated on.
async fn find_album_member(
    pool: &PgPool,
    album_id: &str,
    member_id: i64,
) -> Result<AlbumMember, MemberError> {
    MemberStore::find_by_id(pool, member_id)
        .await?
        .filter(|member| member.album_id == album_id)
        .ok_or_else(|| MemberError::NotFound(format!("member {member_id} in album {album_id}")))
}

/// Adds a user to an album. The actor must hold `ManageMembers` and must
/// strictly outrank the role being handed out.
#[instrument(skip(pool))]
pub async fn add_member(
    pool: &PgPool,
    album_id: &str,
    actor: i32,
    system_role: SystemRole,
    user_id: i32,
    role: AlbumRole,
) -> Result<AlbumMember, MemberError> {
    let decision = assert_can(
        pool,
        album_id,
        Some(actor),
        AlbumAction::ManageMembers,
        system_role,
    )
    .await?;
    assert_role_grant(requester_rank(&decision, actor, system_role)?, role)?;

    // A duplicate (album, user) pair surfaces as Conflict via DbError.
    let member = MemberStore::insert(pool, album_id, user_id, role).await?;

    audit::record(
        pool,
        album_id,
        Some(actor),
        "member_added",
        json!({ "userId": user_id, "role": role }),
    )
    .await;

    Ok(member)
}

/// Changes an existing member's role, under the same escalation guard as
/// member-add and invitation creation.
#[instrument(skip(pool))]
pub async fn change_role(
    pool: &PgPool,
    album_id: &str,
    actor: i32,
    system_role: SystemRole,
    member_id: i64,
    new_role: AlbumRole,
) -> Result<AlbumMember, MemberError> {
    let decision = assert_can(
        pool,
        album_id,
        Some(actor),
        AlbumAction::ManageMembers,
        system_role,
    )
    .await?;
    let target = find_album_member(pool, album_id, member_id).await?;

    // The owner row can never be re-roled: no requester outranks owner.
    assert_role_change(
        requester_rank(&decision, actor, system_role)?,
        target.role,
        new_role,
    )?;

    let updated = MemberStore::update_role(pool, member_id, new_role).await?;

    audit::record(
        pool,
        album_id,
        Some(actor),
        "member_role_changed",
        json!({ "memberId": member_id, "from": target.role, "to": new_role }),
    )
    .await;

    Ok(updated)
}

/// Removes a member. The owner membership is never removable; it ranks
/// above every possible requester.
#[instrument(skip(pool))]
pub async fn remove_member(
    pool: &PgPool,
    album_id: &str,
    actor: i32,
    system_role: SystemRole,
    member_id: i64,
) -> Result<(), MemberError> {
    let decision = assert_can(
        pool,
        album_id,
        Some(actor),
        AlbumAction::ManageMembers,
        system_role,
    )
    .await?;
    let target = find_album_member(pool, album_id, member_id).await?;

    assert_member_removal(requester_rank(&decision, actor, system_role)?, target.role)?;

    MemberStore::remove(pool, member_id).await?;

    audit::record(
        pool,
        album_id,
        Some(actor),
        "member_removed",
        json!({ "memberId": member_id, "userId": target.user_id, "role": target.role }),
    )
    .await;

    Ok(())
}

/// Sets or replaces an explicit per-action override on a membership.
/// Overrides beat the member's role in both directions; owner rows take no
/// overrides.
#[instrument(skip(pool))]
pub async fn set_override(
    pool: &PgPool,
    album_id: &str,
    actor: i32,
    system_role: SystemRole,
    member_id: i64,
    action: AlbumAction,
    granted: bool,
    reason: Option<String>,
) -> Result<PermissionOverride, MemberError> {
    assert_can(
        pool,
        album_id,
        Some(actor),
        AlbumAction::ManageMembers,
        system_role,
    )
    .await?;
    let target = find_album_member(pool, album_id, member_id).await?;

    if target.role == AlbumRole::Owner {
        return Err(MemberError::Validation(
            "Overrides cannot be set on the owner membership.".into(),
        ));
    }

    let override_row =
        OverrideStore::upsert(pool, member_id, action, granted, actor, reason.clone()).await?;

    audit::record(
        pool,
        album_id,
        Some(actor),
        "override_set",
        json!({ "memberId": member_id, "action": action, "granted": granted, "reason": reason }),
    )
    .await;

    Ok(override_row)
}

/// Removes an explicit override, restoring the member's role-derived
/// outcome for that action.
#[instrument(skip(pool))]
pub async fn remove_override(
    pool: &PgPool,
    album_id: &str,
    actor: i32,
    system_role: SystemRole,
    member_id: i64,
    action: AlbumAction,
) -> Result<(), MemberError> {
    assert_can(
        pool,
        album_id,
        Some(actor),
        AlbumAction::ManageMembers,
        system_role,
    )
    .await?;
    find_album_member(pool, album_id, member_id).await?;

    let removed = OverrideStore::remove(pool, member_id, action).await?;
    if removed == 0 {
        return Err(MemberError::NotFound(format!(
            "override {action} on member {member_id}"
        )));
    }

    audit::record(
        pool,
        album_id,
        Some(actor),
        "override_removed",
        json!({ "memberId": member_id, "action": action }),
    )
    .await;

    Ok(())
}
