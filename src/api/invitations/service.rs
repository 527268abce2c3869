use crate::api::invitations::error::InvitationError;
use crate::api::invitations::interfaces::{
    AcceptedInvitation, CreatedInvitation, InvitationPreview,
};
use crate::api::invitations::token::{generate_invite_token, hash_invite_token};
use crate::api::permissions::context::guard_role;
use crate::api::permissions::guard::assert_role_grant;
use crate::api::permissions::resolver::assert_can;
use crate::api::permissions::roles::SystemRole;
use crate::audit;
use crate::database::DbError;
use crate::database::album_store::AlbumStore;
use crate::database::invitation_store::InvitationStore;
use crate::database::member_store::MemberStore;
use crate::database::tables::album::AlbumRole;
use crate::database::tables::invitation::{AlbumInvitation, InvitationStatus};
use crate::database::tables::permission_override::AlbumAction;
use crate::job_queue;
use chrono::{DateTime, Duration, Utc};
use serde_json::json;
use sqlx::PgPool;
use tracing::instrument;

/// The pure accept-side state transition: whether one more use can be
/// claimed right now, and where `use_count`/`status` land if it is.
///
/// The status flips to `accepted` only on the final permitted use; an
/// uncapped invitation stays `pending` forever.
pub fn claim_use(
    invitation: &AlbumInvitation,
    now: DateTime<Utc>,
) -> Result<(i32, InvitationStatus), InvitationError> {
    if invitation.status.is_terminal() {
        return Err(InvitationError::Gone(format!(
            "invitation {} is {}",
            invitation.id, invitation.status
        )));
    }
    if invitation.is_expired(now) {
        return Err(InvitationError::Gone(format!(
            "invitation {} expired at {}",
            invitation.id, invitation.expires_at
        )));
    }

    let new_count = invitation.use_count + 1;
    let new_status = match invitation.max_uses {
        Some(max) if invitation.use_count >= max => {
            return Err(InvitationError::Gone(format!(
                "invitation {} has no uses left",
                invitation.id
            )));
        }
        Some(max) if new_count >= max => InvitationStatus::Accepted,
        _ => InvitationStatus::Pending,
    };

    Ok((new_count, new_status))
}

/// Creates an invitation and returns the raw secret exactly once.
///
/// Any still-pending invitation for the same (album, email) is revoked in
/// the same transaction, so at most one live invitation exists per email
/// per album. The offered role passes the same escalation guard as a
/// direct member-add.
#[instrument(skip(pool))]
pub async fn create(
    pool: &PgPool,
    album_id: &str,
    actor: i32,
    system_role: SystemRole,
    invited_email: Option<&str>,
    invited_role: AlbumRole,
    ttl: Duration,
    max_uses: Option<i32>,
) -> Result<CreatedInvitation, InvitationError> {
    let decision = assert_can(
        pool,
        album_id,
        Some(actor),
        AlbumAction::ManageMembers,
        system_role,
    )
    .await?;

    let requester = guard_role(
        &decision.album,
        actor,
        system_role,
        decision.membership.as_ref(),
    )
    .ok_or_else(|| {
        InvitationError::Forbidden(format!("subject {actor} holds no role in album {album_id}"))
    })?;
    assert_role_grant(requester, invited_role)?;

    if matches!(max_uses, Some(max) if max < 1) {
        return Err(InvitationError::Validation(
            "maxUses must be at least 1.".into(),
        ));
    }

    let parts = generate_invite_token();
    let expires_at = Utc::now() + ttl;

    let mut tx = pool.begin().await?;
    if let Some(email) = invited_email {
        InvitationStore::revoke_pending_for_email(&mut *tx, album_id, email).await?;
    }
    // A concurrent create for the same email sees no pending row to revoke
    // either; the partial unique index on pending invitations decides the
    // race and the loser surfaces Conflict.
    let invitation = match InvitationStore::insert(
        &mut *tx,
        album_id,
        actor,
        invited_email,
        invited_role,
        &parts.token_hash,
        expires_at,
        max_uses,
    )
    .await
    {
        Ok(invitation) => invitation,
        Err(DbError::UniqueViolation(_)) => {
            return Err(InvitationError::Conflict(
                "An invitation for this email is already pending.".into(),
            ));
        }
        Err(err) => return Err(err.into()),
    };
    tx.commit().await?;

    // Both are best-effort; the invitation is already committed.
    job_queue::notify_invitation_created(pool, &invitation).await;
    audit::record(
        pool,
        album_id,
        Some(actor),
        "invitation_created",
        json!({
            "invitationId": invitation.id,
            "invitedEmail": invitation.invited_email,
            "invitedRole": invitation.invited_role,
            "maxUses": invitation.max_uses,
        }),
    )
    .await;

    Ok(CreatedInvitation {
        token: parts.raw_token,
        invitation,
    })
}

/// Token-authenticated preview: what the invitation offers, without a
/// session. A pending invitation past its expiry is persisted as expired
/// before Gone is reported.
#[instrument(skip(pool, raw_token))]
pub async fn preview(pool: &PgPool, raw_token: &str) -> Result<InvitationPreview, InvitationError> {
    let token_hash = hash_invite_token(raw_token);
    let invitation = InvitationStore::find_by_hash(pool, &token_hash)
        .await?
        .ok_or_else(|| InvitationError::NotFound("no invitation for token".into()))?;

    if invitation.status.is_terminal() {
        return Err(InvitationError::Gone(format!(
            "invitation {} is {}",
            invitation.id, invitation.status
        )));
    }
    if invitation.is_expired(Utc::now()) {
        InvitationStore::set_status_from_pending(pool, invitation.id, InvitationStatus::Expired)
            .await?;
        return Err(InvitationError::Gone(format!(
            "invitation {} expired at {}",
            invitation.id, invitation.expires_at
        )));
    }

    let album = AlbumStore::find_by_id(pool, &invitation.album_id)
        .await?
        .filter(|album| !album.deleted)
        .ok_or_else(|| InvitationError::NotFound(format!("album {}", invitation.album_id)))?;

    Ok(InvitationPreview {
        album_id: album.id,
        album_name: album.name,
        invited_role: invitation.invited_role,
        uses_remaining: invitation.uses_remaining(),
        invited_email: invitation.invited_email,
        expires_at: invitation.expires_at,
    })
}

/// Accepts an invitation for an authenticated subject: membership creation
/// and the use-count increment commit or roll back as one unit.
#[instrument(skip(pool, raw_token))]
pub async fn accept(
    pool: &PgPool,
    raw_token: &str,
    subject: i32,
) -> Result<AcceptedInvitation, InvitationError> {
    let token_hash = hash_invite_token(raw_token);

    let mut tx = pool.begin().await?;
    let invitation = InvitationStore::find_by_hash_for_update(&mut *tx, &token_hash)
        .await?
        .ok_or_else(|| InvitationError::NotFound("no invitation for token".into()))?;

    let now = Utc::now();
    if !invitation.status.is_terminal() && invitation.is_expired(now) {
        // Lazy expiry must survive even though the accept itself fails.
        InvitationStore::set_status_from_pending(&mut *tx, invitation.id, InvitationStatus::Expired)
            .await?;
        tx.commit().await?;
        return Err(InvitationError::Gone(format!(
            "invitation {} expired at {}",
            invitation.id, invitation.expires_at
        )));
    }

    let (new_count, new_status) = claim_use(&invitation, now)?;

    if MemberStore::find(&mut *tx, &invitation.album_id, subject)
        .await?
        .is_some()
    {
        return Err(InvitationError::Conflict(format!(
            "subject {subject} is already a member of album {}",
            invitation.album_id
        )));
    }

    // A concurrent accept that slipped past the row lock collides here,
    // either on membership uniqueness or on the guarded counter update.
    let membership = MemberStore::insert(
        &mut *tx,
        &invitation.album_id,
        subject,
        invitation.invited_role,
    )
    .await?;
    let updated = InvitationStore::record_use(
        &mut *tx,
        invitation.id,
        new_count,
        new_status,
        invitation.use_count,
    )
    .await?;
    if updated == 0 {
        return Err(InvitationError::Conflict(format!(
            "invitation {} was claimed concurrently",
            invitation.id
        )));
    }
    tx.commit().await?;

    audit::record(
        pool,
        &invitation.album_id,
        Some(subject),
        "invitation_accepted",
        json!({
            "invitationId": invitation.id,
            "useCount": new_count,
            "status": new_status,
        }),
    )
    .await;

    Ok(AcceptedInvitation {
        membership,
        invitation_status: new_status,
        use_count: new_count,
    })
}

/// Declines a pending invitation, irrespective of how many uses it has
/// already seen.
#[instrument(skip(pool, raw_token))]
pub async fn decline(pool: &PgPool, raw_token: &str) -> Result<(), InvitationError> {
    let token_hash = hash_invite_token(raw_token);
    let invitation = InvitationStore::find_by_hash(pool, &token_hash)
        .await?
        .ok_or_else(|| InvitationError::NotFound("no invitation for token".into()))?;

    if invitation.status.is_terminal() {
        return Err(InvitationError::Gone(format!(
            "invitation {} is {}",
            invitation.id, invitation.status
        )));
    }
    if invitation.is_expired(Utc::now()) {
        InvitationStore::set_status_from_pending(pool, invitation.id, InvitationStatus::Expired)
            .await?;
        return Err(InvitationError::Gone(format!(
            "invitation {} expired at {}",
            invitation.id, invitation.expires_at
        )));
    }

    let updated =
        InvitationStore::set_status_from_pending(pool, invitation.id, InvitationStatus::Declined)
            .await?;
    if updated == 0 {
        return Err(InvitationError::Gone(format!(
            "invitation {} was resolved concurrently",
            invitation.id
        )));
    }

    audit::record(
        pool,
        &invitation.album_id,
        None,
        "invitation_declined",
        json!({ "invitationId": invitation.id }),
    )
    .await;

    Ok(())
}

/// Revokes a pending invitation. Irreversible, and limited to subjects who
/// can manage members on the album.
#[instrument(skip(pool))]
pub async fn revoke(
    pool: &PgPool,
    invitation_id: i64,
    actor: i32,
    system_role: SystemRole,
) -> Result<(), InvitationError> {
    let invitation = InvitationStore::find_by_id(pool, invitation_id)
        .await?
        .ok_or_else(|| InvitationError::NotFound(format!("invitation {invitation_id}")))?;

    assert_can(
        pool,
        &invitation.album_id,
        Some(actor),
        AlbumAction::ManageMembers,
        system_role,
    )
    .await?;

    if invitation.status.is_terminal() {
        return Err(InvitationError::Gone(format!(
            "invitation {} is {}",
            invitation.id, invitation.status
        )));
    }

    let updated =
        InvitationStore::set_status_from_pending(pool, invitation.id, InvitationStatus::Revoked)
            .await?;
    if updated == 0 {
        return Err(InvitationError::Gone(format!(
            "invitation {} was resolved concurrently",
            invitation.id
        )));
    }

    audit::record(
        pool,
        &invitation.album_id,
        Some(actor),
        "invitation_revoked",
        json!({ "invitationId": invitation.id }),
    )
    .await;

    Ok(())
}
