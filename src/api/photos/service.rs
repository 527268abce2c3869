use crate::api::permissions::resolver::assert_can;
use crate::api::permissions::roles::SystemRole;
use crate::api::photos::error::VisibilityError;
use crate::api::photos::interfaces::{PhotoAccessReason, PhotoDecision};
use crate::audit;
use crate::database::media_store::MediaStore;
use crate::database::member_store::MemberStore;
use crate::database::tables::media_item::{MediaItem, MediaVisibility};
use crate::database::tables::permission_override::AlbumAction;
use serde_json::json;
use sqlx::PgPool;
use std::collections::{HashMap, HashSet};
use tracing::instrument;

/// The pure three-state visibility rule. Callers are expected to have
/// passed the album-view check already; this only layers the per-photo
/// state on top.
#[must_use]
pub fn decide_photo(
    visibility: MediaVisibility,
    uploaded_by: i32,
    album_owner_id: i32,
    subject: Option<i32>,
    allowlisted: bool,
) -> PhotoAccessReason {
    if subject == Some(album_owner_id) {
        return PhotoAccessReason::AlbumOwner;
    }
    if subject == Some(uploaded_by) {
        return PhotoAccessReason::Uploader;
    }
    match visibility {
        MediaVisibility::AlbumDefault => PhotoAccessReason::AlbumDefault,
        MediaVisibility::Hidden => PhotoAccessReason::HiddenFromMembers,
        MediaVisibility::Restricted => {
            if allowlisted {
                PhotoAccessReason::Allowlisted
            } else {
                PhotoAccessReason::NotAllowlisted
            }
        }
    }
}

/// Pre-transaction validation of a visibility change: the allowlist must
/// match the target state and may only name existing album members. The
/// offending ids are reported as an exact, sorted set difference.
pub fn validate_allowlist(
    visibility: MediaVisibility,
    allowed_user_ids: &[i32],
    member_ids: &HashSet<i32>,
) -> Result<(), VisibilityError> {
    match visibility {
        MediaVisibility::Restricted if allowed_user_ids.is_empty() => {
            return Err(VisibilityError::Validation(
                "A restricted photo requires a non-empty allowlist.".into(),
            ));
        }
        MediaVisibility::AlbumDefault | MediaVisibility::Hidden
            if !allowed_user_ids.is_empty() =>
        {
            return Err(VisibilityError::Validation(format!(
                "An allowlist is only valid for restricted visibility, not {visibility}."
            )));
        }
        _ => {}
    }

    let mut non_members: Vec<i32> = allowed_user_ids
        .iter()
        .copied()
        .filter(|id| !member_ids.contains(id))
        .collect();
    non_members.sort_unstable();
    non_members.dedup();

    if non_members.is_empty() {
        Ok(())
    } else {
        Err(VisibilityError::Validation(format!(
            "Allowlisted users are not album members: {non_members:?}"
        )))
    }
}

/// Resolves whether `subject` may see a photo. Must only be called once
/// the subject already holds view access on the photo's album.
#[instrument(skip(pool))]
pub async fn resolve_photo(
    pool: &PgPool,
    media_item_id: &str,
    subject: Option<i32>,
    album_owner_id: i32,
) -> Result<PhotoDecision, VisibilityError> {
    let item = MediaStore::find_by_id(pool, media_item_id)
        .await?
        .ok_or_else(|| VisibilityError::NotFound(format!("media item {media_item_id}")))?;

    let allowlisted = match (item.visibility, subject) {
        (MediaVisibility::Restricted, Some(user_id)) => {
            MediaStore::is_allowlisted(pool, media_item_id, user_id).await?
        }
        _ => false,
    };

    let reason = decide_photo(
        item.visibility,
        item.uploaded_by,
        album_owner_id,
        subject,
        allowlisted,
    );

    Ok(PhotoDecision {
        allowed: reason.allows(),
        reason,
    })
}

/// Whether `actor` may change a photo's visibility: its uploader, or anyone
/// holding album-edit (admin-equivalent) through the resolver.
async fn ensure_can_set_visibility(
    pool: &PgPool,
    item: &MediaItem,
    actor: i32,
    system_role: SystemRole,
) -> Result<(), VisibilityError> {
    if actor == item.uploaded_by {
        return Ok(());
    }
    assert_can(
        pool,
        &item.album_id,
        Some(actor),
        AlbumAction::EditAlbum,
        system_role,
    )
    .await?;
    Ok(())
}

async fn apply_visibility(
    tx: &mut sqlx::PgTransaction<'_>,
    media_item_id: &str,
    visibility: MediaVisibility,
    allowed_user_ids: &[i32],
) -> Result<(), VisibilityError> {
    MediaStore::set_visibility(&mut **tx, media_item_id, visibility).await?;
    MediaStore::clear_allowlist(&mut **tx, media_item_id).await?;
    if !allowed_user_ids.is_empty() {
        MediaStore::insert_allowlist(&mut **tx, media_item_id, allowed_user_ids).await?;
    }
    Ok(())
}

fn deduped(allowed_user_ids: &[i32]) -> Vec<i32> {
    let mut ids = allowed_user_ids.to_vec();
    ids.sort_unstable();
    ids.dedup();
    ids
}

/// Changes one photo's visibility and rewrites its allowlist atomically.
/// Validation happens before the transaction opens; a failure anywhere in
/// the body leaves the prior state fully intact.
#[instrument(skip(pool))]
pub async fn set_visibility(
    pool: &PgPool,
    media_item_id: &str,
    visibility: MediaVisibility,
    allowed_user_ids: &[i32],
    actor: i32,
    system_role: SystemRole,
) -> Result<(), VisibilityError> {
    let item = MediaStore::find_by_id(pool, media_item_id)
        .await?
        .ok_or_else(|| VisibilityError::NotFound(format!("media item {media_item_id}")))?;

    ensure_can_set_visibility(pool, &item, actor, system_role).await?;

    let member_ids: HashSet<i32> = MemberStore::list_user_ids(pool, &item.album_id)
        .await?
        .into_iter()
        .collect();
    validate_allowlist(visibility, allowed_user_ids, &member_ids)?;
    let allowlist = deduped(allowed_user_ids);

    let mut tx = pool.begin().await?;
    apply_visibility(&mut tx, media_item_id, visibility, &allowlist).await?;
    tx.commit().await?;

    audit::record(
        pool,
        &item.album_id,
        Some(actor),
        "visibility_changed",
        json!({
            "mediaItemIds": [media_item_id],
            "visibility": visibility,
            "allowedUserIds": allowlist,
        }),
    )
    .await;

    Ok(())
}

/// Bulk visibility change. Permission is pre-checked for every photo before
/// the transaction opens; one offending photo rejects the whole batch and
/// no photo's state changes.
#[instrument(skip(pool))]
pub async fn set_visibility_bulk(
    pool: &PgPool,
    media_item_ids: &[String],
    visibility: MediaVisibility,
    allowed_user_ids: &[i32],
    actor: i32,
    system_role: SystemRole,
) -> Result<(), VisibilityError> {
    let items = MediaStore::list_by_ids(pool, media_item_ids).await?;

    let found: HashSet<&str> = items.iter().map(|item| item.id.as_str()).collect();
    let mut missing: Vec<&str> = media_item_ids
        .iter()
        .map(String::as_str)
        .filter(|id| !found.contains(id))
        .collect();
    if !missing.is_empty() {
        missing.sort_unstable();
        return Err(VisibilityError::NotFound(format!(
            "media items {missing:?}"
        )));
    }

    // Permission pre-check over the full batch; nothing is written yet.
    let mut denied: Vec<&str> = Vec::new();
    for item in &items {
        if ensure_can_set_visibility(pool, item, actor, system_role)
            .await
            .is_err()
        {
            denied.push(item.id.as_str());
        }
    }
    if !denied.is_empty() {
        denied.sort_unstable();
        return Err(VisibilityError::Forbidden(format!(
            "visibility change denied for media items {denied:?}"
        )));
    }

    // Allowlist validation per album the batch touches.
    let mut members_by_album: HashMap<&str, HashSet<i32>> = HashMap::new();
    for item in &items {
        if !members_by_album.contains_key(item.album_id.as_str()) {
            let members = MemberStore::list_user_ids(pool, &item.album_id)
                .await?
                .into_iter()
                .collect();
            members_by_album.insert(item.album_id.as_str(), members);
        }
    }
    for members in members_by_album.values() {
        validate_allowlist(visibility, allowed_user_ids, members)?;
    }
    let allowlist = deduped(allowed_user_ids);

    let mut tx = pool.begin().await?;
    for item in &items {
        apply_visibility(&mut tx, &item.id, visibility, &allowlist).await?;
    }
    tx.commit().await?;

    let mut items_by_album: HashMap<&str, Vec<&str>> = HashMap::new();
    for item in &items {
        items_by_album
            .entry(item.album_id.as_str())
            .or_default()
            .push(item.id.as_str());
    }
    for (album_id, ids) in items_by_album {
        audit::record(
            pool,
            album_id,
            Some(actor),
            "visibility_changed",
            json!({
                "mediaItemIds": ids,
                "visibility": visibility,
                "allowedUserIds": allowlist,
            }),
        )
        .await;
    }

    Ok(())
}
