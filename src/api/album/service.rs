use crate::api::album::error::AlbumError;
use crate::api::permissions::resolver::assert_can;
use crate::api::permissions::roles::SystemRole;
use crate::audit;
use crate::database::album_store::AlbumStore;
use crate::database::member_store::MemberStore;
use crate::database::tables::album::{Album, AlbumRole};
use crate::database::tables::permission_override::AlbumAction;
use crate::utils::nice_id;
use serde_json::json;
use sqlx::PgPool;
use tracing::instrument;

const ALBUM_ID_LENGTH: usize = 16;
const PUBLIC_TOKEN_LENGTH: usize = 32;

/// Creates an album together with its owner membership, in one transaction.
/// Every album has exactly one owner row from the moment it exists.
#[instrument(skip(pool))]
pub async fn create_album(
    pool: &PgPool,
    owner_id: i32,
    name: &str,
    description: Option<String>,
    is_public: bool,
) -> Result<Album, AlbumError> {
    let album_id = nice_id(ALBUM_ID_LENGTH);
    let public_token = is_public.then(|| nice_id(PUBLIC_TOKEN_LENGTH));

    let mut tx = pool.begin().await?;
    let album = AlbumStore::create(
        &mut *tx,
        &album_id,
        owner_id,
        name,
        description,
        is_public,
        public_token.as_deref(),
    )
    .await?;
    MemberStore::insert(&mut *tx, &album.id, owner_id, AlbumRole::Owner).await?;
    tx.commit().await?;

    audit::record(
        pool,
        &album.id,
        Some(owner_id),
        "album_created",
        json!({ "isPublic": is_public }),
    )
    .await;

    Ok(album)
}

/// Publishes or unpublishes an album. `is_public` and `public_token` flip
/// in a single UPDATE; unpublishing immediately invalidates the old token.
#[instrument(skip(pool))]
pub async fn set_public(
    pool: &PgPool,
    album_id: &str,
    actor: i32,
    system_role: SystemRole,
    is_public: bool,
) -> Result<Album, AlbumError> {
    assert_can(
        pool,
        album_id,
        Some(actor),
        AlbumAction::EditAlbum,
        system_role,
    )
    .await?;

    let public_token = is_public.then(|| nice_id(PUBLIC_TOKEN_LENGTH));
    let album = AlbumStore::set_public(pool, album_id, is_public, public_token.as_deref()).await?;

    audit::record(
        pool,
        album_id,
        Some(actor),
        "album_publication_changed",
        json!({ "isPublic": is_public }),
    )
    .await;

    Ok(album)
}

/// Fetches a public album by its share token. Unpublished and soft-deleted
/// albums are indistinguishable from missing ones.
#[instrument(skip(pool))]
pub async fn find_by_public_token(pool: &PgPool, token: &str) -> Result<Album, AlbumError> {
    AlbumStore::find_by_public_token(pool, token)
        .await?
        .ok_or_else(|| AlbumError::NotFound("no public album for token".into()))
}

/// Soft-deletes an album. The resolver refuses all actions on deleted
/// albums, so this cuts off members and public viewers alike.
#[instrument(skip(pool))]
pub async fn delete_album(
    pool: &PgPool,
    album_id: &str,
    actor: i32,
    system_role: SystemRole,
) -> Result<(), AlbumError> {
    assert_can(
        pool,
        album_id,
        Some(actor),
        AlbumAction::DeleteAlbum,
        system_role,
    )
    .await?;

    AlbumStore::soft_delete(pool, album_id).await?;

    audit::record(pool, album_id, Some(actor), "album_deleted", json!({})).await;

    Ok(())
}
