use crate::database::tables::invitation::AlbumInvitation;
use crate::database::tables::jobs::JobType;
use bon::builder;
use color_eyre::eyre::Result;
use serde::Serialize;
use serde_json::{json, to_value};
use sqlx::PgPool;
use tracing::info;

/// Enqueues a background job for the worker processes.
///
/// # Errors
///
/// Returns an error if the insert fails.
#[builder]
pub async fn enqueue_job<T: Serialize + Send + Sync>(
    #[builder(start_fn)] pool: &PgPool,
    #[builder(start_fn)] job_type: JobType,
    user_id: Option<i32>,
    payload: Option<&T>,
) -> Result<bool> {
    let json_payload = payload.and_then(|p| to_value(p).ok());

    let result = sqlx::query(
        r"
        INSERT INTO jobs (job_type, user_id, payload)
        VALUES ($1, $2, $3)
        ON CONFLICT DO NOTHING
        ",
    )
    .bind(job_type)
    .bind(user_id)
    .bind(json_payload.clone())
    .execute(pool)
    .await?;

    info!(
        "Enqueued {:?} job, user_id: {:?}, payload: {:?}",
        job_type, user_id, json_payload
    );

    Ok(result.rows_affected() > 0)
}

/// Fire-and-forget notification dispatch for a freshly created invitation.
/// A failed enqueue is alerted on and swallowed; the invitation itself has
/// already been committed.
pub async fn notify_invitation_created(pool: &PgPool, invitation: &AlbumInvitation) {
    let payload = json!({
        "invitationId": invitation.id,
        "albumId": invitation.album_id,
        "invitedEmail": invitation.invited_email,
        "invitedRole": invitation.invited_role,
    });

    let enqueued = enqueue_job(pool, JobType::InvitationEmail)
        .user_id(invitation.invited_by)
        .payload(&payload)
        .call()
        .await;

    if let Err(err) = enqueued {
        crate::alert!(
            "Failed to enqueue invitation email for invitation {}: {err}",
            invitation.id
        );
    }
}
