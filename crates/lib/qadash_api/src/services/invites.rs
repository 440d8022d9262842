//! Invite service: send, list, revoke, preview and accept.

use qadash_core::access::Action;
use qadash_core::auth::queries::get_user_by_id;
use qadash_core::mail;
use qadash_core::models::project::{InvitePreview, InviteRow, ProjectRole};
use qadash_core::projects::{self, invites, queries};
use qadash_core::validation;
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::ApiConfig;
use crate::error::AppResult;
use crate::models::{AcceptInviteResponse, CreateInviteRequest};

/// Create an invite and email its link. Owner or project admin only.
///
/// Mail failures are logged; the invite stays valid and can be re-sent.
pub async fn send_invite(
    pool: &PgPool,
    http: &reqwest::Client,
    config: &ApiConfig,
    user_id: &Uuid,
    project_id: &Uuid,
    body: &CreateInviteRequest,
) -> AppResult<InviteRow> {
    projects::require(pool, project_id, user_id, Action::ManageInvites).await?;
    let role: ProjectRole = body.role.parse()?;
    let email = validation::email(&body.email)?;
    let project = queries::get_project(pool, project_id).await?;

    let (invite, token) =
        invites::create_invite(pool, &project, &email, role, user_id, config.invite_ttl_secs)
            .await?;

    let inviter = get_user_by_id(pool, user_id)
        .await?
        .map(|u| u.username)
        .unwrap_or_else(|| "A teammate".to_string());
    let message = mail::invite_email(
        &config.frontend_url,
        &email,
        &project.name,
        &inviter,
        role,
        &token,
        config.invite_ttl_secs,
    );
    if let Err(e) = mail::send(http, &config.mail, &message).await {
        warn!(invite_id = %invite.id, error = %e, "failed to send invite email");
    }
    Ok(invite)
}

/// Pending invites of a project. Owner or project admin only.
pub async fn list_invites(
    pool: &PgPool,
    user_id: &Uuid,
    project_id: &Uuid,
) -> AppResult<Vec<InviteRow>> {
    projects::require(pool, project_id, user_id, Action::ManageInvites).await?;
    Ok(invites::list_pending(pool, project_id).await?)
}

pub async fn revoke_invite(
    pool: &PgPool,
    user_id: &Uuid,
    project_id: &Uuid,
    invite_id: &Uuid,
) -> AppResult<()> {
    projects::require(pool, project_id, user_id, Action::ManageInvites).await?;
    invites::revoke_invite(pool, project_id, invite_id).await?;
    info!(project_id = %project_id, invite_id = %invite_id, "invite revoked");
    Ok(())
}

/// Public preview shown on the accept-invite page.
pub async fn preview_invite(pool: &PgPool, token: &str) -> AppResult<InvitePreview> {
    Ok(invites::preview_invite(pool, token.trim()).await?)
}

pub async fn accept_invite(
    pool: &PgPool,
    user_id: &Uuid,
    token: &str,
) -> AppResult<AcceptInviteResponse> {
    let accepted = invites::accept_invite(pool, token.trim(), user_id).await?;
    Ok(AcceptInviteResponse {
        message: "Invite accepted".into(),
        project_id: accepted.project_id,
        role: accepted.role,
    })
}
