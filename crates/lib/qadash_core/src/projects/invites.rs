//! Project invites.
//!
//! An invite carries a random token that is emailed to the recipient and
//! stored only as its SHA-256 hash. Accepting it grants the invite's role.

use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use super::ProjectError;
use crate::models::project::{InvitePreview, InviteRow, InviteState, ProjectRole, ProjectRow};
use crate::tokens::{generate_token, hash_token};
use crate::uuid::uuidv7;

/// Default invite lifetime: 1 hour.
pub const DEFAULT_INVITE_TTL_SECS: i64 = 60 * 60;

const INVITE_COLUMNS: &str = "id, project_id, email, role, invited_by, expires_at, \
                              accepted_at, accepted_by, created_at";

/// Outcome of a successful acceptance.
#[derive(Debug, Clone)]
pub struct AcceptedInvite {
    pub project_id: Uuid,
    pub role: ProjectRole,
}

/// Create an invite for `email`. Returns the stored invite and the
/// plaintext token to be emailed.
///
/// Rejects the owner's own address and addresses of existing members.
pub async fn create_invite(
    pool: &PgPool,
    project: &ProjectRow,
    email: &str,
    role: ProjectRole,
    invited_by: &Uuid,
    ttl_secs: i64,
) -> Result<(InviteRow, String), ProjectError> {
    let (is_owner, is_member) = sqlx::query_as::<_, (bool, bool)>(
        r#"
        SELECT
            EXISTS(SELECT 1 FROM users WHERE id = $2 AND email = $3),
            EXISTS(SELECT 1 FROM project_members m JOIN users u ON u.id = m.user_id
                   WHERE m.project_id = $1 AND u.email = $3)
        "#,
    )
    .bind(project.id)
    .bind(project.owner_id)
    .bind(email)
    .fetch_one(pool)
    .await?;

    if is_owner {
        return Err(ProjectError::Validation(
            "The project owner cannot be invited".into(),
        ));
    }
    if is_member {
        return Err(ProjectError::Conflict(
            "User is already a member of this project".into(),
        ));
    }

    let plaintext = generate_token();
    let expires_at = Utc::now() + Duration::seconds(ttl_secs);

    let invite = sqlx::query_as::<_, InviteRow>(&format!(
        "INSERT INTO project_invites (id, project_id, token_hash, email, role, invited_by, expires_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7) \
         RETURNING {INVITE_COLUMNS}"
    ))
    .bind(uuidv7())
    .bind(project.id)
    .bind(hash_token(&plaintext))
    .bind(email)
    .bind(role)
    .bind(invited_by)
    .bind(expires_at)
    .fetch_one(pool)
    .await?;

    info!(project_id = %project.id, invite_id = %invite.id, role = %role, "invite created");
    Ok((invite, plaintext))
}

/// Invites that are neither accepted nor expired, newest first.
pub async fn list_pending(pool: &PgPool, project_id: &Uuid) -> Result<Vec<InviteRow>, ProjectError> {
    let rows = sqlx::query_as::<_, InviteRow>(&format!(
        "SELECT {INVITE_COLUMNS} FROM project_invites \
         WHERE project_id = $1 AND accepted_at IS NULL AND expires_at > now() \
         ORDER BY created_at DESC"
    ))
    .bind(project_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Revoke an unaccepted invite.
pub async fn revoke_invite(
    pool: &PgPool,
    project_id: &Uuid,
    invite_id: &Uuid,
) -> Result<(), ProjectError> {
    let result = sqlx::query(
        "DELETE FROM project_invites \
         WHERE id = $1 AND project_id = $2 AND accepted_at IS NULL",
    )
    .bind(invite_id)
    .bind(project_id)
    .execute(pool)
    .await?;
    if result.rows_affected() == 0 {
        return Err(ProjectError::NotFound("Invite not found"));
    }
    Ok(())
}

#[derive(sqlx::FromRow)]
struct PreviewRow {
    project_id: Uuid,
    project_name: String,
    email: String,
    role: ProjectRole,
    invited_by: String,
    expires_at: DateTime<Utc>,
    accepted_at: Option<DateTime<Utc>>,
}

/// Public preview of an invite by token.
pub async fn preview_invite(pool: &PgPool, token: &str) -> Result<InvitePreview, ProjectError> {
    let row = sqlx::query_as::<_, PreviewRow>(
        r#"
        SELECT i.project_id, p.name AS project_name, i.email, i.role,
               u.username AS invited_by, i.expires_at, i.accepted_at
        FROM project_invites i
        JOIN projects p ON p.id = i.project_id
        JOIN users u ON u.id = i.invited_by
        WHERE i.token_hash = $1
        "#,
    )
    .bind(hash_token(token))
    .fetch_optional(pool)
    .await?
    .ok_or(ProjectError::NotFound("Invite not found"))?;

    let state = InviteState::at(row.accepted_at, row.expires_at, Utc::now());

    Ok(InvitePreview {
        project_id: row.project_id,
        project_name: row.project_name,
        email: row.email,
        role: row.role,
        invited_by: row.invited_by,
        expires_at: row.expires_at,
        state,
    })
}

/// Accept an invite on behalf of `user_id`.
///
/// The invite row is locked for the duration of the transaction, so a token
/// can be consumed at most once. Only the account registered under the
/// invited address may accept. An existing membership is overwritten with
/// the invite's role.
pub async fn accept_invite(
    pool: &PgPool,
    token: &str,
    user_id: &Uuid,
) -> Result<AcceptedInvite, ProjectError> {
    let mut tx = pool.begin().await?;

    let invite = sqlx::query_as::<_, InviteRow>(&format!(
        "SELECT {INVITE_COLUMNS} FROM project_invites WHERE token_hash = $1 FOR UPDATE"
    ))
    .bind(hash_token(token))
    .fetch_optional(&mut *tx)
    .await?
    .ok_or(ProjectError::NotFound("Invite not found"))?;

    match invite.state_at(Utc::now()) {
        InviteState::Accepted => {
            return Err(ProjectError::Conflict(
                "Invite has already been accepted".into(),
            ));
        }
        InviteState::Expired => {
            return Err(ProjectError::Validation("Invite has expired".into()));
        }
        InviteState::Pending => {}
    }

    let (owner_id, user_email) = sqlx::query_as::<_, (Uuid, String)>(
        r#"
        SELECT p.owner_id, u.email
        FROM projects p, users u
        WHERE p.id = $1 AND u.id = $2
        "#,
    )
    .bind(invite.project_id)
    .bind(user_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or(ProjectError::NotFound("Invite not found"))?;
    if !user_email.eq_ignore_ascii_case(&invite.email) {
        return Err(ProjectError::Forbidden(
            "This invite was sent to a different email address",
        ));
    }
    if owner_id == *user_id {
        return Err(ProjectError::Validation(
            "You already own this project".into(),
        ));
    }

    sqlx::query(
        r#"
        INSERT INTO project_members (project_id, user_id, role)
        VALUES ($1, $2, $3)
        ON CONFLICT (project_id, user_id) DO UPDATE SET role = EXCLUDED.role
        "#,
    )
    .bind(invite.project_id)
    .bind(user_id)
    .bind(invite.role)
    .execute(&mut *tx)
    .await?;

    sqlx::query("UPDATE project_invites SET accepted_at = now(), accepted_by = $2 WHERE id = $1")
        .bind(invite.id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    info!(
        project_id = %invite.project_id,
        user_id = %user_id,
        role = %invite.role,
        "invite accepted"
    );
    Ok(AcceptedInvite {
        project_id: invite.project_id,
        role: invite.role,
    })
}
