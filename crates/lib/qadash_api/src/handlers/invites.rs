//! Invite handlers.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use qadash_core::models::project::{InvitePreview, InviteRow};
use uuid::Uuid;

use crate::AppState;
use crate::error::AppResult;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::{AcceptInviteResponse, CreateInviteRequest, InvitesResponse, MessageResponse};
use crate::services::invites;

/// `POST /api/projects/{id}/invites`: create an invite and email the link.
pub async fn send_invite_handler(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
    Path(project_id): Path<Uuid>,
    Json(body): Json<CreateInviteRequest>,
) -> AppResult<(StatusCode, Json<InviteRow>)> {
    let invite = invites::send_invite(
        &state.pool,
        &state.http,
        &state.config,
        &user.id,
        &project_id,
        &body,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(invite)))
}

/// `GET /api/projects/{id}/invites`: pending invites.
pub async fn list_invites_handler(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
    Path(project_id): Path<Uuid>,
) -> AppResult<Json<InvitesResponse>> {
    let invites = invites::list_invites(&state.pool, &user.id, &project_id).await?;
    Ok(Json(InvitesResponse { invites }))
}

/// `DELETE /api/projects/{id}/invites/{invite_id}`
pub async fn revoke_invite_handler(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
    Path((project_id, invite_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<MessageResponse>> {
    invites::revoke_invite(&state.pool, &user.id, &project_id, &invite_id).await?;
    Ok(Json(MessageResponse::new("Invite revoked")))
}

/// `GET /api/invites/{token}`: public preview for the accept page.
pub async fn preview_invite_handler(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> AppResult<Json<InvitePreview>> {
    Ok(Json(invites::preview_invite(&state.pool, &token).await?))
}

/// `POST /api/invites/{token}/accept`
pub async fn accept_invite_handler(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
    Path(token): Path<String>,
) -> AppResult<Json<AcceptInviteResponse>> {
    Ok(Json(
        invites::accept_invite(&state.pool, &user.id, &token).await?,
    ))
}
