//! Project membership handlers.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use qadash_core::models::project::MemberRow;
use uuid::Uuid;

use crate::AppState;
use crate::error::AppResult;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::{AddMemberRequest, MembersResponse, MessageResponse, UpdateMemberRoleRequest};
use crate::services::members;

/// `GET /api/projects/{id}/members`
pub async fn list_members_handler(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
    Path(project_id): Path<Uuid>,
) -> AppResult<Json<MembersResponse>> {
    Ok(Json(
        members::list_members(&state.pool, &user.id, &project_id).await?,
    ))
}

/// `POST /api/projects/{id}/members`: add a registered user by email.
pub async fn add_member_handler(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
    Path(project_id): Path<Uuid>,
    Json(body): Json<AddMemberRequest>,
) -> AppResult<(StatusCode, Json<MemberRow>)> {
    let member = members::add_member(&state.pool, &user.id, &project_id, &body).await?;
    Ok((StatusCode::CREATED, Json(member)))
}

/// `PUT /api/projects/{id}/members/{user_id}`
pub async fn update_member_role_handler(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
    Path((project_id, target_id)): Path<(Uuid, Uuid)>,
    Json(body): Json<UpdateMemberRoleRequest>,
) -> AppResult<Json<MemberRow>> {
    let member = members::change_member_role(
        &state.pool,
        &user.id,
        &project_id,
        &target_id,
        &body.role,
    )
    .await?;
    Ok(Json(member))
}

/// `DELETE /api/projects/{id}/members/{user_id}`: remove a member or leave.
pub async fn remove_member_handler(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
    Path((project_id, target_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<MessageResponse>> {
    members::remove_member(&state.pool, &user.id, &project_id, &target_id).await?;
    Ok(Json(MessageResponse::new("Member removed successfully")))
}
