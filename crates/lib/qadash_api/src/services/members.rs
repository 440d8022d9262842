//! Membership service.

use qadash_core::access::Action;
use qadash_core::auth::queries::get_user_by_id;
use qadash_core::models::project::{MemberRow, ProjectRole};
use qadash_core::projects::{self, members, queries};
use qadash_core::validation;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{AddMemberRequest, MembersResponse, OwnerSummary};

/// The owner plus every member. Visible to anyone in the project.
pub async fn list_members(
    pool: &PgPool,
    user_id: &Uuid,
    project_id: &Uuid,
) -> AppResult<MembersResponse> {
    projects::require(pool, project_id, user_id, Action::View).await?;
    let project = queries::get_project(pool, project_id).await?;
    let owner = get_user_by_id(pool, &project.owner_id)
        .await?
        .ok_or_else(|| AppError::Internal(format!("owner of {project_id} missing")))?;
    let members = members::list_members(pool, project_id).await?;
    Ok(MembersResponse {
        owner: OwnerSummary {
            user_id: owner.id,
            username: owner.username,
            email: owner.email,
        },
        members,
    })
}

/// Add an existing user directly. Owner or project admin only.
pub async fn add_member(
    pool: &PgPool,
    user_id: &Uuid,
    project_id: &Uuid,
    body: &AddMemberRequest,
) -> AppResult<MemberRow> {
    projects::require(pool, project_id, user_id, Action::ManageInvites).await?;
    let role: ProjectRole = body.role.parse()?;
    let email = validation::email(&body.email)?;
    let project = queries::get_project(pool, project_id).await?;
    Ok(members::add_member(pool, &project, &email, role).await?)
}

/// Change a member's role. Nobody may raise their own role.
pub async fn change_member_role(
    pool: &PgPool,
    user_id: &Uuid,
    project_id: &Uuid,
    target_id: &Uuid,
    role: &str,
) -> AppResult<MemberRow> {
    let new_role: ProjectRole = role.parse()?;
    let action = Action::ChangeMemberRole {
        target_is_self: user_id == target_id,
        new_role,
    };
    projects::require(pool, project_id, user_id, action).await?;
    let member = members::update_member_role(pool, project_id, target_id, new_role).await?;
    info!(
        project_id = %project_id,
        user_id = %target_id,
        role = %new_role,
        by = %user_id,
        "member role changed"
    );
    Ok(member)
}

/// Remove a member, or leave the project when `target_id` is the caller.
pub async fn remove_member(
    pool: &PgPool,
    user_id: &Uuid,
    project_id: &Uuid,
    target_id: &Uuid,
) -> AppResult<()> {
    let action = Action::RemoveMember {
        target_is_self: user_id == target_id,
    };
    projects::require(pool, project_id, user_id, action).await?;
    members::remove_member(pool, project_id, target_id).await?;
    Ok(())
}
