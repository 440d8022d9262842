//! Project membership queries.

use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use super::{ProjectError, conflict_on_unique};
use crate::models::project::{MemberRow, ProjectRole, ProjectRow};

/// Members of a project (the owner is not a member), oldest first.
pub async fn list_members(pool: &PgPool, project_id: &Uuid) -> Result<Vec<MemberRow>, ProjectError> {
    let rows = sqlx::query_as::<_, MemberRow>(
        r#"
        SELECT m.user_id, u.username, u.email, m.role, m.added_at
        FROM project_members m
        JOIN users u ON u.id = m.user_id
        WHERE m.project_id = $1
        ORDER BY m.added_at ASC
        "#,
    )
    .bind(project_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

async fn get_member(
    pool: &PgPool,
    project_id: &Uuid,
    user_id: &Uuid,
) -> Result<MemberRow, ProjectError> {
    sqlx::query_as::<_, MemberRow>(
        r#"
        SELECT m.user_id, u.username, u.email, m.role, m.added_at
        FROM project_members m
        JOIN users u ON u.id = m.user_id
        WHERE m.project_id = $1 AND m.user_id = $2
        "#,
    )
    .bind(project_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?
    .ok_or(ProjectError::NotFound("Member not found"))
}

/// Add an existing user (by email) to a project with `role`.
pub async fn add_member(
    pool: &PgPool,
    project: &ProjectRow,
    email: &str,
    role: ProjectRole,
) -> Result<MemberRow, ProjectError> {
    let user_id = sqlx::query_scalar::<_, Uuid>("SELECT id FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(pool)
        .await?
        .ok_or(ProjectError::NotFound("User not found"))?;

    if user_id == project.owner_id {
        return Err(ProjectError::Validation(
            "The project owner cannot be added as a member".into(),
        ));
    }

    sqlx::query("INSERT INTO project_members (project_id, user_id, role) VALUES ($1, $2, $3)")
        .bind(project.id)
        .bind(user_id)
        .bind(role)
        .execute(pool)
        .await
        .map_err(conflict_on_unique("User is already a member of this project"))?;

    info!(project_id = %project.id, user_id = %user_id, role = %role, "member added");
    get_member(pool, &project.id, &user_id).await
}

/// Change a member's role.
pub async fn update_member_role(
    pool: &PgPool,
    project_id: &Uuid,
    user_id: &Uuid,
    role: ProjectRole,
) -> Result<MemberRow, ProjectError> {
    let result =
        sqlx::query("UPDATE project_members SET role = $3 WHERE project_id = $1 AND user_id = $2")
            .bind(project_id)
            .bind(user_id)
            .bind(role)
            .execute(pool)
            .await?;
    if result.rows_affected() == 0 {
        return Err(ProjectError::NotFound("Member not found"));
    }
    get_member(pool, project_id, user_id).await
}

/// Remove a member from a project.
pub async fn remove_member(
    pool: &PgPool,
    project_id: &Uuid,
    user_id: &Uuid,
) -> Result<(), ProjectError> {
    let result = sqlx::query("DELETE FROM project_members WHERE project_id = $1 AND user_id = $2")
        .bind(project_id)
        .bind(user_id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(ProjectError::NotFound("Member not found"));
    }
    info!(project_id = %project_id, user_id = %user_id, "member removed");
    Ok(())
}
