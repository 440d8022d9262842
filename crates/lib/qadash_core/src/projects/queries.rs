//! Project CRUD queries.

use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use super::ProjectError;
use crate::models::project::{ProjectListItem, ProjectRow, ProjectSummary};
use crate::tokens::generate_invite_code;
use crate::uuid::uuidv7;

const PROJECT_COLUMNS: &str =
    "id, owner_id, name, description, invite_code, tabs, created_at, updated_at";

/// Attempts at drawing an unused invite code before giving up.
const INVITE_CODE_ATTEMPTS: usize = 5;

/// Create a project owned by `owner_id` with the default tab.
pub async fn create_project(
    pool: &PgPool,
    owner_id: &Uuid,
    name: &str,
    description: &str,
) -> Result<ProjectRow, ProjectError> {
    let id = uuidv7();
    for attempt in 1..=INVITE_CODE_ATTEMPTS {
        let result = sqlx::query_as::<_, ProjectRow>(&format!(
            "INSERT INTO projects (id, owner_id, name, description, invite_code) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {PROJECT_COLUMNS}"
        ))
        .bind(id)
        .bind(owner_id)
        .bind(name)
        .bind(description)
        .bind(generate_invite_code())
        .fetch_one(pool)
        .await;

        match result {
            Ok(row) => return Ok(row),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                debug!(attempt, "invite code collision, retrying");
            }
            Err(e) => return Err(e.into()),
        }
    }
    Err(ProjectError::Conflict(
        "Could not allocate a unique invite code".into(),
    ))
}

/// Projects the user owns or belongs to, most recently updated first,
/// each annotated with the user's role.
pub async fn list_for_user(
    pool: &PgPool,
    user_id: &Uuid,
) -> Result<Vec<ProjectListItem>, ProjectError> {
    let rows = sqlx::query_as::<_, ProjectListItem>(
        r#"
        SELECT p.id, p.owner_id, p.name, p.description, p.invite_code, p.tabs,
               p.created_at, p.updated_at,
               CASE WHEN p.owner_id = $1 THEN 'owner' ELSE m.role::text END AS my_role
        FROM projects p
        LEFT JOIN project_members m ON m.project_id = p.id AND m.user_id = $1
        WHERE p.owner_id = $1 OR m.user_id IS NOT NULL
        ORDER BY p.updated_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Fetch a project by ID.
pub async fn get_project(pool: &PgPool, id: &Uuid) -> Result<ProjectRow, ProjectError> {
    sqlx::query_as::<_, ProjectRow>(&format!(
        "SELECT {PROJECT_COLUMNS} FROM projects WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(ProjectError::NotFound("Project not found"))
}

/// Update name and/or description. `None` leaves a field unchanged.
pub async fn update_project(
    pool: &PgPool,
    id: &Uuid,
    name: Option<&str>,
    description: Option<&str>,
) -> Result<ProjectRow, ProjectError> {
    sqlx::query_as::<_, ProjectRow>(&format!(
        "UPDATE projects \
         SET name = COALESCE($2, name), \
             description = COALESCE($3, description), \
             updated_at = now() \
         WHERE id = $1 \
         RETURNING {PROJECT_COLUMNS}"
    ))
    .bind(id)
    .bind(name)
    .bind(description)
    .fetch_optional(pool)
    .await?
    .ok_or(ProjectError::NotFound("Project not found"))
}

/// Delete a project. Test cases, memberships, invites and comments go
/// with it through `ON DELETE CASCADE`.
pub async fn delete_project(pool: &PgPool, id: &Uuid) -> Result<(), ProjectError> {
    let result = sqlx::query("DELETE FROM projects WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(ProjectError::NotFound("Project not found"));
    }
    Ok(())
}

/// Find a project by its shareable invite code (case-insensitive).
pub async fn find_by_invite_code(
    pool: &PgPool,
    code: &str,
) -> Result<ProjectSummary, ProjectError> {
    sqlx::query_as::<_, ProjectSummary>(
        r#"
        SELECT p.id, p.name, p.description, u.username AS owner_username
        FROM projects p
        JOIN users u ON u.id = p.owner_id
        WHERE p.invite_code = upper($1)
        "#,
    )
    .bind(code.trim())
    .fetch_optional(pool)
    .await?
    .ok_or(ProjectError::NotFound("Invalid invite code"))
}

/// IDs of every project the user owns or belongs to.
pub async fn visible_project_ids(pool: &PgPool, user_id: &Uuid) -> Result<Vec<Uuid>, sqlx::Error> {
    sqlx::query_scalar::<_, Uuid>(
        r#"
        SELECT id FROM projects WHERE owner_id = $1
        UNION
        SELECT project_id FROM project_members WHERE user_id = $1
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}
