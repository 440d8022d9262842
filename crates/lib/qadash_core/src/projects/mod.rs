//! Projects, tabs, memberships and invites.

pub mod invites;
pub mod members;
pub mod queries;
pub mod tabs;

use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::access::{self, AccessError, Action, Relationship};
use crate::models::project::ProjectRole;
use crate::validation::ValidationError;

/// Project domain errors.
#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("{0}")]
    NotFound(&'static str),

    #[error(transparent)]
    Access(#[from] AccessError),

    #[error("{0}")]
    Forbidden(&'static str),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Db(#[from] sqlx::Error),
}

impl From<ValidationError> for ProjectError {
    fn from(e: ValidationError) -> Self {
        ProjectError::Validation(e.0)
    }
}

/// Resolve how `user_id` relates to `project_id`.
///
/// Returns `None` both when the project does not exist and when the user
/// has no relationship to it.
pub async fn relationship(
    pool: &PgPool,
    project_id: &Uuid,
    user_id: &Uuid,
) -> Result<Option<Relationship>, sqlx::Error> {
    let row = sqlx::query_as::<_, (bool, Option<ProjectRole>)>(
        r#"
        SELECT p.owner_id = $2, m.role
        FROM projects p
        LEFT JOIN project_members m ON m.project_id = p.id AND m.user_id = $2
        WHERE p.id = $1
        "#,
    )
    .bind(project_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(match row {
        Some((true, _)) => Some(Relationship::Owner),
        Some((false, Some(role))) => Some(Relationship::Member(role)),
        _ => None,
    })
}

/// Look up the caller's relationship and check it permits `action`.
pub async fn require(
    pool: &PgPool,
    project_id: &Uuid,
    user_id: &Uuid,
    action: Action,
) -> Result<Relationship, ProjectError> {
    let rel = relationship(pool, project_id, user_id).await?;
    access::authorize(rel, action)?;
    // authorize() rejects None, so this is always Some here.
    rel.ok_or(ProjectError::Access(AccessError::NotMember))
}

/// Map a unique violation to a conflict with `message`.
pub(crate) fn conflict_on_unique(message: &str) -> impl FnOnce(sqlx::Error) -> ProjectError + '_ {
    move |e| {
        if let sqlx::Error::Database(db) = &e
            && db.is_unique_violation()
        {
            return ProjectError::Conflict(message.to_string());
        }
        ProjectError::Db(e)
    }
}
