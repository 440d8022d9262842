//! Tab management.
//!
//! A project's tabs live in `projects.tabs` (ordered). Test cases reference a
//! tab by name through `test_cases.tab_name`, so rename and delete touch both
//! tables inside one transaction.

use sqlx::{PgConnection, PgPool};
use tracing::info;
use uuid::Uuid;

use super::ProjectError;
use crate::models::project::DEFAULT_TAB;

/// Tabs of a project, in display order.
pub async fn list_tabs(pool: &PgPool, project_id: &Uuid) -> Result<Vec<String>, ProjectError> {
    sqlx::query_scalar::<_, Vec<String>>("SELECT tabs FROM projects WHERE id = $1")
        .bind(project_id)
        .fetch_optional(pool)
        .await?
        .ok_or(ProjectError::NotFound("Project not found"))
}

/// Lock the project row and return its tabs.
async fn lock_tabs(conn: &mut PgConnection, project_id: &Uuid) -> Result<Vec<String>, ProjectError> {
    sqlx::query_scalar::<_, Vec<String>>("SELECT tabs FROM projects WHERE id = $1 FOR UPDATE")
        .bind(project_id)
        .fetch_optional(conn)
        .await?
        .ok_or(ProjectError::NotFound("Project not found"))
}

async fn store_tabs(
    conn: &mut PgConnection,
    project_id: &Uuid,
    tabs: &[String],
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE projects SET tabs = $2, updated_at = now() WHERE id = $1")
        .bind(project_id)
        .bind(tabs)
        .execute(conn)
        .await?;
    Ok(())
}

/// Append a tab. `name` must already be validated.
pub async fn add_tab(
    pool: &PgPool,
    project_id: &Uuid,
    name: &str,
) -> Result<Vec<String>, ProjectError> {
    let mut tx = pool.begin().await?;
    let mut tabs = lock_tabs(&mut tx, project_id).await?;
    if tabs.iter().any(|t| t == name) {
        return Err(ProjectError::Validation("Tab already exists".into()));
    }
    tabs.push(name.to_string());
    store_tabs(&mut tx, project_id, &tabs).await?;
    tx.commit().await?;
    Ok(tabs)
}

/// Rename a tab and move every test case filed under it.
pub async fn rename_tab(
    pool: &PgPool,
    project_id: &Uuid,
    old_name: &str,
    new_name: &str,
) -> Result<Vec<String>, ProjectError> {
    let mut tx = pool.begin().await?;
    let mut tabs = lock_tabs(&mut tx, project_id).await?;

    let Some(pos) = tabs.iter().position(|t| t == old_name) else {
        return Err(ProjectError::NotFound("Tab not found"));
    };
    if old_name == new_name {
        return Ok(tabs);
    }
    if tabs.iter().any(|t| t == new_name) {
        return Err(ProjectError::Validation(
            "A tab with this name already exists".into(),
        ));
    }
    tabs[pos] = new_name.to_string();
    store_tabs(&mut tx, project_id, &tabs).await?;

    let moved = sqlx::query(
        "UPDATE test_cases SET tab_name = $3, updated_at = now() \
         WHERE project_id = $1 AND tab_name = $2",
    )
    .bind(project_id)
    .bind(old_name)
    .bind(new_name)
    .execute(&mut *tx)
    .await?
    .rows_affected();

    tx.commit().await?;
    info!(project_id = %project_id, old_name, new_name, moved, "tab renamed");
    Ok(tabs)
}

/// Delete a tab together with its test cases. The default tab is permanent.
/// Returns the remaining tabs and the number of test cases removed.
pub async fn delete_tab(
    pool: &PgPool,
    project_id: &Uuid,
    name: &str,
) -> Result<(Vec<String>, u64), ProjectError> {
    if name == DEFAULT_TAB {
        return Err(ProjectError::Validation(format!(
            "Cannot delete {DEFAULT_TAB} tab"
        )));
    }

    let mut tx = pool.begin().await?;
    let mut tabs = lock_tabs(&mut tx, project_id).await?;
    let before = tabs.len();
    tabs.retain(|t| t != name);
    if tabs.len() == before {
        return Err(ProjectError::NotFound("Tab not found"));
    }
    store_tabs(&mut tx, project_id, &tabs).await?;

    let removed = sqlx::query("DELETE FROM test_cases WHERE project_id = $1 AND tab_name = $2")
        .bind(project_id)
        .bind(name)
        .execute(&mut *tx)
        .await?
        .rows_affected();

    tx.commit().await?;
    info!(project_id = %project_id, tab = name, removed, "tab deleted");
    Ok((tabs, removed))
}
