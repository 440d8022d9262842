//! Project and tab service.

use qadash_core::access::Action;
use qadash_core::models::project::{ProjectListItem, ProjectRow, ProjectSummary};
use qadash_core::projects::{self, queries, tabs};
use qadash_core::validation;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::{CreateProjectRequest, TabsResponse, UpdateProjectRequest};

fn with_role(project: ProjectRow, role: &str) -> ProjectListItem {
    ProjectListItem {
        project,
        my_role: role.to_string(),
    }
}

pub async fn create_project(
    pool: &PgPool,
    owner_id: &Uuid,
    body: &CreateProjectRequest,
) -> AppResult<ProjectListItem> {
    let name = validation::project_name(&body.name)?;
    let description = validation::description(body.description.as_deref())?;
    let project = queries::create_project(pool, owner_id, &name, &description).await?;
    info!(project_id = %project.id, owner_id = %owner_id, "project created");
    Ok(with_role(project, "owner"))
}

pub async fn list_projects(pool: &PgPool, user_id: &Uuid) -> AppResult<Vec<ProjectListItem>> {
    Ok(queries::list_for_user(pool, user_id).await?)
}

pub async fn get_project(
    pool: &PgPool,
    user_id: &Uuid,
    project_id: &Uuid,
) -> AppResult<ProjectListItem> {
    let rel = projects::require(pool, project_id, user_id, Action::View).await?;
    let project = queries::get_project(pool, project_id).await?;
    Ok(with_role(project, rel.as_str()))
}

/// Rename or re-describe a project. Owner only.
pub async fn update_project(
    pool: &PgPool,
    user_id: &Uuid,
    project_id: &Uuid,
    body: &UpdateProjectRequest,
) -> AppResult<ProjectListItem> {
    let rel = projects::require(pool, project_id, user_id, Action::UpdateProject).await?;
    let name = body
        .name
        .as_deref()
        .map(validation::project_name)
        .transpose()?;
    let description = body
        .description
        .as_deref()
        .map(|d| validation::description(Some(d)))
        .transpose()?;
    let project =
        queries::update_project(pool, project_id, name.as_deref(), description.as_deref()).await?;
    Ok(with_role(project, rel.as_str()))
}

/// Delete a project and everything in it. Owner only.
pub async fn delete_project(pool: &PgPool, user_id: &Uuid, project_id: &Uuid) -> AppResult<()> {
    projects::require(pool, project_id, user_id, Action::DeleteProject).await?;
    queries::delete_project(pool, project_id).await?;
    info!(project_id = %project_id, "project deleted");
    Ok(())
}

/// Look up a project by its shareable code. Any signed-in user may do this.
pub async fn find_by_invite_code(pool: &PgPool, code: &str) -> AppResult<ProjectSummary> {
    Ok(queries::find_by_invite_code(pool, code).await?)
}

// =============================================================================
// Tabs
// =============================================================================

pub async fn list_tabs(pool: &PgPool, user_id: &Uuid, project_id: &Uuid) -> AppResult<Vec<String>> {
    projects::require(pool, project_id, user_id, Action::View).await?;
    Ok(tabs::list_tabs(pool, project_id).await?)
}

pub async fn add_tab(
    pool: &PgPool,
    user_id: &Uuid,
    project_id: &Uuid,
    name: &str,
) -> AppResult<TabsResponse> {
    projects::require(pool, project_id, user_id, Action::EditTabs).await?;
    let name = validation::tab_name(name)?;
    let tabs = tabs::add_tab(pool, project_id, &name).await?;
    Ok(TabsResponse {
        message: "Tab added successfully".into(),
        tabs,
        deleted_test_cases: None,
    })
}

pub async fn rename_tab(
    pool: &PgPool,
    user_id: &Uuid,
    project_id: &Uuid,
    old_name: &str,
    new_name: &str,
) -> AppResult<TabsResponse> {
    projects::require(pool, project_id, user_id, Action::EditTabs).await?;
    let new_name = validation::tab_name(new_name)?;
    let tabs = tabs::rename_tab(pool, project_id, old_name.trim(), &new_name).await?;
    Ok(TabsResponse {
        message: "Tab renamed successfully".into(),
        tabs,
        deleted_test_cases: None,
    })
}

pub async fn delete_tab(
    pool: &PgPool,
    user_id: &Uuid,
    project_id: &Uuid,
    name: &str,
) -> AppResult<TabsResponse> {
    projects::require(pool, project_id, user_id, Action::DeleteTab).await?;
    let (tabs, removed) = tabs::delete_tab(pool, project_id, name.trim()).await?;
    Ok(TabsResponse {
        message: "Tab deleted successfully".into(),
        tabs,
        deleted_test_cases: Some(removed),
    })
}
