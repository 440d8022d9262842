//! Test case service: CRUD, status, bulk operations, comments, templates
//! and export.

use qadash_core::access::{AccessError, Action};
use qadash_core::export::{self, ExportFormat, ExportedDocument};
use qadash_core::models::project::{DEFAULT_TAB, ProjectRow};
use qadash_core::models::test_case::{
    CommentRow, NewTestCase, Priority, TestCaseChanges, TestCaseFilter, TestCaseRow, TestStatus,
    TestType,
};
use qadash_core::projects::{self, ProjectError};
use qadash_core::test_cases::{comments, queries};
use qadash_core::validation;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{
    BulkResponse, CreateTestCaseRequest, ListTestCasesQuery, UpdateTestCaseRequest,
};

/// Load a test case and check the caller may perform `action` on it.
/// Strangers get "Test case not found" rather than learning the project.
async fn load_authorized(
    pool: &PgPool,
    user_id: &Uuid,
    id: &Uuid,
    action: Action,
) -> AppResult<TestCaseRow> {
    let tc = queries::get_test_case(pool, id).await?;
    match projects::require(pool, &tc.project_id, user_id, action).await {
        Ok(_) => Ok(tc),
        Err(ProjectError::Access(AccessError::NotMember)) => {
            Err(AppError::NotFound("Test case not found".into()))
        }
        Err(e) => Err(e.into()),
    }
}

fn ensure_tab(project: &ProjectRow, tab: &str) -> AppResult<()> {
    if project.tabs.iter().any(|t| t == tab) {
        Ok(())
    } else {
        Err(AppError::Validation(format!(
            "Tab '{tab}' does not exist in this project"
        )))
    }
}

async fn ensure_assignable(pool: &PgPool, project_id: &Uuid, assignee: &Uuid) -> AppResult<()> {
    if projects::relationship(pool, project_id, assignee)
        .await?
        .is_none()
    {
        return Err(AppError::Validation(
            "Assignee must be a member of the project".into(),
        ));
    }
    Ok(())
}

pub async fn create_test_case(
    pool: &PgPool,
    user_id: &Uuid,
    body: &CreateTestCaseRequest,
) -> AppResult<TestCaseRow> {
    projects::require(pool, &body.project_id, user_id, Action::WriteTestCases).await?;
    let project = projects::queries::get_project(pool, &body.project_id).await?;

    let tab_name = body
        .tab_name
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or(DEFAULT_TAB)
        .to_string();
    ensure_tab(&project, &tab_name)?;

    let new = NewTestCase {
        project_id: project.id,
        tab_name,
        title: validation::title(&body.title)?,
        description: validation::description(body.description.as_deref())?,
        priority: match &body.priority {
            Some(p) => p.parse()?,
            None => Priority::Medium,
        },
        test_type: match &body.test_type {
            Some(t) => t.parse()?,
            None => TestType::Functional,
        },
        steps: validation::steps(&body.steps)?,
        expected_result: validation::expected_result(&body.expected_result)?,
        actual_result: validation::actual_result(body.actual_result.as_deref())?,
        assigned_to: body.assigned_to,
        is_template: body.is_template,
    };
    if let Some(assignee) = &new.assigned_to {
        ensure_assignable(pool, &project.id, assignee).await?;
    }

    let tc = queries::create_test_case(pool, &new, user_id).await?;
    info!(test_case_id = %tc.id, project_id = %tc.project_id, "test case created");
    Ok(tc)
}

pub async fn list_test_cases(
    pool: &PgPool,
    user_id: &Uuid,
    query: &ListTestCasesQuery,
) -> AppResult<Vec<TestCaseRow>> {
    projects::require(pool, &query.project_id, user_id, Action::View).await?;
    let filter = TestCaseFilter {
        tab_name: query
            .tab
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(String::from),
        status: query
            .status
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .map(str::parse::<TestStatus>)
            .transpose()?,
        is_template: query.is_template,
        search: query.search.as_deref().and_then(validation::search_query),
    };
    Ok(queries::list_test_cases(pool, &query.project_id, &filter).await?)
}

pub async fn get_test_case(pool: &PgPool, user_id: &Uuid, id: &Uuid) -> AppResult<TestCaseRow> {
    load_authorized(pool, user_id, id, Action::View).await
}

pub async fn update_test_case(
    pool: &PgPool,
    user_id: &Uuid,
    id: &Uuid,
    body: &UpdateTestCaseRequest,
) -> AppResult<TestCaseRow> {
    let current = load_authorized(pool, user_id, id, Action::WriteTestCases).await?;

    let tab_name = match body.tab_name.as_deref().map(str::trim) {
        Some(tab) if tab != current.tab_name => {
            let project = projects::queries::get_project(pool, &current.project_id).await?;
            ensure_tab(&project, tab)?;
            Some(tab.to_string())
        }
        _ => None,
    };
    if let Some(Some(assignee)) = &body.assigned_to {
        ensure_assignable(pool, &current.project_id, assignee).await?;
    }

    let changes = TestCaseChanges {
        tab_name,
        title: body.title.as_deref().map(validation::title).transpose()?,
        description: body
            .description
            .as_deref()
            .map(|d| validation::description(Some(d)))
            .transpose()?,
        priority: body
            .priority
            .as_deref()
            .map(str::parse::<Priority>)
            .transpose()?,
        test_type: body
            .test_type
            .as_deref()
            .map(str::parse::<TestType>)
            .transpose()?,
        steps: body.steps.as_deref().map(validation::steps).transpose()?,
        expected_result: body
            .expected_result
            .as_deref()
            .map(validation::expected_result)
            .transpose()?,
        actual_result: body
            .actual_result
            .as_deref()
            .map(|a| validation::actual_result(Some(a)))
            .transpose()?,
        status: body
            .status
            .as_deref()
            .map(str::parse::<TestStatus>)
            .transpose()?,
        assigned_to: body.assigned_to,
        is_template: body.is_template,
    };
    Ok(queries::update_test_case(pool, id, &changes).await?)
}

pub async fn set_status(
    pool: &PgPool,
    user_id: &Uuid,
    id: &Uuid,
    status: &str,
) -> AppResult<TestCaseRow> {
    let status: TestStatus = status.parse()?;
    load_authorized(pool, user_id, id, Action::WriteTestCases).await?;
    Ok(queries::set_status(pool, id, status).await?)
}

pub async fn delete_test_case(pool: &PgPool, user_id: &Uuid, id: &Uuid) -> AppResult<()> {
    load_authorized(pool, user_id, id, Action::WriteTestCases).await?;
    queries::delete_test_case(pool, id).await?;
    info!(test_case_id = %id, "test case deleted");
    Ok(())
}

/// Check write access to every project owning any of `ids`.
async fn authorize_bulk(pool: &PgPool, user_id: &Uuid, ids: &[Uuid]) -> AppResult<()> {
    if ids.is_empty() {
        return Err(AppError::Validation("No test cases selected".into()));
    }
    for project_id in queries::project_ids_for(pool, ids).await? {
        projects::require(pool, &project_id, user_id, Action::WriteTestCases).await?;
    }
    Ok(())
}

/// Set one status on many test cases. Unknown IDs are ignored.
pub async fn bulk_set_status(
    pool: &PgPool,
    user_id: &Uuid,
    ids: &[Uuid],
    status: &str,
) -> AppResult<BulkResponse> {
    let status: TestStatus = status.parse()?;
    authorize_bulk(pool, user_id, ids).await?;
    let count = queries::bulk_set_status(pool, ids, status).await?;
    Ok(BulkResponse {
        message: format!("Updated {count} test cases"),
        count,
    })
}

/// Delete many test cases. Unknown IDs are ignored.
pub async fn bulk_delete(pool: &PgPool, user_id: &Uuid, ids: &[Uuid]) -> AppResult<BulkResponse> {
    authorize_bulk(pool, user_id, ids).await?;
    let count = queries::bulk_delete(pool, ids).await?;
    Ok(BulkResponse {
        message: format!("Deleted {count} test cases"),
        count,
    })
}

pub async fn list_comments(pool: &PgPool, user_id: &Uuid, id: &Uuid) -> AppResult<Vec<CommentRow>> {
    load_authorized(pool, user_id, id, Action::View).await?;
    Ok(comments::list_comments(pool, id).await?)
}

/// Comment on a test case. Viewers are read-only and cannot comment.
pub async fn add_comment(
    pool: &PgPool,
    user_id: &Uuid,
    id: &Uuid,
    body: &str,
) -> AppResult<CommentRow> {
    load_authorized(pool, user_id, id, Action::WriteTestCases).await?;
    let body = validation::comment(body)?;
    Ok(comments::add_comment(pool, id, user_id, &body).await?)
}

/// Copy a template into a new draft test case.
pub async fn instantiate_template(
    pool: &PgPool,
    user_id: &Uuid,
    id: &Uuid,
    tab_name: Option<&str>,
) -> AppResult<TestCaseRow> {
    let template = load_authorized(pool, user_id, id, Action::WriteTestCases).await?;
    if !template.is_template {
        return Err(AppError::Validation("Test case is not a template".into()));
    }
    let tab_name = tab_name.map(str::trim).filter(|t| !t.is_empty());
    if let Some(tab) = tab_name {
        let project = projects::queries::get_project(pool, &template.project_id).await?;
        ensure_tab(&project, tab)?;
    }
    let tc = queries::instantiate_template(pool, id, tab_name, user_id).await?;
    info!(template_id = %id, test_case_id = %tc.id, "template instantiated");
    Ok(tc)
}

/// Render every non-template test case of a project.
pub async fn export_project(
    pool: &PgPool,
    user_id: &Uuid,
    format: &str,
    project_id: &Uuid,
) -> AppResult<ExportedDocument> {
    let format: ExportFormat = format.parse()?;
    projects::require(pool, project_id, user_id, Action::View).await?;
    let project = projects::queries::get_project(pool, project_id).await?;
    let cases = queries::list_for_export(pool, project_id).await?;
    let document = export::render(format, &project.name, &cases)?;
    info!(
        project_id = %project_id,
        format = %format,
        rows = cases.len(),
        "project exported"
    );
    Ok(document)
}
