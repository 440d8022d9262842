//! Test case queries.

use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use super::{TestCaseError, escape_like};
use crate::models::test_case::{
    NewTestCase, TestCaseChanges, TestCaseFilter, TestCaseRow, TestStatus,
};
use crate::uuid::uuidv7;

const TEST_CASE_COLUMNS: &str = "id, project_id, tab_name, title, description, priority, \
     test_type, steps, expected_result, actual_result, status, assigned_to, executed_at, \
     is_template, created_by, created_at, updated_at";

/// Insert a new draft test case.
pub async fn create_test_case(
    pool: &PgPool,
    new: &NewTestCase,
    created_by: &Uuid,
) -> Result<TestCaseRow, TestCaseError> {
    let row = sqlx::query_as::<_, TestCaseRow>(&format!(
        "INSERT INTO test_cases \
             (id, project_id, tab_name, title, description, priority, test_type, \
              steps, expected_result, actual_result, assigned_to, is_template, created_by) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13) \
         RETURNING {TEST_CASE_COLUMNS}"
    ))
    .bind(uuidv7())
    .bind(new.project_id)
    .bind(&new.tab_name)
    .bind(&new.title)
    .bind(&new.description)
    .bind(new.priority)
    .bind(new.test_type)
    .bind(&new.steps)
    .bind(&new.expected_result)
    .bind(&new.actual_result)
    .bind(new.assigned_to)
    .bind(new.is_template)
    .bind(created_by)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

/// Test cases of one project matching `filter`, newest first.
pub async fn list_test_cases(
    pool: &PgPool,
    project_id: &Uuid,
    filter: &TestCaseFilter,
) -> Result<Vec<TestCaseRow>, TestCaseError> {
    let search = filter.search.as_deref().map(escape_like);
    let rows = sqlx::query_as::<_, TestCaseRow>(&format!(
        "SELECT {TEST_CASE_COLUMNS} FROM test_cases \
         WHERE project_id = $1 \
           AND ($2::text IS NULL OR tab_name = $2) \
           AND ($3::test_status IS NULL OR status = $3) \
           AND ($4::bool IS NULL OR is_template = $4) \
           AND ($5::text IS NULL OR title ILIKE '%' || $5 || '%') \
         ORDER BY created_at DESC, id DESC"
    ))
    .bind(project_id)
    .bind(filter.tab_name.as_deref())
    .bind(filter.status)
    .bind(filter.is_template)
    .bind(search)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Non-template test cases of a project in tab order, for export.
pub async fn list_for_export(
    pool: &PgPool,
    project_id: &Uuid,
) -> Result<Vec<TestCaseRow>, TestCaseError> {
    let rows = sqlx::query_as::<_, TestCaseRow>(&format!(
        "SELECT {TEST_CASE_COLUMNS} FROM test_cases \
         WHERE project_id = $1 AND NOT is_template \
         ORDER BY array_position((SELECT tabs FROM projects WHERE id = $1), tab_name), \
                  created_at, id"
    ))
    .bind(project_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Fetch a test case by ID.
pub async fn get_test_case(pool: &PgPool, id: &Uuid) -> Result<TestCaseRow, TestCaseError> {
    sqlx::query_as::<_, TestCaseRow>(&format!(
        "SELECT {TEST_CASE_COLUMNS} FROM test_cases WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(TestCaseError::NotFound("Test case not found"))
}

/// Apply a partial update.
///
/// A status change follows the same `executed_at` rule as [`set_status`].
pub async fn update_test_case(
    pool: &PgPool,
    id: &Uuid,
    changes: &TestCaseChanges,
) -> Result<TestCaseRow, TestCaseError> {
    let (assign, assignee) = match changes.assigned_to {
        Some(value) => (true, value),
        None => (false, None),
    };
    sqlx::query_as::<_, TestCaseRow>(&format!(
        "UPDATE test_cases SET \
             tab_name        = COALESCE($2, tab_name), \
             title           = COALESCE($3, title), \
             description     = COALESCE($4, description), \
             priority        = COALESCE($5, priority), \
             test_type       = COALESCE($6, test_type), \
             steps           = COALESCE($7, steps), \
             expected_result = COALESCE($8, expected_result), \
             actual_result   = COALESCE($9, actual_result), \
             executed_at     = CASE WHEN $10::test_status IS NULL THEN executed_at \
                                    WHEN $10 = 'draft' THEN NULL \
                                    ELSE now() END, \
             status          = COALESCE($10, status), \
             assigned_to     = CASE WHEN $11 THEN $12 ELSE assigned_to END, \
             is_template     = COALESCE($13, is_template), \
             updated_at      = now() \
         WHERE id = $1 \
         RETURNING {TEST_CASE_COLUMNS}"
    ))
    .bind(id)
    .bind(changes.tab_name.as_deref())
    .bind(changes.title.as_deref())
    .bind(changes.description.as_deref())
    .bind(changes.priority)
    .bind(changes.test_type)
    .bind(changes.steps.as_deref())
    .bind(changes.expected_result.as_deref())
    .bind(changes.actual_result.as_deref())
    .bind(changes.status)
    .bind(assign)
    .bind(assignee)
    .bind(changes.is_template)
    .fetch_optional(pool)
    .await?
    .ok_or(TestCaseError::NotFound("Test case not found"))
}

/// Set the status of one test case. `success` and `fail` stamp
/// `executed_at`; `draft` clears it.
pub async fn set_status(
    pool: &PgPool,
    id: &Uuid,
    status: TestStatus,
) -> Result<TestCaseRow, TestCaseError> {
    sqlx::query_as::<_, TestCaseRow>(&format!(
        "UPDATE test_cases SET \
             status = $2, \
             executed_at = CASE WHEN $3 THEN now() ELSE NULL END, \
             updated_at = now() \
         WHERE id = $1 \
         RETURNING {TEST_CASE_COLUMNS}"
    ))
    .bind(id)
    .bind(status)
    .bind(status.is_executed())
    .fetch_optional(pool)
    .await?
    .ok_or(TestCaseError::NotFound("Test case not found"))
}

/// Delete one test case.
pub async fn delete_test_case(pool: &PgPool, id: &Uuid) -> Result<(), TestCaseError> {
    let result = sqlx::query("DELETE FROM test_cases WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(TestCaseError::NotFound("Test case not found"));
    }
    Ok(())
}

/// Distinct projects owning any of `ids`. Unknown IDs contribute nothing.
pub async fn project_ids_for(pool: &PgPool, ids: &[Uuid]) -> Result<Vec<Uuid>, TestCaseError> {
    let rows = sqlx::query_scalar::<_, Uuid>(
        "SELECT DISTINCT project_id FROM test_cases WHERE id = ANY($1)",
    )
    .bind(ids)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Set `status` on every test case in `ids`. Returns the number updated.
pub async fn bulk_set_status(
    pool: &PgPool,
    ids: &[Uuid],
    status: TestStatus,
) -> Result<u64, TestCaseError> {
    let updated = sqlx::query(
        "UPDATE test_cases SET \
             status = $2, \
             executed_at = CASE WHEN $3 THEN now() ELSE NULL END, \
             updated_at = now() \
         WHERE id = ANY($1)",
    )
    .bind(ids)
    .bind(status)
    .bind(status.is_executed())
    .execute(pool)
    .await?
    .rows_affected();
    info!(updated, status = %status, "bulk status update");
    Ok(updated)
}

/// Delete every test case in `ids`. Returns the number deleted.
pub async fn bulk_delete(pool: &PgPool, ids: &[Uuid]) -> Result<u64, TestCaseError> {
    let deleted = sqlx::query("DELETE FROM test_cases WHERE id = ANY($1)")
        .bind(ids)
        .execute(pool)
        .await?
        .rows_affected();
    info!(deleted, "bulk delete");
    Ok(deleted)
}

/// Copy a template into a new draft, non-template test case.
///
/// `tab_name` overrides the template's tab when given.
pub async fn instantiate_template(
    pool: &PgPool,
    template_id: &Uuid,
    tab_name: Option<&str>,
    created_by: &Uuid,
) -> Result<TestCaseRow, TestCaseError> {
    sqlx::query_as::<_, TestCaseRow>(&format!(
        "INSERT INTO test_cases \
             (id, project_id, tab_name, title, description, priority, test_type, \
              steps, expected_result, assigned_to, created_by) \
         SELECT $1, project_id, COALESCE($3, tab_name), title, description, priority, test_type, \
                steps, expected_result, assigned_to, $4 \
         FROM test_cases WHERE id = $2 AND is_template \
         RETURNING {TEST_CASE_COLUMNS}"
    ))
    .bind(uuidv7())
    .bind(template_id)
    .bind(tab_name)
    .bind(created_by)
    .fetch_optional(pool)
    .await?
    .ok_or(TestCaseError::NotFound("Template not found"))
}
