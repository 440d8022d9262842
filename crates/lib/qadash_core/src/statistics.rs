//! Dashboard statistics over the projects a user can see.

use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::projects::queries::visible_project_ids;

/// Aggregate counts for one user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub total_projects: i64,
    pub total_test_cases: i64,
    pub draft_count: i64,
    pub success_count: i64,
    pub fail_count: i64,
}

/// Count projects and test cases (by status) visible to `user_id`.
///
/// Templates are excluded from the test case counts.
pub async fn for_user(pool: &PgPool, user_id: &Uuid) -> Result<Statistics, sqlx::Error> {
    let project_ids = visible_project_ids(pool, user_id).await?;
    if project_ids.is_empty() {
        return Ok(Statistics::default());
    }

    let mut stats = sqlx::query_as::<_, Statistics>(
        r#"
        SELECT 0::bigint AS total_projects,
               COUNT(*) AS total_test_cases,
               COUNT(*) FILTER (WHERE status = 'draft') AS draft_count,
               COUNT(*) FILTER (WHERE status = 'success') AS success_count,
               COUNT(*) FILTER (WHERE status = 'fail') AS fail_count
        FROM test_cases
        WHERE project_id = ANY($1) AND NOT is_template
        "#,
    )
    .bind(&project_ids)
    .fetch_one(pool)
    .await?;
    stats.total_projects = project_ids.len() as i64;
    Ok(stats)
}
