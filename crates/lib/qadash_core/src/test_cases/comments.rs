//! Test case comments.

use sqlx::PgPool;
use uuid::Uuid;

use super::TestCaseError;
use crate::models::test_case::CommentRow;
use crate::uuid::uuidv7;

/// Comments on a test case, oldest first.
pub async fn list_comments(
    pool: &PgPool,
    test_case_id: &Uuid,
) -> Result<Vec<CommentRow>, TestCaseError> {
    let rows = sqlx::query_as::<_, CommentRow>(
        r#"
        SELECT c.id, c.test_case_id, c.author_id, u.username AS author_username,
               c.body, c.created_at
        FROM test_case_comments c
        LEFT JOIN users u ON u.id = c.author_id
        WHERE c.test_case_id = $1
        ORDER BY c.created_at ASC, c.id ASC
        "#,
    )
    .bind(test_case_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Append a comment. `body` must already be validated.
pub async fn add_comment(
    pool: &PgPool,
    test_case_id: &Uuid,
    author_id: &Uuid,
    body: &str,
) -> Result<CommentRow, TestCaseError> {
    let row = sqlx::query_as::<_, CommentRow>(
        r#"
        WITH c AS (
            INSERT INTO test_case_comments (id, test_case_id, author_id, body)
            VALUES ($1, $2, $3, $4)
            RETURNING id, test_case_id, author_id, body, created_at
        )
        SELECT c.id, c.test_case_id, c.author_id, u.username AS author_username,
               c.body, c.created_at
        FROM c
        LEFT JOIN users u ON u.id = c.author_id
        "#,
    )
    .bind(uuidv7())
    .bind(test_case_id)
    .bind(author_id)
    .bind(body)
    .fetch_one(pool)
    .await?;
    Ok(row)
}
