//! Test case persistence: CRUD, status changes, bulk operations,
//! templates and comments.

pub mod comments;
pub mod queries;

use thiserror::Error;

use crate::validation::ValidationError;

/// Test case domain errors.
#[derive(Debug, Error)]
pub enum TestCaseError {
    #[error("{0}")]
    NotFound(&'static str),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Db(#[from] sqlx::Error),
}

impl From<ValidationError> for TestCaseError {
    fn from(e: ValidationError) -> Self {
        TestCaseError::Validation(e.0)
    }
}

/// Escape `%`, `_` and `\` so user input matches literally inside `ILIKE`.
pub(crate) fn escape_like(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_wildcards_are_escaped() {
        assert_eq!(escape_like("100%_done"), "100\\%\\_done");
        assert_eq!(escape_like("plain"), "plain");
    }
}
