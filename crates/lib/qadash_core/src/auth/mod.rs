//! Authentication: password hashing, JWT management, password resets and
//! user queries shared with `qadash_api`.

pub mod jwt;
pub mod password;
pub mod queries;
pub mod reset;

use thiserror::Error;

use crate::validation::ValidationError;

/// Authentication errors.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    CredentialError,

    #[error("Token error: {0}")]
    TokenError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("User not found")]
    UserNotFound,

    #[error("Database error: {0}")]
    DbError(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<ValidationError> for AuthError {
    fn from(e: ValidationError) -> Self {
        AuthError::ValidationError(e.0)
    }
}
