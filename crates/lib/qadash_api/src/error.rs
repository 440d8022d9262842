//! Application error types.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

use crate::models::ErrorResponse;
use qadash_core::access::AccessError;
use qadash_core::auth::AuthError;
use qadash_core::export::ExportError;
use qadash_core::models::ParseEnumError;
use qadash_core::projects::ProjectError;
use qadash_core::test_cases::TestCaseError;
use qadash_core::validation::ValidationError;

/// Convenience alias for handler return types.
pub type AppResult<T> = Result<T, AppError>;

/// Application-level errors with HTTP status mapping.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Internal server error")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (error, message) = match &self {
            AppError::Validation(m) => ("validation_error", m.as_str()),
            AppError::NotFound(m) => ("not_found", m.as_str()),
            AppError::Unauthorized(m) => ("unauthorized", m.as_str()),
            AppError::Forbidden(m) => ("forbidden", m.as_str()),
            AppError::Conflict(m) => ("conflict", m.as_str()),
            AppError::RateLimited(m) => ("rate_limited", m.as_str()),
            AppError::Internal(detail) => {
                error!(detail = %detail, "internal error");
                ("internal_error", "Internal server error")
            }
        };
        let body = Json(ErrorResponse {
            error: error.to_string(),
            message: message.to_string(),
        });
        (self.status(), body).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::RowNotFound => AppError::NotFound("Resource not found".into()),
            _ => AppError::Internal(e.to_string()),
        }
    }
}

impl From<ValidationError> for AppError {
    fn from(e: ValidationError) -> Self {
        AppError::Validation(e.0)
    }
}

impl From<ParseEnumError> for AppError {
    fn from(e: ParseEnumError) -> Self {
        AppError::Validation(e.to_string())
    }
}

impl From<AccessError> for AppError {
    fn from(e: AccessError) -> Self {
        match e {
            AccessError::NotMember => AppError::NotFound(e.to_string()),
            _ => AppError::Forbidden(e.to_string()),
        }
    }
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::CredentialError => AppError::Unauthorized("Invalid credentials".into()),
            AuthError::TokenError(msg) => AppError::Unauthorized(msg),
            AuthError::ValidationError(msg) => AppError::Validation(msg),
            AuthError::Conflict(msg) => AppError::Conflict(msg),
            AuthError::UserNotFound => AppError::NotFound("User not found".into()),
            AuthError::DbError(e) => AppError::from(e),
            AuthError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

impl From<ProjectError> for AppError {
    fn from(e: ProjectError) -> Self {
        match e {
            ProjectError::NotFound(msg) => AppError::NotFound(msg.into()),
            ProjectError::Access(e) => AppError::from(e),
            ProjectError::Forbidden(msg) => AppError::Forbidden(msg.into()),
            ProjectError::Validation(msg) => AppError::Validation(msg),
            ProjectError::Conflict(msg) => AppError::Conflict(msg),
            ProjectError::Db(e) => AppError::from(e),
        }
    }
}

impl From<TestCaseError> for AppError {
    fn from(e: TestCaseError) -> Self {
        match e {
            TestCaseError::NotFound(msg) => AppError::NotFound(msg.into()),
            TestCaseError::Validation(msg) => AppError::Validation(msg),
            TestCaseError::Db(e) => AppError::from(e),
        }
    }
}

impl From<ExportError> for AppError {
    fn from(e: ExportError) -> Self {
        match e {
            ExportError::UnsupportedFormat(_) => AppError::Validation(e.to_string()),
            _ => AppError::Internal(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qadash_core::models::project::ProjectRole;

    async fn body_json(resp: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn status_codes() {
        assert_eq!(AppError::Validation("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::Conflict("x".into()).status(), StatusCode::CONFLICT);
        assert_eq!(
            AppError::RateLimited("x".into()).status(),
            StatusCode::TOO_MANY_REQUESTS
        );
    }

    #[test]
    fn non_members_see_not_found() {
        let err = AppError::from(ProjectError::Access(AccessError::NotMember));
        assert!(matches!(err, AppError::NotFound(m) if m == "Project not found"));
    }

    #[test]
    fn insufficient_role_is_forbidden() {
        let err = AppError::from(AccessError::InsufficientRole {
            role: ProjectRole::Viewer,
            action: "modify test cases",
        });
        assert_eq!(err.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn row_not_found_is_404() {
        assert_eq!(
            AppError::from(sqlx::Error::RowNotFound).status(),
            StatusCode::NOT_FOUND
        );
    }

    #[tokio::test]
    async fn body_shape() {
        let resp = AppError::Conflict("Email already registered".into()).into_response();
        assert_eq!(resp.status(), StatusCode::CONFLICT);
        let json = body_json(resp).await;
        assert_eq!(json["error"], "conflict");
        assert_eq!(json["message"], "Email already registered");
    }

    #[tokio::test]
    async fn internal_details_are_hidden() {
        let resp = AppError::Internal("pool exhausted".into()).into_response();
        let json = body_json(resp).await;
        assert_eq!(json["error"], "internal_error");
        assert_eq!(json["message"], "Internal server error");
    }
}
