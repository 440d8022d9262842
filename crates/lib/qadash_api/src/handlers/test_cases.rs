//! Test case request handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use qadash_core::models::test_case::{CommentRow, TestCaseRow};
use uuid::Uuid;

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthenticatedUser;
use crate::models::{
    BulkDeleteRequest, BulkResponse, BulkStatusRequest, CreateCommentRequest,
    CreateTestCaseRequest, InstantiateTemplateRequest, ListTestCasesQuery, MessageResponse,
    StatusUpdateRequest, UpdateTestCaseRequest,
};
use crate::services::test_cases;

/// `GET /api/test-cases?projectId=…&tab=…&status=…&isTemplate=…&search=…`
pub async fn list_test_cases_handler(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
    Query(query): Query<ListTestCasesQuery>,
) -> AppResult<Json<Vec<TestCaseRow>>> {
    Ok(Json(
        test_cases::list_test_cases(&state.pool, &user.id, &query).await?,
    ))
}

/// `POST /api/test-cases`
pub async fn create_test_case_handler(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
    Json(body): Json<CreateTestCaseRequest>,
) -> AppResult<(StatusCode, Json<TestCaseRow>)> {
    let tc = test_cases::create_test_case(&state.pool, &user.id, &body).await?;
    Ok((StatusCode::CREATED, Json(tc)))
}

/// `GET /api/test-cases/{id}`
pub async fn get_test_case_handler(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<TestCaseRow>> {
    Ok(Json(test_cases::get_test_case(&state.pool, &user.id, &id).await?))
}

/// `PUT /api/test-cases/{id}`: partial update.
pub async fn update_test_case_handler(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateTestCaseRequest>,
) -> AppResult<Json<TestCaseRow>> {
    Ok(Json(
        test_cases::update_test_case(&state.pool, &user.id, &id, &body).await?,
    ))
}

/// `DELETE /api/test-cases/{id}`
pub async fn delete_test_case_handler(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<MessageResponse>> {
    test_cases::delete_test_case(&state.pool, &user.id, &id).await?;
    Ok(Json(MessageResponse::new("Test case deleted successfully")))
}

/// `PATCH /api/test-cases/{id}/status`
pub async fn set_status_handler(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
    Json(body): Json<StatusUpdateRequest>,
) -> AppResult<Json<TestCaseRow>> {
    Ok(Json(
        test_cases::set_status(&state.pool, &user.id, &id, &body.status).await?,
    ))
}

/// `POST /api/test-cases/bulk-status`
pub async fn bulk_status_handler(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
    Json(body): Json<BulkStatusRequest>,
) -> AppResult<Json<BulkResponse>> {
    let resp = test_cases::bulk_set_status(&state.pool, &user.id, &body.ids, &body.status).await?;
    Ok(Json(resp))
}

/// `DELETE /api/test-cases/bulk`
pub async fn bulk_delete_handler(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
    Json(body): Json<BulkDeleteRequest>,
) -> AppResult<Json<BulkResponse>> {
    Ok(Json(
        test_cases::bulk_delete(&state.pool, &user.id, &body.ids).await?,
    ))
}

/// `GET /api/test-cases/{id}/comments`
pub async fn list_comments_handler(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Vec<CommentRow>>> {
    Ok(Json(test_cases::list_comments(&state.pool, &user.id, &id).await?))
}

/// `POST /api/test-cases/{id}/comments`
pub async fn add_comment_handler(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
    Json(body): Json<CreateCommentRequest>,
) -> AppResult<(StatusCode, Json<CommentRow>)> {
    let comment = test_cases::add_comment(&state.pool, &user.id, &id, &body.body).await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

/// `POST /api/test-cases/{id}/instantiate`: new draft from a template.
pub async fn instantiate_template_handler(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
    body: Option<Json<InstantiateTemplateRequest>>,
) -> AppResult<(StatusCode, Json<TestCaseRow>)> {
    let body = body.map(|Json(b)| b).unwrap_or_default();
    let tc = test_cases::instantiate_template(&state.pool, &user.id, &id, body.tab_name.as_deref())
        .await?;
    Ok((StatusCode::CREATED, Json(tc)))
}

/// `GET /api/test-cases/export/{format}/{project_id}`: file download.
pub async fn export_handler(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
    Path((format, project_id)): Path<(String, Uuid)>,
) -> AppResult<Response> {
    let document =
        test_cases::export_project(&state.pool, &user.id, &format, &project_id).await?;
    let disposition =
        HeaderValue::from_str(&format!("attachment; filename=\"{}\"", document.filename))
            .map_err(|e| AppError::Internal(format!("invalid export filename: {e}")))?;
    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(document.content_type)),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        document.bytes,
    )
        .into_response())
}
