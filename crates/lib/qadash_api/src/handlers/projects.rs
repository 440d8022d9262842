//! Project and tab request handlers.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use qadash_core::models::project::{ProjectListItem, ProjectSummary};
use uuid::Uuid;

use crate::AppState;
use crate::error::AppResult;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::{
    AddTabRequest, CreateProjectRequest, DeleteTabRequest, MessageResponse, RenameTabRequest,
    TabsResponse, UpdateProjectRequest,
};
use crate::services::projects;

/// `GET /api/projects`: projects the caller owns or belongs to.
pub async fn list_projects_handler(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
) -> AppResult<Json<Vec<ProjectListItem>>> {
    Ok(Json(projects::list_projects(&state.pool, &user.id).await?))
}

/// `POST /api/projects`
pub async fn create_project_handler(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
    Json(body): Json<CreateProjectRequest>,
) -> AppResult<(StatusCode, Json<ProjectListItem>)> {
    let project = projects::create_project(&state.pool, &user.id, &body).await?;
    Ok((StatusCode::CREATED, Json(project)))
}

/// `GET /api/projects/{id}`
pub async fn get_project_handler(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
    Path(project_id): Path<Uuid>,
) -> AppResult<Json<ProjectListItem>> {
    Ok(Json(
        projects::get_project(&state.pool, &user.id, &project_id).await?,
    ))
}

/// `PUT /api/projects/{id}`: owner only.
pub async fn update_project_handler(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
    Path(project_id): Path<Uuid>,
    Json(body): Json<UpdateProjectRequest>,
) -> AppResult<Json<ProjectListItem>> {
    let project = projects::update_project(&state.pool, &user.id, &project_id, &body).await?;
    Ok(Json(project))
}

/// `DELETE /api/projects/{id}`: owner only; cascades to everything inside.
pub async fn delete_project_handler(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
    Path(project_id): Path<Uuid>,
) -> AppResult<Json<MessageResponse>> {
    projects::delete_project(&state.pool, &user.id, &project_id).await?;
    Ok(Json(MessageResponse::new("Project deleted successfully")))
}

/// `GET /api/projects/invite/{code}`: look up a project by its share code.
pub async fn find_by_invite_code_handler(
    State(state): State<AppState>,
    axum::Extension(_user): axum::Extension<AuthenticatedUser>,
    Path(code): Path<String>,
) -> AppResult<Json<ProjectSummary>> {
    Ok(Json(projects::find_by_invite_code(&state.pool, &code).await?))
}

/// `GET /api/projects/{id}/tabs`
pub async fn list_tabs_handler(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
    Path(project_id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    let tabs = projects::list_tabs(&state.pool, &user.id, &project_id).await?;
    Ok(Json(serde_json::json!({ "tabs": tabs })))
}

/// `POST /api/projects/{id}/tabs`
pub async fn add_tab_handler(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
    Path(project_id): Path<Uuid>,
    Json(body): Json<AddTabRequest>,
) -> AppResult<Json<TabsResponse>> {
    Ok(Json(
        projects::add_tab(&state.pool, &user.id, &project_id, &body.name).await?,
    ))
}

/// `PUT /api/projects/{id}/tabs`: rename a tab and move its test cases.
pub async fn rename_tab_handler(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
    Path(project_id): Path<Uuid>,
    Json(body): Json<RenameTabRequest>,
) -> AppResult<Json<TabsResponse>> {
    let resp = projects::rename_tab(
        &state.pool,
        &user.id,
        &project_id,
        &body.old_name,
        &body.new_name,
    )
    .await?;
    Ok(Json(resp))
}

/// `DELETE /api/projects/{id}/tabs`: delete a tab and its test cases.
pub async fn delete_tab_handler(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
    Path(project_id): Path<Uuid>,
    Json(body): Json<DeleteTabRequest>,
) -> AppResult<Json<TabsResponse>> {
    Ok(Json(
        projects::delete_tab(&state.pool, &user.id, &project_id, &body.name).await?,
    ))
}
