//! Global user administration handlers.

use axum::Json;
use axum::extract::{Path, State};
use qadash_core::models::auth::User;
use uuid::Uuid;

use crate::AppState;
use crate::error::AppResult;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::UpdateUserRoleRequest;
use crate::services::auth;

/// `GET /api/users`: global admins only.
pub async fn list_users_handler(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
) -> AppResult<Json<Vec<User>>> {
    Ok(Json(auth::list_users(&state.pool, &user.id).await?))
}

/// `PUT /api/users/{id}/role`
pub async fn update_user_role_handler(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
    Path(target_id): Path<Uuid>,
    Json(body): Json<UpdateUserRoleRequest>,
) -> AppResult<Json<User>> {
    let updated = auth::set_user_role(&state.pool, &user.id, &target_id, body.role).await?;
    Ok(Json(updated))
}
