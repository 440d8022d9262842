//! Dashboard statistics handler.

use axum::Json;
use axum::extract::State;
use qadash_core::statistics::{self, Statistics};

use crate::AppState;
use crate::error::AppResult;
use crate::middleware::auth::AuthenticatedUser;

/// `GET /api/statistics`: counts over every project the caller can see.
pub async fn statistics_handler(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
) -> AppResult<Json<Statistics>> {
    Ok(Json(statistics::for_user(&state.pool, &user.id).await?))
}
