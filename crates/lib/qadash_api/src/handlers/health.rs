//! Liveness endpoint.

use axum::Json;
use axum::extract::State;
use tracing::warn;

use crate::AppState;
use crate::error::AppResult;
use crate::models::HealthResponse;

/// `GET /health`: reports whether PostgreSQL answers.
pub async fn health_handler(State(state): State<AppState>) -> AppResult<Json<HealthResponse>> {
    let database = match sqlx::query("SELECT 1").execute(&state.pool).await {
        Ok(_) => true,
        Err(e) => {
            warn!("Database health check failed: {e}");
            false
        }
    };

    Ok(Json(HealthResponse {
        status: if database { "ok" } else { "degraded" }.to_string(),
        database,
        version: qadash_core::version().to_string(),
    }))
}
