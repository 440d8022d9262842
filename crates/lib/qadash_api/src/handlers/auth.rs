//! Authentication and profile request handlers.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use qadash_core::models::auth::User;

use crate::AppState;
use crate::error::AppResult;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::{
    AuthResponse, ChangePasswordRequest, ForgotPasswordRequest, LoginRequest, MessageResponse,
    RegisterRequest, ResetPasswordRequest, UpdateProfileRequest,
};
use crate::services::auth;

/// `POST /api/auth/register`: create an account and return a token.
pub async fn register_handler(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    let resp = auth::register(&state.pool, &state.config, &body).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

/// `POST /api/auth/login`: authenticate with email or username.
pub async fn login_handler(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let resp = auth::login(&state.pool, &state.config, &body.identifier, &body.password).await?;
    Ok(Json(resp))
}

/// `POST /api/auth/forgot-password`: always 200, whether or not the email exists.
pub async fn forgot_password_handler(
    State(state): State<AppState>,
    Json(body): Json<ForgotPasswordRequest>,
) -> AppResult<Json<MessageResponse>> {
    let resp = auth::forgot_password(&state.pool, &state.http, &state.config, &body.email).await?;
    Ok(Json(resp))
}

/// `POST /api/auth/reset-password`: consume a reset token.
pub async fn reset_password_handler(
    State(state): State<AppState>,
    Json(body): Json<ResetPasswordRequest>,
) -> AppResult<Json<MessageResponse>> {
    let resp = auth::reset_password(&state.pool, &body.token, &body.new_password).await?;
    Ok(Json(resp))
}

/// `GET /api/auth/me`
pub async fn me_handler(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
) -> AppResult<Json<User>> {
    Ok(Json(auth::current_user(&state.pool, &user.id).await?))
}

/// `PUT /api/auth/me`: change username.
pub async fn update_me_handler(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
    Json(body): Json<UpdateProfileRequest>,
) -> AppResult<Json<User>> {
    Ok(Json(
        auth::update_profile(&state.pool, &user.id, &body.username).await?,
    ))
}

/// `POST /api/auth/change-password`
pub async fn change_password_handler(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
    Json(body): Json<ChangePasswordRequest>,
) -> AppResult<Json<MessageResponse>> {
    let resp = auth::change_password(
        &state.pool,
        &user.id,
        &body.current_password,
        &body.new_password,
    )
    .await?;
    Ok(Json(resp))
}
