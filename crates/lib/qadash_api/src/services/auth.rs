//! Authentication service: registration, login, profile, password reset
//! and global user administration.

use qadash_core::auth::{AuthError, password, queries, reset};
use qadash_core::mail;
use qadash_core::models::auth::{User, UserRole};
use qadash_core::validation;
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::ApiConfig;
use crate::error::{AppError, AppResult};
use crate::models::{AuthResponse, MessageResponse, RegisterRequest};

pub use qadash_core::auth::jwt::{resolve_jwt_secret, verify_access_token};
pub use qadash_core::models::auth::TokenClaims;

/// Reply to every forgot-password request, whether or not the email exists.
pub const FORGOT_PASSWORD_MESSAGE: &str =
    "If an account with that email exists, a password reset link has been sent.";

fn token_response(user: User, config: &ApiConfig) -> AppResult<AuthResponse> {
    let access_token = qadash_core::auth::jwt::generate_access_token(
        &user,
        config.jwt_secret.as_bytes(),
        config.access_token_ttl_secs,
    )?;
    Ok(AuthResponse {
        access_token,
        token_type: "bearer".to_string(),
        expires_in: config.access_token_ttl_secs,
        user,
    })
}

/// Create an account and sign it in. The first account becomes a global admin.
pub async fn register(
    pool: &PgPool,
    config: &ApiConfig,
    body: &RegisterRequest,
) -> AppResult<AuthResponse> {
    let username = validation::username(&body.username)?;
    let email = validation::email(&body.email)?;
    validation::password(&body.password)?;

    match queries::find_identity_clash(pool, &email, &username).await? {
        Some("username") => return Err(AppError::Conflict("Username already taken".into())),
        Some(_) => return Err(AppError::Conflict("Email already registered".into())),
        None => {}
    }

    let hash = password::hash_password(&body.password)?;
    let user = queries::create_user(pool, &email, &username, &hash).await?;
    info!(user_id = %user.id, role = user.role.as_str(), "user registered");
    token_response(user, config)
}

/// Authenticate with email or username plus password.
pub async fn login(
    pool: &PgPool,
    config: &ApiConfig,
    identifier: &str,
    password_input: &str,
) -> AppResult<AuthResponse> {
    let record = queries::find_user_by_login(pool, identifier)
        .await?
        .ok_or(AuthError::CredentialError)?;

    if !password::verify_password(password_input, &record.password_hash)? {
        return Err(AuthError::CredentialError.into());
    }

    info!(user_id = %record.user.id, "user logged in");
    token_response(record.user, config)
}

/// Load the caller's profile.
pub async fn current_user(pool: &PgPool, user_id: &Uuid) -> AppResult<User> {
    queries::get_user_by_id(pool, user_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("User not found".into()))
}

/// Change the caller's username.
pub async fn update_profile(pool: &PgPool, user_id: &Uuid, username: &str) -> AppResult<User> {
    let username = validation::username(username)?;
    let user = queries::update_username(pool, user_id, &username).await?;
    Ok(user)
}

/// Change the caller's password after re-checking the current one.
pub async fn change_password(
    pool: &PgPool,
    user_id: &Uuid,
    current: &str,
    new: &str,
) -> AppResult<MessageResponse> {
    validation::password(new)?;
    let hash = queries::get_password_hash(pool, user_id).await?;
    if !password::verify_password(current, &hash)? {
        return Err(AppError::Validation("Current password is incorrect".into()));
    }
    let new_hash = password::hash_password(new)?;
    queries::set_password_hash(pool, user_id, &new_hash).await?;
    info!(user_id = %user_id, "password changed");
    Ok(MessageResponse::new("Password changed successfully"))
}

/// Start a password reset. Always answers with the same message, and as
/// quickly for a registered address as for an unknown one: the token and the
/// email are produced on a background task.
pub async fn forgot_password(
    pool: &PgPool,
    http: &reqwest::Client,
    config: &ApiConfig,
    email: &str,
) -> AppResult<MessageResponse> {
    let response = MessageResponse::new(FORGOT_PASSWORD_MESSAGE);

    let Ok(email) = validation::email(email) else {
        return Ok(response);
    };
    let Some(user) = queries::find_user_by_email(pool, &email).await? else {
        info!("password reset requested for unknown email");
        return Ok(response);
    };

    tokio::spawn(dispatch_reset_email(
        pool.clone(),
        http.clone(),
        config.clone(),
        user,
    ));
    Ok(response)
}

async fn dispatch_reset_email(pool: PgPool, http: reqwest::Client, config: ApiConfig, user: User) {
    let ttl = config.reset_token_ttl_secs;
    let token = match reset::issue_reset_token(&pool, &user.id, ttl).await {
        Ok((token, _expires_at)) => token,
        Err(e) => {
            warn!(user_id = %user.id, error = %e, "failed to issue password reset token");
            return;
        }
    };
    let message =
        mail::password_reset_email(&config.frontend_url, &user.email, &user.username, &token, ttl);
    match mail::send(&http, &config.mail, &message).await {
        Ok(()) => info!(user_id = %user.id, "password reset email dispatched"),
        Err(e) => warn!(user_id = %user.id, error = %e, "failed to send password reset email"),
    }
}

/// Complete a password reset with an emailed token.
pub async fn reset_password(
    pool: &PgPool,
    token: &str,
    new_password: &str,
) -> AppResult<MessageResponse> {
    validation::password(new_password)?;
    reset::reset_password(pool, token.trim(), new_password).await?;
    Ok(MessageResponse::new("Password has been reset successfully"))
}

async fn require_global_admin(pool: &PgPool, user_id: &Uuid) -> AppResult<User> {
    let caller = current_user(pool, user_id).await?;
    if caller.role != UserRole::Admin {
        return Err(AppError::Forbidden("Admin access required".into()));
    }
    Ok(caller)
}

/// List all users. Global admins only.
pub async fn list_users(pool: &PgPool, caller_id: &Uuid) -> AppResult<Vec<User>> {
    require_global_admin(pool, caller_id).await?;
    Ok(queries::list_users(pool).await?)
}

/// Change another user's role-of-record. Global admins only; an admin
/// cannot demote themselves.
pub async fn set_user_role(
    pool: &PgPool,
    caller_id: &Uuid,
    target_id: &Uuid,
    role: UserRole,
) -> AppResult<User> {
    let caller = require_global_admin(pool, caller_id).await?;
    if caller.id == *target_id && role != UserRole::Admin {
        return Err(AppError::Validation("You cannot demote yourself".into()));
    }
    let user = queries::set_user_role(pool, target_id, role).await?;
    info!(user_id = %target_id, role = role.as_str(), by = %caller_id, "user role changed");
    Ok(user)
}
