//! Password reset token lifecycle.
//!
//! A reset token is single-use and expires after a configurable window.
//! Issuing a new token invalidates every outstanding token for the user.

use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use super::{AuthError, password, queries};
use crate::tokens::{generate_token, hash_token};
use crate::uuid::uuidv7;

/// Default reset token lifetime: 1 hour.
pub const DEFAULT_RESET_TOKEN_TTL_SECS: i64 = 60 * 60;

/// Message returned when a token is unknown, already used, or expired.
pub const INVALID_RESET_TOKEN: &str = "Invalid or expired reset token";

/// Issue a new reset token for `user_id`. Returns the plaintext token and
/// its expiry.
pub async fn issue_reset_token(
    pool: &PgPool,
    user_id: &Uuid,
    ttl_secs: i64,
) -> Result<(String, DateTime<Utc>), AuthError> {
    let plaintext = generate_token();
    let expires_at = Utc::now() + Duration::seconds(ttl_secs);

    let mut tx = pool.begin().await?;

    sqlx::query(
        "UPDATE password_reset_tokens SET used_at = now() \
         WHERE user_id = $1 AND used_at IS NULL",
    )
    .bind(user_id)
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        "INSERT INTO password_reset_tokens (id, user_id, token_hash, expires_at) \
         VALUES ($1, $2, $3, $4)",
    )
    .bind(uuidv7())
    .bind(user_id)
    .bind(hash_token(&plaintext))
    .bind(expires_at)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok((plaintext, expires_at))
}

/// Consume `token` and set the user's password to `new_password`.
///
/// The caller validates password strength first. The token row is locked so
/// two concurrent resets with the same token cannot both succeed.
pub async fn reset_password(
    pool: &PgPool,
    token: &str,
    new_password: &str,
) -> Result<Uuid, AuthError> {
    let mut tx = pool.begin().await?;

    let row = sqlx::query_as::<_, (Uuid, Uuid, DateTime<Utc>, Option<DateTime<Utc>>)>(
        "SELECT id, user_id, expires_at, used_at FROM password_reset_tokens \
         WHERE token_hash = $1 \
         FOR UPDATE",
    )
    .bind(hash_token(token))
    .fetch_optional(&mut *tx)
    .await?;

    let (token_id, user_id, expires_at, used_at) =
        row.ok_or_else(|| AuthError::ValidationError(INVALID_RESET_TOKEN.into()))?;

    if used_at.is_some() {
        return Err(AuthError::ValidationError(INVALID_RESET_TOKEN.into()));
    }
    if expires_at <= Utc::now() {
        return Err(AuthError::ValidationError(
            "Reset token has expired".into(),
        ));
    }

    let hash = password::hash_password(new_password)?;
    queries::set_password_hash(&mut *tx, &user_id, &hash).await?;

    sqlx::query("UPDATE password_reset_tokens SET used_at = now() WHERE id = $1")
        .bind(token_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    info!(user_id = %user_id, "password reset completed");
    Ok(user_id)
}
