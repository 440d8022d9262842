//! JWT token generation and verification.

use std::path::{Path, PathBuf};

use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use tracing::{info, warn};

use super::AuthError;
use crate::models::auth::{TokenClaims, User};
use crate::tokens::random_alphanumeric;

/// Default access token lifetime: 24 hours.
pub const DEFAULT_ACCESS_TOKEN_TTL_SECS: i64 = 24 * 60 * 60;

/// Generate a signed JWT access token (HS256) for `user`.
pub fn generate_access_token(
    user: &User,
    secret: &[u8],
    ttl_secs: i64,
) -> Result<String, AuthError> {
    let now = Utc::now();
    let claims = TokenClaims {
        sub: user.id.to_string(),
        email: user.email.clone(),
        role: user.role,
        exp: (now + Duration::seconds(ttl_secs)).timestamp(),
        iat: now.timestamp(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret),
    )
    .map_err(|e| AuthError::TokenError(format!("jwt encode: {e}")))
}

/// Verify a JWT access token, returning the claims on success.
pub fn verify_access_token(token: &str, secret: &[u8]) -> Option<TokenClaims> {
    let key = DecodingKey::from_secret(secret);
    let mut validation = Validation::default();
    validation.validate_exp = true;
    decode::<TokenClaims>(token, &key, &validation)
        .ok()
        .map(|data| data.claims)
}

/// Resolve the JWT secret: env var `JWT_SECRET` → `AUTH_SECRET` → persisted file.
pub fn resolve_jwt_secret() -> String {
    if let Ok(secret) = std::env::var("JWT_SECRET")
        && !secret.is_empty()
    {
        return secret;
    }
    if let Ok(secret) = std::env::var("AUTH_SECRET")
        && !secret.is_empty()
    {
        return secret;
    }
    load_or_create_secret(&jwt_secret_path())
}

/// Read the secret stored at `path`, or generate one and try to store it.
///
/// A secret that cannot be stored is still returned, but it only lives for
/// this process: tokens it signs stop verifying after a restart.
fn load_or_create_secret(path: &Path) -> String {
    if let Ok(existing) = std::fs::read_to_string(path) {
        let trimmed = existing.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }
    let secret = random_alphanumeric(64);
    match persist_secret(path, &secret) {
        Ok(()) => info!(path = %path.display(), "generated new JWT secret"),
        Err(e) => warn!(
            path = %path.display(),
            error = %e,
            "could not persist generated JWT secret; sessions will not survive a restart"
        ),
    }
    secret
}

fn persist_secret(path: &Path, secret: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, secret)
}

/// Path to the persisted JWT secret file.
fn jwt_secret_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("qadash")
        .join("jwt-secret")
}
