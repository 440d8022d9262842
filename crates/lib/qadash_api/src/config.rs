//! API server configuration.

use std::env;

use qadash_core::auth::jwt::DEFAULT_ACCESS_TOKEN_TTL_SECS;
use qadash_core::auth::reset::DEFAULT_RESET_TOKEN_TTL_SECS;
use qadash_core::mail::MailConfig;
use qadash_core::projects::invites::DEFAULT_INVITE_TTL_SECS;

use crate::services::auth::resolve_jwt_secret;

/// Configuration for the API server.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    /// Address to bind the HTTP listener (e.g. "127.0.0.1:8001").
    pub bind_addr: String,
    /// PostgreSQL connection URL.
    pub pg_connection_url: String,
    /// JWT signing secret.
    pub jwt_secret: String,
    /// Base URL of the single-page front end, used in emailed links.
    pub frontend_url: String,
    pub access_token_ttl_secs: i64,
    pub reset_token_ttl_secs: i64,
    pub invite_ttl_secs: i64,
    /// Allowed CORS origins. Empty means any origin.
    pub cors_origins: Vec<String>,
    /// Per-IP limits on auth and invite endpoints.
    pub rate_limit_enabled: bool,
    pub mail: MailConfig,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8001".into(),
            pg_connection_url: "postgres://localhost:5432/qadash".into(),
            jwt_secret: String::new(),
            frontend_url: "http://localhost:3000".into(),
            access_token_ttl_secs: DEFAULT_ACCESS_TOKEN_TTL_SECS,
            reset_token_ttl_secs: DEFAULT_RESET_TOKEN_TTL_SECS,
            invite_ttl_secs: DEFAULT_INVITE_TTL_SECS,
            cors_origins: Vec::new(),
            rate_limit_enabled: true,
            mail: MailConfig::default(),
        }
    }
}

impl ApiConfig {
    /// Reads configuration from environment variables with sensible defaults.
    ///
    /// | Variable                 | Default                               |
    /// |--------------------------|---------------------------------------|
    /// | `BIND_ADDR`              | `127.0.0.1:8001`                      |
    /// | `DATABASE_URL`           | `postgres://localhost:5432/qadash`    |
    /// | `JWT_SECRET` / `AUTH_SECRET` | generated & persisted to file     |
    /// | `FRONTEND_URL`           | `http://localhost:3000`               |
    /// | `ACCESS_TOKEN_TTL_SECS`  | `86400`                               |
    /// | `RESET_TOKEN_TTL_SECS`   | `3600`                                |
    /// | `INVITE_TTL_SECS`        | `3600`                                |
    /// | `CORS_ORIGINS`           | `*`                                   |
    /// | `RATE_LIMIT_ENABLED`     | `true`                                |
    /// | `MAIL_*`                 | see [`MailConfig::from_env`]          |
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            bind_addr: env::var("BIND_ADDR").unwrap_or(defaults.bind_addr),
            pg_connection_url: env::var("DATABASE_URL").unwrap_or(defaults.pg_connection_url),
            jwt_secret: resolve_jwt_secret(),
            frontend_url: env::var("FRONTEND_URL").unwrap_or(defaults.frontend_url),
            access_token_ttl_secs: env_secs("ACCESS_TOKEN_TTL_SECS", defaults.access_token_ttl_secs),
            reset_token_ttl_secs: env_secs("RESET_TOKEN_TTL_SECS", defaults.reset_token_ttl_secs),
            invite_ttl_secs: env_secs("INVITE_TTL_SECS", defaults.invite_ttl_secs),
            cors_origins: parse_origins(&env::var("CORS_ORIGINS").unwrap_or_default()),
            rate_limit_enabled: env::var("RATE_LIMIT_ENABLED")
                .map(|v| parse_bool(&v))
                .unwrap_or(defaults.rate_limit_enabled),
            mail: MailConfig::from_env(),
        }
    }
}

fn env_secs(key: &str, default: i64) -> i64 {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<i64>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(default)
}

fn parse_bool(value: &str) -> bool {
    !matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "0" | "false" | "no" | "off"
    )
}

/// `*` or empty means any origin; otherwise a comma-separated list.
fn parse_origins(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty() && *o != "*")
        .map(String::from)
        .collect()
}
