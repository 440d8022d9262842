//! Outbound email: password reset and project invite messages.
//!
//! Dispatches on `MailConfig::provider`:
//! - `"log"` → writes the message (and its link) to the tracing log
//! - `"http"` → POSTs JSON to a transactional email API

use std::env;

use reqwest::Client;
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::models::project::ProjectRole;

/// Errors raised while delivering mail.
#[derive(Debug, Error)]
pub enum MailError {
    #[error("Mail config error: {0}")]
    Config(String),

    #[error("Mail provider error: {0}")]
    Provider(String),

    #[error("Unsupported mail provider: {0}")]
    UnsupportedProvider(String),
}

/// Resolved mail delivery configuration.
#[derive(Debug, Clone)]
pub struct MailConfig {
    /// Provider name: `"log"` or `"http"`.
    pub provider: String,
    /// Endpoint of the HTTP email API (required for `"http"`).
    pub api_url: Option<String>,
    /// Bearer key for the HTTP email API.
    pub api_key: Option<String>,
    /// Sender address.
    pub from: String,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            provider: "log".to_string(),
            api_url: None,
            api_key: None,
            from: "noreply@qadashboard.local".to_string(),
        }
    }
}

impl MailConfig {
    /// Reads `MAIL_PROVIDER`, `MAIL_API_URL`, `MAIL_API_KEY`, `MAIL_FROM`.
    ///
    /// Falls back to the log provider when no API URL is configured.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let api_url = env::var("MAIL_API_URL").ok().filter(|v| !v.is_empty());
        let provider = env::var("MAIL_PROVIDER")
            .ok()
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| {
                if api_url.is_some() {
                    "http".to_string()
                } else {
                    defaults.provider.clone()
                }
            });
        Self {
            provider,
            api_url,
            api_key: env::var("MAIL_API_KEY").ok().filter(|v| !v.is_empty()),
            from: env::var("MAIL_FROM").unwrap_or(defaults.from),
        }
    }
}

/// A rendered email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MailMessage {
    pub to: String,
    pub subject: String,
    pub text: String,
    pub html: String,
    /// The actionable link embedded in the body.
    #[serde(skip)]
    pub link: String,
}

#[derive(Serialize)]
struct HttpMailRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    text: &'a str,
    html: &'a str,
}

/// Deliver `message` with the configured provider.
pub async fn send(
    client: &Client,
    config: &MailConfig,
    message: &MailMessage,
) -> Result<(), MailError> {
    match config.provider.as_str() {
        "log" => {
            info!(
                to = %message.to,
                subject = %message.subject,
                link = %message.link,
                "mail provider not configured; logging message instead of sending"
            );
            Ok(())
        }
        "http" => send_http(client, config, message).await,
        other => Err(MailError::UnsupportedProvider(other.to_string())),
    }
}

async fn send_http(
    client: &Client,
    config: &MailConfig,
    message: &MailMessage,
) -> Result<(), MailError> {
    let url = config
        .api_url
        .as_deref()
        .ok_or_else(|| MailError::Config("MAIL_API_URL is required for http provider".into()))?;

    let mut request = client.post(url).json(&HttpMailRequest {
        from: &config.from,
        to: [&message.to],
        subject: &message.subject,
        text: &message.text,
        html: &message.html,
    });
    if let Some(key) = &config.api_key {
        request = request.bearer_auth(key);
    }

    let resp = request
        .send()
        .await
        .map_err(|e| MailError::Provider(format!("mail request failed: {e}")))?;

    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp
            .text()
            .await
            .unwrap_or_else(|_| "<no body>".to_string());
        warn!(%status, "mail provider rejected message");
        return Err(MailError::Provider(format!(
            "mail provider returned {status}: {body}"
        )));
    }
    Ok(())
}

// =============================================================================
// Message templates
// =============================================================================

fn join_link(frontend_url: &str, route: &str, token: &str) -> String {
    format!("{}/{route}/{token}", frontend_url.trim_end_matches('/'))
}

fn describe_ttl(ttl_secs: i64) -> String {
    match ttl_secs {
        s if s >= 86_400 && s % 86_400 == 0 => plural(s / 86_400, "day"),
        s if s >= 3_600 && s % 3_600 == 0 => plural(s / 3_600, "hour"),
        s => plural((s / 60).max(1), "minute"),
    }
}

fn plural(n: i64, unit: &str) -> String {
    if n == 1 {
        format!("1 {unit}")
    } else {
        format!("{n} {unit}s")
    }
}

/// Password reset email linking to the SPA route `/reset-password/:token`.
pub fn password_reset_email(
    frontend_url: &str,
    to: &str,
    username: &str,
    token: &str,
    ttl_secs: i64,
) -> MailMessage {
    let link = join_link(frontend_url, "reset-password", token);
    let ttl = describe_ttl(ttl_secs);
    let text = format!(
        "Hi {username},\n\n\
         We received a request to reset your QA Dashboard password.\n\
         Open the link below to choose a new one:\n{link}\n\n\
         This link expires in {ttl}. If you did not ask for a reset you can ignore this email."
    );
    let html = format!(
        "<p>Hi <strong>{username}</strong>,</p>\
         <p>We received a request to reset your QA Dashboard password.</p>\
         <p><a href=\"{link}\">Reset password</a></p>\
         <p>This link expires in {ttl}. If you did not ask for a reset you can ignore this email.</p>"
    );
    MailMessage {
        to: to.to_string(),
        subject: "Reset your QA Dashboard password".to_string(),
        text,
        html,
        link,
    }
}

/// Project invite email linking to the SPA route `/accept-invite/:token`.
pub fn invite_email(
    frontend_url: &str,
    to: &str,
    project_name: &str,
    invited_by: &str,
    role: ProjectRole,
    token: &str,
    ttl_secs: i64,
) -> MailMessage {
    let link = join_link(frontend_url, "accept-invite", token);
    let ttl = describe_ttl(ttl_secs);
    let role = role.as_str().to_uppercase();
    let text = format!(
        "{invited_by} has invited you to join \"{project_name}\" on QA Dashboard as {role}.\n\n\
         Accept the invitation:\n{link}\n\n\
         This invitation expires in {ttl}. If you don't have an account yet, register first."
    );
    let html = format!(
        "<p><strong>{invited_by}</strong> has invited you to join \
         <strong>{project_name}</strong> on QA Dashboard.</p>\
         <p>Your role: <strong>{role}</strong></p>\
         <p><a href=\"{link}\">Accept invitation</a></p>\
         <p>This invitation expires in {ttl}. If you don't have an account yet, register first.</p>"
    );
    MailMessage {
        to: to.to_string(),
        subject: format!("Invitation to join {project_name} on QA Dashboard"),
        text,
        html,
        link,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn http_config(url: String) -> MailConfig {
        MailConfig {
            provider: "http".into(),
            api_url: Some(url),
            api_key: Some("key-123".into()),
            from: "qa@example.com".into(),
        }
    }

    #[test]
    fn reset_link_matches_frontend_route() {
        let msg = password_reset_email("https://qa.example.com/", "u@x.io", "u", "TOKEN", 3600);
        assert_eq!(msg.link, "https://qa.example.com/reset-password/TOKEN");
        assert!(msg.text.contains(&msg.link));
        assert!(msg.text.contains("1 hour"));
        assert_eq!(msg.to, "u@x.io");
    }

    #[test]
    fn invite_link_and_role() {
        let msg = invite_email(
            "http://localhost:3000",
            "new@x.io",
            "Checkout",
            "alice",
            ProjectRole::Editor,
            "TOK",
            7200,
        );
        assert_eq!(msg.link, "http://localhost:3000/accept-invite/TOK");
        assert!(msg.text.contains("EDITOR"));
        assert!(msg.text.contains("2 hours"));
        assert_eq!(msg.subject, "Invitation to join Checkout on QA Dashboard");
    }

    #[test]
    fn ttl_descriptions() {
        assert_eq!(describe_ttl(86_400 * 2), "2 days");
        assert_eq!(describe_ttl(3_600), "1 hour");
        assert_eq!(describe_ttl(90), "1 minute");
        assert_eq!(describe_ttl(1_800), "30 minutes");
    }

    #[tokio::test]
    async fn log_provider_always_succeeds() {
        let msg = password_reset_email("http://x", "u@x.io", "u", "T", 60);
        let result = send(&Client::new(), &MailConfig::default(), &msg).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn unknown_provider_is_rejected() {
        let config = MailConfig {
            provider: "pigeon".into(),
            ..MailConfig::default()
        };
        let msg = password_reset_email("http://x", "u@x.io", "u", "T", 60);
        let err = send(&Client::new(), &config, &msg).await.unwrap_err();
        assert!(matches!(err, MailError::UnsupportedProvider(p) if p == "pigeon"));
    }

    #[tokio::test]
    async fn http_provider_posts_json_with_bearer_key() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/send"))
            .and(header("authorization", "Bearer key-123"))
            .and(body_partial_json(serde_json::json!({
                "from": "qa@example.com",
                "to": ["u@x.io"],
                "subject": "Reset your QA Dashboard password"
            })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let msg = password_reset_email("http://x", "u@x.io", "u", "T", 60);
        send(&Client::new(), &http_config(format!("{}/send", server.uri())), &msg)
            .await
            .expect("delivered");
    }

    #[tokio::test]
    async fn http_provider_surfaces_failures() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let msg = password_reset_email("http://x", "u@x.io", "u", "T", 60);
        let err = send(&Client::new(), &http_config(server.uri()), &msg)
            .await
            .unwrap_err();
        assert!(matches!(err, MailError::Provider(m) if m.contains("500")));
    }

    #[tokio::test]
    async fn http_provider_requires_url() {
        let config = MailConfig {
            provider: "http".into(),
            ..MailConfig::default()
        };
        let msg = password_reset_email("http://x", "u@x.io", "u", "T", 60);
        let err = send(&Client::new(), &config, &msg).await.unwrap_err();
        assert!(matches!(err, MailError::Config(_)));
    }
}
