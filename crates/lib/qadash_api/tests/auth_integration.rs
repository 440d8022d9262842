//! Registration, login and password reset through the router.

mod common;

use std::time::{Duration, Instant};

use axum::http::{Method, StatusCode};
use qadash_api::services::auth::FORGOT_PASSWORD_MESSAGE;
use qadash_core::auth::reset::issue_reset_token;
use qadash_core::mail::MailConfig;
use serde_json::json;
use sqlx::PgPool;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

#[sqlx::test(migrator = "qadash_core::migrate::MIGRATOR")]
async fn duplicate_email_is_rejected(pool: PgPool) {
    let app = common::TestApp::new(pool);
    let user = app.register("dup").await;

    let (status, json) = app
        .call(
            Method::POST,
            "/api/auth/register",
            None,
            Some(json!({
                "username": common::unique("other"),
                "email": user.email,
                "password": "secret123",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["error"], "conflict");
    assert_eq!(json["message"], "Email already registered");
}

#[sqlx::test(migrator = "qadash_core::migrate::MIGRATOR")]
async fn login_checks_password_and_accepts_username(pool: PgPool) {
    let app = common::TestApp::new(pool);
    let user = app.register("login").await;

    let (status, json) = app
        .call(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "email": user.email, "password": "wrong-password" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["message"], "Invalid credentials");

    let (status, json) = app
        .call(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "username": user.username, "password": "secret123" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["tokenType"], "bearer");

    let token = json["accessToken"].as_str().unwrap();
    let (status, me) = app.call(Method::GET, "/api/auth/me", Some(token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["email"], user.email.as_str());
}

#[sqlx::test(migrator = "qadash_core::migrate::MIGRATOR")]
async fn protected_routes_require_a_token(pool: PgPool) {
    let app = common::TestApp::new(pool);
    let (status, json) = app.call(Method::GET, "/api/projects", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["error"], "unauthorized");

    let (status, _) = app
        .call(Method::GET, "/api/projects", Some("not-a-jwt"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrator = "qadash_core::migrate::MIGRATOR")]
async fn forgot_password_does_not_reveal_accounts(pool: PgPool) {
    let app = common::TestApp::new(pool);
    let user = app.register("forgot").await;

    let (known_status, known) = app
        .call(
            Method::POST,
            "/api/auth/forgot-password",
            None,
            Some(json!({ "email": user.email })),
        )
        .await;
    let (unknown_status, unknown) = app
        .call(
            Method::POST,
            "/api/auth/forgot-password",
            None,
            Some(json!({ "email": format!("{}@nowhere.test", common::unique("ghost")) })),
        )
        .await;
    assert_eq!(known_status, StatusCode::OK);
    assert_eq!(unknown_status, StatusCode::OK);
    assert_eq!(known, unknown);
}

#[sqlx::test(migrator = "qadash_core::migrate::MIGRATOR")]
async fn forgot_password_answers_before_mail_is_delivered(pool: PgPool) {
    let mail_server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(800)))
        .mount(&mail_server)
        .await;

    let mut config = common::test_config();
    config.mail = MailConfig {
        provider: "http".into(),
        api_url: Some(mail_server.uri()),
        api_key: None,
        from: "qa@example.com".into(),
    };
    let app = common::TestApp::with_config(pool, config);
    let user = app.register("slowmail").await;

    let started = Instant::now();
    let (status, json) = app
        .call(
            Method::POST,
            "/api/auth/forgot-password",
            None,
            Some(json!({ "email": user.email })),
        )
        .await;
    let elapsed = started.elapsed();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], FORGOT_PASSWORD_MESSAGE);
    assert!(
        elapsed < Duration::from_millis(400),
        "response waited on the mail provider: {elapsed:?}"
    );

    // The email still goes out in the background.
    let mut delivered = false;
    for _ in 0..50 {
        if !mail_server.received_requests().await.unwrap_or_default().is_empty() {
            delivered = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    assert!(delivered, "reset email was never sent");

    let tokens: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM password_reset_tokens WHERE user_id = $1")
            .bind(user.id)
            .fetch_one(&app.pool)
            .await
            .unwrap();
    assert_eq!(tokens, 1);
}

#[sqlx::test(migrator = "qadash_core::migrate::MIGRATOR")]
async fn reset_token_is_single_use(pool: PgPool) {
    let app = common::TestApp::new(pool);
    let user = app.register("reset").await;
    let (token, _) = issue_reset_token(&app.pool, &user.id, 3600).await.unwrap();

    let body = json!({ "token": token, "newPassword": "brand-new-pass1" });
    let (status, _) = app
        .call(Method::POST, "/api/auth/reset-password", None, Some(body.clone()))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, json) = app
        .call(Method::POST, "/api/auth/reset-password", None, Some(body))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "Invalid or expired reset token");

    let (status, _) = app
        .call(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "email": user.email, "password": "brand-new-pass1" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[sqlx::test(migrator = "qadash_core::migrate::MIGRATOR")]
async fn expired_reset_token_is_rejected(pool: PgPool) {
    let app = common::TestApp::new(pool);
    let user = app.register("expired").await;
    let (token, _) = issue_reset_token(&app.pool, &user.id, -60).await.unwrap();

    let (status, json) = app
        .call(
            Method::POST,
            "/api/auth/reset-password",
            None,
            Some(json!({ "token": token, "newPassword": "brand-new-pass1" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "Reset token has expired");

    // The old password still works.
    let (status, _) = app
        .call(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "email": user.email, "password": "secret123" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[sqlx::test(migrator = "qadash_core::migrate::MIGRATOR")]
async fn health_reports_database(pool: PgPool) {
    let app = common::TestApp::new(pool);
    let (status, json) = app.call(Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert_eq!(json["database"], true);
}
