//! Shared helpers for router-level integration tests.
//!
//! Each test is a `#[sqlx::test]` and receives its own migrated database,
//! created from the server named by `DATABASE_URL`.

#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use qadash_api::{AppState, config::ApiConfig};
use serde_json::{Value, json};
use sqlx::PgPool;
use tower::ServiceExt;
use uuid::Uuid;

pub struct TestApp {
    pub app: Router,
    pub pool: PgPool,
}

/// A registered user and their bearer token.
pub struct TestUser {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub token: String,
}

/// Configuration used by every test app: fixed secret, no rate limits.
pub fn test_config() -> ApiConfig {
    ApiConfig {
        bind_addr: "127.0.0.1:0".into(),
        jwt_secret: "test-secret".into(),
        rate_limit_enabled: false,
        ..ApiConfig::default()
    }
}

/// Random suffix for unique usernames and emails.
pub fn unique(prefix: &str) -> String {
    let id = Uuid::new_v4().simple().to_string();
    format!("{prefix}{}", &id[..12])
}

impl TestApp {
    pub fn new(pool: PgPool) -> Self {
        Self::with_config(pool, test_config())
    }

    pub fn with_config(pool: PgPool, config: ApiConfig) -> Self {
        let app = qadash_api::router(AppState::new(pool.clone(), config));
        Self { app, pool }
    }

    /// Send one request and decode the JSON body (or `Null` when empty).
    pub async fn call(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let (status, bytes) = self.call_raw(method, uri, token, body).await;
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }

    pub async fn call_raw(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Vec<u8>) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let req = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let resp = self.app.clone().oneshot(req).await.expect("request");
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .expect("read body");
        (status, bytes.to_vec())
    }

    pub async fn register(&self, prefix: &str) -> TestUser {
        let username = unique(prefix);
        let email = format!("{username}@example.com");
        let (status, json) = self
            .call(
                Method::POST,
                "/api/auth/register",
                None,
                Some(json!({
                    "username": username,
                    "email": email,
                    "password": "secret123",
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {json}");
        TestUser {
            id: json["user"]["id"].as_str().unwrap().parse().unwrap(),
            email,
            username,
            token: json["accessToken"].as_str().unwrap().to_string(),
        }
    }

    pub async fn create_project(&self, owner: &TestUser, name: &str) -> Uuid {
        let (status, json) = self
            .call(
                Method::POST,
                "/api/projects",
                Some(&owner.token),
                Some(json!({ "name": name, "description": "integration" })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create project failed: {json}");
        json["id"].as_str().unwrap().parse().unwrap()
    }

    pub async fn add_member(&self, owner: &TestUser, project: Uuid, user: &TestUser, role: &str) {
        let (status, json) = self
            .call(
                Method::POST,
                &format!("/api/projects/{project}/members"),
                Some(&owner.token),
                Some(json!({ "email": user.email, "role": role })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "add member failed: {json}");
    }

    pub async fn create_test_case(
        &self,
        user: &TestUser,
        project: Uuid,
        tab: &str,
        title: &str,
    ) -> (StatusCode, Value) {
        self.call(
            Method::POST,
            "/api/test-cases",
            Some(&user.token),
            Some(json!({
                "projectId": project,
                "tabName": tab,
                "title": title,
                "steps": "1. open the page",
                "expectedResult": "page loads",
            })),
        )
        .await
    }
}
