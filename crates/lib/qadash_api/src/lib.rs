//! # qadash_api
//!
//! HTTP API library for QA Dashboard.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use axum::Router;
use axum::http::HeaderValue;
use axum::middleware::from_fn_with_state;
use axum::routing::{delete, get, patch, post, put};
use sqlx::PgPool;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::warn;

use crate::config::ApiConfig;
use crate::handlers::{
    auth, health, invites, members, projects, statistics, test_cases, users,
};
use crate::middleware::rate_limit::{Bucket, PRUNE_INTERVAL, RateLimiters, rate_limit};

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// PostgreSQL connection pool.
    pub pool: PgPool,
    /// API configuration.
    pub config: ApiConfig,
    /// Outbound HTTP client for the mail provider.
    pub http: reqwest::Client,
    pub rate_limits: RateLimiters,
}

impl AppState {
    pub fn new(pool: PgPool, config: ApiConfig) -> Self {
        let rate_limits = RateLimiters::new(config.rate_limit_enabled);
        rate_limits.spawn_pruner(PRUNE_INTERVAL);
        Self {
            pool,
            config,
            http: reqwest::Client::new(),
            rate_limits,
        }
    }
}

/// Run embedded database migrations.
///
/// Delegates to `qadash_core::migrate::migrate()` which owns the migration files.
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    qadash_core::migrate::migrate(pool).await
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() {
        return layer.allow_origin(Any);
    }
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(_) => {
                warn!(origin = %o, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(allowed))
}

/// Builds the Axum router with all routes and shared state.
pub fn router(state: AppState) -> Router {
    // Public routes (no auth required)
    let public = Router::new()
        .route(routes::GET_HEALTH, get(health::health_handler))
        .route(
            routes::POST_AUTH_REGISTER,
            post(auth::register_handler).layer(from_fn_with_state(
                (state.clone(), Bucket::Register),
                rate_limit,
            )),
        )
        .route(
            routes::POST_AUTH_LOGIN,
            post(auth::login_handler).layer(from_fn_with_state(
                (state.clone(), Bucket::Login),
                rate_limit,
            )),
        )
        .route(
            routes::POST_AUTH_FORGOT_PASSWORD,
            post(auth::forgot_password_handler).layer(from_fn_with_state(
                (state.clone(), Bucket::Password),
                rate_limit,
            )),
        )
        .route(
            routes::POST_AUTH_RESET_PASSWORD,
            post(auth::reset_password_handler).layer(from_fn_with_state(
                (state.clone(), Bucket::Password),
                rate_limit,
            )),
        )
        .route(
            routes::GET_INVITES_TOKEN,
            get(invites::preview_invite_handler),
        );

    // Protected routes (require auth)
    let protected = Router::new()
        .route(
            routes::AUTH_ME,
            get(auth::me_handler).put(auth::update_me_handler),
        )
        .route(
            routes::POST_AUTH_CHANGE_PASSWORD,
            post(auth::change_password_handler),
        )
        .route(routes::GET_USERS, get(users::list_users_handler))
        .route(
            routes::PUT_USERS_ID_ROLE,
            put(users::update_user_role_handler),
        )
        .route(
            routes::PROJECTS,
            get(projects::list_projects_handler).post(projects::create_project_handler),
        )
        .route(
            routes::PROJECTS_ID,
            get(projects::get_project_handler)
                .put(projects::update_project_handler)
                .delete(projects::delete_project_handler),
        )
        .route(
            routes::GET_PROJECTS_INVITE_CODE,
            get(projects::find_by_invite_code_handler),
        )
        .route(
            routes::PROJECTS_ID_TABS,
            get(projects::list_tabs_handler)
                .post(projects::add_tab_handler)
                .put(projects::rename_tab_handler)
                .delete(projects::delete_tab_handler),
        )
        .route(
            routes::PROJECTS_ID_MEMBERS,
            get(members::list_members_handler).post(members::add_member_handler),
        )
        .route(
            routes::PROJECTS_ID_MEMBERS_USER_ID,
            put(members::update_member_role_handler)
                .delete(members::remove_member_handler),
        )
        .route(
            routes::PROJECTS_ID_INVITES,
            get(invites::list_invites_handler).merge(
                post(invites::send_invite_handler).layer(from_fn_with_state(
                    (state.clone(), Bucket::Invite),
                    rate_limit,
                )),
            ),
        )
        .route(
            routes::DELETE_PROJECTS_ID_INVITES_INVITE_ID,
            delete(invites::revoke_invite_handler),
        )
        .route(
            routes::POST_INVITES_TOKEN_ACCEPT,
            post(invites::accept_invite_handler),
        )
        .route(
            routes::TEST_CASES,
            get(test_cases::list_test_cases_handler).post(test_cases::create_test_case_handler),
        )
        .route(
            routes::TEST_CASES_ID,
            get(test_cases::get_test_case_handler)
                .put(test_cases::update_test_case_handler)
                .delete(test_cases::delete_test_case_handler),
        )
        .route(
            routes::PATCH_TEST_CASES_ID_STATUS,
            patch(test_cases::set_status_handler),
        )
        .route(
            routes::TEST_CASES_ID_COMMENTS,
            get(test_cases::list_comments_handler).post(test_cases::add_comment_handler),
        )
        .route(
            routes::POST_TEST_CASES_ID_INSTANTIATE,
            post(test_cases::instantiate_template_handler),
        )
        .route(
            routes::POST_TEST_CASES_BULK_STATUS,
            post(test_cases::bulk_status_handler),
        )
        .route(
            routes::DELETE_TEST_CASES_BULK,
            delete(test_cases::bulk_delete_handler),
        )
        .route(
            routes::GET_TEST_CASES_EXPORT,
            get(test_cases::export_handler),
        )
        .route(routes::GET_STATISTICS, get(statistics::statistics_handler))
        .layer(from_fn_with_state(
            state.clone(),
            middleware::auth::require_auth,
        ));

    Router::new()
        .merge(public)
        .merge(protected)
        .layer(cors_layer(&state.config.cors_origins))
        .with_state(state)
}
