//! Per-client rate limiting for sensitive endpoints.
//!
//! Each bucket holds a keyed `governor` limiter. The key is the client IP,
//! taken from the first `X-Forwarded-For` entry when present and otherwise
//! from the socket address. Keys whose quota has refilled are dropped by a
//! background pruner.

use std::net::SocketAddr;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{ConnectInfo, Request, State};
use axum::middleware::Next;
use axum::response::Response;
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};
use tracing::{debug, warn};

use crate::AppState;
use crate::error::AppError;

/// Rate-limited endpoint groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bucket {
    Login,
    Register,
    /// Forgot-password and reset-password.
    Password,
    Invite,
}

impl Bucket {
    /// Allowed requests per window.
    fn limit(self) -> (u32, Duration) {
        const MINUTE: u64 = 60;
        match self {
            Bucket::Login => (5, Duration::from_secs(15 * MINUTE)),
            Bucket::Register => (3, Duration::from_secs(60 * MINUTE)),
            Bucket::Password => (3, Duration::from_secs(60 * MINUTE)),
            Bucket::Invite => (10, Duration::from_secs(60 * MINUTE)),
        }
    }

    fn message(self) -> &'static str {
        match self {
            Bucket::Login => "Too many login attempts. Please try again later.",
            Bucket::Register => "Too many registration attempts. Please try again later.",
            Bucket::Password => "Too many password reset requests. Please try again later.",
            Bucket::Invite => "Too many invitations sent. Please try again later.",
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Bucket::Login => "login",
            Bucket::Register => "register",
            Bucket::Password => "password",
            Bucket::Invite => "invite",
        }
    }
}

/// Build a quota admitting `count` requests per `window`, refilling evenly.
fn quota(count: u32, window: Duration) -> Quota {
    let burst = NonZeroU32::new(count).unwrap_or(NonZeroU32::MIN);
    Quota::with_period(window / burst.get())
        .unwrap_or_else(|| Quota::per_hour(burst))
        .allow_burst(burst)
}

/// Keyed limiters for every bucket.
#[derive(Clone)]
pub struct RateLimiters {
    enabled: bool,
    login: Arc<DefaultKeyedRateLimiter<String>>,
    register: Arc<DefaultKeyedRateLimiter<String>>,
    password: Arc<DefaultKeyedRateLimiter<String>>,
    invite: Arc<DefaultKeyedRateLimiter<String>>,
}

/// How often idle client keys are dropped from the limiters.
pub const PRUNE_INTERVAL: Duration = Duration::from_secs(10 * 60);

impl RateLimiters {
    pub fn new(enabled: bool) -> Self {
        Self::with_quotas(enabled, |bucket| {
            let (count, window) = bucket.limit();
            quota(count, window)
        })
    }

    fn with_quotas(enabled: bool, quota_for: impl Fn(Bucket) -> Quota) -> Self {
        let make = |bucket: Bucket| -> Arc<DefaultKeyedRateLimiter<String>> {
            Arc::new(RateLimiter::keyed(quota_for(bucket)))
        };
        Self {
            enabled,
            login: make(Bucket::Login),
            register: make(Bucket::Register),
            password: make(Bucket::Password),
            invite: make(Bucket::Invite),
        }
    }

    fn all(&self) -> [&DefaultKeyedRateLimiter<String>; 4] {
        [&self.login, &self.register, &self.password, &self.invite]
    }

    /// Forget clients whose quota has fully replenished.
    pub fn prune(&self) {
        for limiter in self.all() {
            limiter.retain_recent();
            limiter.shrink_to_fit();
        }
    }

    /// Number of client keys currently tracked across all buckets.
    pub fn tracked_keys(&self) -> usize {
        self.all().iter().map(|limiter| limiter.len()).sum()
    }

    /// Prune every `period` on the current tokio runtime. Does nothing when
    /// limiting is disabled or no runtime is running.
    pub fn spawn_pruner(&self, period: Duration) {
        if !self.enabled {
            return;
        }
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!("no tokio runtime; rate-limit keys will not be pruned");
            return;
        };
        let limits = self.clone();
        runtime.spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let before = limits.tracked_keys();
                limits.prune();
                debug!(before, after = limits.tracked_keys(), "pruned rate-limit keys");
            }
        });
    }

    fn limiter(&self, bucket: Bucket) -> &DefaultKeyedRateLimiter<String> {
        match bucket {
            Bucket::Login => &self.login,
            Bucket::Register => &self.register,
            Bucket::Password => &self.password,
            Bucket::Invite => &self.invite,
        }
    }

    /// Record one request from `key` against `bucket`.
    pub fn check(&self, bucket: Bucket, key: &str) -> Result<(), AppError> {
        if !self.enabled {
            return Ok(());
        }
        self.limiter(bucket)
            .check_key(&key.to_string())
            .map_err(|_| {
                warn!(bucket = bucket.as_str(), client = %key, "rate limit exceeded");
                AppError::RateLimited(bucket.message().into())
            })
    }
}

/// Client address for rate-limit keys.
pub fn client_key(request: &Request) -> String {
    if let Some(forwarded) = request
        .headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        && let Some(first) = forwarded.split(',').map(str::trim).find(|s| !s.is_empty())
    {
        return first.to_string();
    }
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Axum middleware applying the limiter for one bucket.
pub async fn rate_limit(
    State((state, bucket)): State<(AppState, Bucket)>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let key = client_key(&request);
    state.rate_limits.check(bucket, &key)?;
    Ok(next.run(request).await)
}
