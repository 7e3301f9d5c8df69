use std::{
    collections::HashSet,
    sync::Arc,
    time::{Duration, Instant},
};

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use subtle::ConstantTimeEq;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Newtype wrapping a request ID string, stored as a request extension.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// Bearer-token settings guarding the cron trigger surface.
#[derive(Debug, Clone)]
pub struct AuthState {
    tokens: Arc<HashSet<String>>,
    pub enabled: bool,
}

impl AuthState {
    /// Builds auth config from `PULSE_CRON_SECRETS` (comma-separated bearer
    /// tokens).
    ///
    /// In development, empty/missing tokens disable auth for local
    /// iteration. In non-development envs, empty/missing tokens fail
    /// startup.
    pub fn from_env(is_development: bool) -> anyhow::Result<Self> {
        let raw = std::env::var("PULSE_CRON_SECRETS").unwrap_or_default();
        let tokens: HashSet<String> = raw
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(ToOwned::to_owned)
            .collect();

        if tokens.is_empty() {
            if is_development {
                tracing::warn!(
                    "PULSE_CRON_SECRETS not set; cron bearer auth disabled in development environment"
                );
                return Ok(Self {
                    tokens: Arc::new(HashSet::new()),
                    enabled: false,
                });
            }

            anyhow::bail!(
                "PULSE_CRON_SECRETS is required outside development; provide comma-separated bearer tokens"
            );
        }

        Ok(Self {
            tokens: Arc::new(tokens),
            enabled: true,
        })
    }

    /// Builds auth config from an explicit token set (tests).
    #[must_use]
    pub fn with_tokens(tokens: HashSet<String>) -> Self {
        let enabled = !tokens.is_empty();
        Self {
            tokens: Arc::new(tokens),
            enabled,
        }
    }

    fn allows(&self, token: &str) -> bool {
        self.tokens.contains(token)
    }
}

/// Shared secret guarding the admin surface, checked in constant time.
#[derive(Clone)]
pub struct AdminState {
    secret: Option<Arc<String>>,
    pub enabled: bool,
}

impl AdminState {
    /// Wraps the configured admin secret.
    ///
    /// Like [`AuthState`], a missing secret disables the check in
    /// development and fails startup elsewhere.
    pub fn new(secret: Option<String>, is_development: bool) -> anyhow::Result<Self> {
        match secret {
            Some(s) if !s.trim().is_empty() => Ok(Self {
                secret: Some(Arc::new(s)),
                enabled: true,
            }),
            _ => {
                if is_development {
                    tracing::warn!(
                        "PULSE_ADMIN_SECRET not set; admin surface unguarded in development environment"
                    );
                    return Ok(Self {
                        secret: None,
                        enabled: false,
                    });
                }
                anyhow::bail!("PULSE_ADMIN_SECRET is required outside development")
            }
        }
    }

    fn allows(&self, candidate: &str) -> bool {
        self.secret
            .as_ref()
            .is_some_and(|s| s.as_bytes().ct_eq(candidate.as_bytes()).into())
    }
}

#[derive(Debug, Clone)]
struct RateLimitWindow {
    started_at: Instant,
    count: usize,
}

/// Fixed-window limiter for the trigger/admin surface.
#[derive(Debug, Clone)]
pub struct RateLimitState {
    max_requests: usize,
    window: Duration,
    state: Arc<Mutex<RateLimitWindow>>,
}

impl RateLimitState {
    #[must_use]
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            state: Arc::new(Mutex::new(RateLimitWindow {
                started_at: Instant::now(),
                count: 0,
            })),
        }
    }
}

#[derive(Debug, Serialize)]
struct MiddlewareErrorBody {
    error: MiddlewareError,
}

#[derive(Debug, Serialize)]
struct MiddlewareError {
    code: &'static str,
    message: &'static str,
}

/// Axum middleware that extracts or generates a request ID.
///
/// If the incoming request has an `x-request-id` header, that value is used.
/// Otherwise a new `UUIDv4` is generated. The ID is:
/// - Inserted into request extensions as [`RequestId`]
/// - Set on the response as the `x-request-id` header
pub async fn request_id(mut req: Request, next: Next) -> Response {
    let id = req
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map_or_else(|| Uuid::new_v4().to_string(), String::from);

    req.extensions_mut().insert(RequestId(id.clone()));

    let mut res = next.run(req).await;

    if let Ok(val) = HeaderValue::from_str(&id) {
        res.headers_mut().insert("x-request-id", val);
    }

    res
}

/// Middleware enforcing Bearer token auth when enabled.
pub async fn require_bearer_auth(
    State(auth): State<AuthState>,
    req: Request,
    next: Next,
) -> Response {
    if !auth.enabled {
        return next.run(req).await;
    }

    let token = extract_bearer_token(req.headers().get(AUTHORIZATION));

    match token {
        Some(token) if auth.allows(token) => next.run(req).await,
        _ => (
            StatusCode::UNAUTHORIZED,
            Json(MiddlewareErrorBody {
                error: MiddlewareError {
                    code: "unauthorized",
                    message: "missing or invalid bearer token",
                },
            }),
        )
            .into_response(),
    }
}

/// Middleware enforcing the `x-admin-secret` header when enabled.
pub async fn require_admin_secret(
    State(admin): State<AdminState>,
    req: Request,
    next: Next,
) -> Response {
    if !admin.enabled {
        return next.run(req).await;
    }

    let candidate = req
        .headers()
        .get("x-admin-secret")
        .and_then(|v| v.to_str().ok());

    match candidate {
        Some(candidate) if admin.allows(candidate) => next.run(req).await,
        _ => (
            StatusCode::UNAUTHORIZED,
            Json(MiddlewareErrorBody {
                error: MiddlewareError {
                    code: "unauthorized",
                    message: "missing or invalid admin secret",
                },
            }),
        )
            .into_response(),
    }
}

/// Middleware enforcing a fixed request-per-window limit.
pub async fn enforce_rate_limit(
    State(rate_limit): State<RateLimitState>,
    req: Request,
    next: Next,
) -> Response {
    let mut window = rate_limit.state.lock().await;
    let elapsed = window.started_at.elapsed();

    if elapsed >= rate_limit.window {
        window.started_at = Instant::now();
        window.count = 0;
    }

    if window.count >= rate_limit.max_requests {
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Json(MiddlewareErrorBody {
                error: MiddlewareError {
                    code: "rate_limited",
                    message: "rate limit exceeded",
                },
            }),
        )
            .into_response();
    }

    window.count += 1;
    drop(window);

    next.run(req).await
}

fn extract_bearer_token(value: Option<&HeaderValue>) -> Option<&str> {
    value
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .filter(|s| !s.trim().is_empty())
}
