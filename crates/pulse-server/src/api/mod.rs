mod admin;
mod cron;
mod pulse;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Serialize;
use sqlx::PgPool;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

use crate::middleware::{
    enforce_rate_limit, request_id, require_admin_secret, require_bearer_auth, AdminState,
    AuthState, RateLimitState,
};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub roster: Arc<pulse_core::OverlordRoster>,
    pub config: Arc<pulse_core::AppConfig>,
}

/// A terminal error response: `{ "error": "<message>" }` with a status code.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status, Json(serde_json::json!({ "error": self.message }))).into_response()
    }
}

pub(super) fn map_db_error(error: &pulse_db::DbError) -> ApiError {
    tracing::error!(error = %error, "database query failed");
    ApiError::internal("database query failed")
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    database: &'static str,
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-request-id"),
            HeaderName::from_static("x-admin-secret"),
        ])
}

pub fn build_app(
    state: AppState,
    cron_auth: AuthState,
    admin: AdminState,
    rate_limit: RateLimitState,
) -> Router {
    // Public, read-only, cache-friendly. These never trigger ingestion.
    let public_routes = Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/pulse", get(pulse::get_pulse_overview))
        .route("/api/v1/pulse/history", get(pulse::get_pulse_history))
        .route("/api/v1/pulse/{overlord}", get(pulse::get_overlord_detail));

    let cron_routes = Router::new()
        .route("/api/v1/cron/pulse", get(cron::trigger_pulse))
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn_with_state(
                    rate_limit.clone(),
                    enforce_rate_limit,
                ))
                .layer(axum::middleware::from_fn_with_state(
                    cron_auth,
                    require_bearer_auth,
                )),
        );

    let admin_routes = Router::new()
        .route(
            "/api/v1/admin/pulse",
            get(admin::admin_status).post(admin::admin_refresh),
        )
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn_with_state(
                    rate_limit,
                    enforce_rate_limit,
                ))
                .layer(axum::middleware::from_fn_with_state(
                    admin,
                    require_admin_secret,
                )),
        );

    Router::new()
        .merge(public_routes)
        .merge(cron_routes)
        .merge(admin_routes)
        .layer(
            ServiceBuilder::new()
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    match pulse_db::health_check(&state.pool).await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthData {
                status: "ok",
                database: "ok",
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "health check: database unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthData {
                    status: "degraded",
                    database: "unavailable",
                }),
            )
        }
    }
}

pub fn default_rate_limit_state() -> RateLimitState {
    RateLimitState::new(120, Duration::from_secs(60))
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::net::{IpAddr, Ipv4Addr, SocketAddr};
    use std::path::PathBuf;

    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use chrono::{Days, Utc};
    use pulse_core::{AppConfig, Environment, OverlordConfig, OverlordRoster};
    use pulse_db::{recalculate_cache, upsert_snapshot};
    use tower::ServiceExt;

    use super::*;

    fn test_overlord(key: &str, query: &str) -> OverlordConfig {
        OverlordConfig {
            key: key.to_string(),
            name: format!("Name {key}"),
            short_name: key.to_string(),
            companies: vec![],
            search_query: query.to_string(),
            accent_color: "#123456".to_string(),
            artwork_slug: key.to_string(),
        }
    }

    fn test_config(news_api_key: Option<&str>, news_base_url: Option<&str>) -> AppConfig {
        AppConfig {
            database_url: "postgres://unused".to_string(),
            env: Environment::Test,
            bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 0),
            log_level: "info".to_string(),
            overlords_path: PathBuf::from("./config/overlords.yaml"),
            news_api_key: news_api_key.map(ToOwned::to_owned),
            news_base_url: news_base_url.map(ToOwned::to_owned),
            news_timeout_secs: 5,
            inter_request_delay_ms: 0,
            cron_schedule: "0 0 6 * * *".to_string(),
            admin_secret: Some("admin-secret".to_string()),
            db_max_connections: 5,
            db_min_connections: 1,
            db_acquire_timeout_secs: 5,
        }
    }

    fn test_app(pool: sqlx::PgPool, config: AppConfig) -> Router {
        let roster = OverlordRoster {
            overlords: vec![
                test_overlord("musk", "musk-query"),
                test_overlord("bezos", "bezos-query"),
            ],
        };
        let state = AppState {
            pool,
            roster: Arc::new(roster),
            config: Arc::new(config),
        };
        let cron_auth = AuthState::with_tokens(HashSet::from(["cron-token".to_string()]));
        let admin = AdminState::new(Some("admin-secret".to_string()), true).expect("admin state");
        build_app(state, cron_auth, admin, default_rate_limit_state())
    }

    async fn get_json(
        app: Router,
        uri: &str,
        headers: &[(&str, &str)],
    ) -> (StatusCode, serde_json::Value) {
        let mut builder = Request::builder().uri(uri);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        let response = app
            .oneshot(builder.body(Body::empty()).expect("request"))
            .await
            .expect("response");
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        let json: serde_json::Value = if body.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&body).expect("json parse")
        };
        (status, json)
    }

    // ---------------------------------------------------------------------
    // Health
    // ---------------------------------------------------------------------

    #[sqlx::test(migrations = "../../migrations")]
    async fn health_returns_ok(pool: sqlx::PgPool) {
        let app = test_app(pool, test_config(None, None));
        let (status, json) = get_json(app, "/api/v1/health", &[]).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "ok");
        assert_eq!(json["database"], "ok");
    }

    // ---------------------------------------------------------------------
    // Aggregate listing
    // ---------------------------------------------------------------------

    #[sqlx::test(migrations = "../../migrations")]
    async fn overview_empty_state_is_well_defined(pool: sqlx::PgPool) {
        let app = test_app(pool, test_config(None, None));
        let (status, json) = get_json(app, "/api/v1/pulse", &[]).await;

        assert_eq!(status, StatusCode::OK);
        assert!(json["updated_at"].is_null());
        assert_eq!(json["overlords"], serde_json::json!([]));
        assert!(json["hottest"].is_null());
        assert!(json["biggest_surge"].is_null());
        assert!(json["most_negative"].is_null());
        assert!(json["quietest"].is_null());
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn overview_derives_superlatives_from_cache(pool: sqlx::PgPool) {
        let today = Utc::now().date_naive();
        upsert_snapshot(&pool, "musk", today, 50, 0.4, &[])
            .await
            .expect("seed musk");
        upsert_snapshot(&pool, "bezos", today, 90, -0.6, &[])
            .await
            .expect("seed bezos");
        recalculate_cache(&pool, "musk", today)
            .await
            .expect("recalc musk");
        recalculate_cache(&pool, "bezos", today)
            .await
            .expect("recalc bezos");

        let app = test_app(pool, test_config(None, None));
        let (status, json) = get_json(app, "/api/v1/pulse", &[]).await;

        assert_eq!(status, StatusCode::OK);
        let overlords = json["overlords"].as_array().expect("overlords array");
        assert_eq!(overlords.len(), 2);
        // Hottest first.
        assert_eq!(overlords[0]["key"], "bezos");
        assert_eq!(overlords[0]["name"], "Name bezos");
        assert_eq!(overlords[0]["accent_color"], "#123456");
        assert_eq!(overlords[0]["pulse_7day"], 90);

        assert_eq!(json["hottest"], "bezos");
        assert_eq!(json["quietest"], "musk");
        assert_eq!(json["most_negative"], "bezos");
        // Both trend at +100%; the tie resolves to listing order.
        assert_eq!(json["biggest_surge"], "bezos");
        assert!(json["updated_at"].is_string());
    }

    // ---------------------------------------------------------------------
    // Per-overlord detail
    // ---------------------------------------------------------------------

    #[sqlx::test(migrations = "../../migrations")]
    async fn detail_unknown_key_is_404(pool: sqlx::PgPool) {
        let app = test_app(pool, test_config(None, None));
        let (status, json) = get_json(app, "/api/v1/pulse/nobody", &[]).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(json["error"]
            .as_str()
            .is_some_and(|e| e.contains("nobody")));
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn detail_configured_key_without_data_is_zeroed(pool: sqlx::PgPool) {
        let app = test_app(pool, test_config(None, None));
        let (status, json) = get_json(app, "/api/v1/pulse/musk", &[]).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["key"], "musk");
        assert_eq!(json["name"], "Name musk");
        assert_eq!(json["current"]["pulse_7day"], 0);
        assert_eq!(json["current"]["pulse_30day"], 0);
        assert_eq!(json["current"]["trend_direction"], "stable");
        assert_eq!(json["current"]["sentiment_label"], "neutral");
        assert_eq!(json["top_headlines"], serde_json::json!([]));
        assert_eq!(json["daily_history"], serde_json::json!([]));
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn detail_returns_cache_and_history(pool: sqlx::PgPool) {
        let today = Utc::now().date_naive();
        let yesterday = today - Days::new(1);
        upsert_snapshot(&pool, "musk", yesterday, 5, 0.1, &[])
            .await
            .expect("seed yesterday");
        upsert_snapshot(&pool, "musk", today, 12, 0.3, &[])
            .await
            .expect("seed today");
        recalculate_cache(&pool, "musk", today)
            .await
            .expect("recalc");

        let app = test_app(pool, test_config(None, None));
        let (status, json) = get_json(app, "/api/v1/pulse/musk", &[]).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["current"]["pulse_7day"], 17);
        assert_eq!(json["current"]["trend_direction"], "surging");
        let history = json["daily_history"].as_array().expect("history array");
        assert_eq!(history.len(), 2);
        assert_eq!(history[0]["article_count"], 5);
        assert_eq!(history[1]["article_count"], 12);
    }

    // ---------------------------------------------------------------------
    // Multi-overlord history
    // ---------------------------------------------------------------------

    #[sqlx::test(migrations = "../../migrations")]
    async fn history_defaults_and_clamps_days(pool: sqlx::PgPool) {
        let app = test_app(pool.clone(), test_config(None, None));
        let (status, json) = get_json(app, "/api/v1/pulse/history", &[]).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["days"], 90);
        assert_eq!(json["data"], serde_json::json!({}));

        let app = test_app(pool.clone(), test_config(None, None));
        let (_, json) = get_json(app, "/api/v1/pulse/history?days=9999", &[]).await;
        assert_eq!(json["days"], 365);

        let app = test_app(pool, test_config(None, None));
        let (_, json) = get_json(app, "/api/v1/pulse/history?days=0", &[]).await;
        assert_eq!(json["days"], 1);
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn history_groups_series_by_overlord(pool: sqlx::PgPool) {
        let today = Utc::now().date_naive();
        upsert_snapshot(&pool, "musk", today - Days::new(1), 4, 0.0, &[])
            .await
            .expect("seed");
        upsert_snapshot(&pool, "musk", today, 6, 0.0, &[])
            .await
            .expect("seed");
        upsert_snapshot(&pool, "bezos", today, 9, 0.0, &[])
            .await
            .expect("seed");

        let app = test_app(pool, test_config(None, None));
        let (status, json) = get_json(app, "/api/v1/pulse/history?days=30", &[]).await;

        assert_eq!(status, StatusCode::OK);
        let musk = json["data"]["musk"].as_array().expect("musk series");
        assert_eq!(musk.len(), 2);
        assert_eq!(musk[0]["count"], 4);
        assert_eq!(musk[1]["count"], 6);
        let bezos = json["data"]["bezos"].as_array().expect("bezos series");
        assert_eq!(bezos.len(), 1);
    }

    // ---------------------------------------------------------------------
    // Cron trigger
    // ---------------------------------------------------------------------

    #[sqlx::test(migrations = "../../migrations")]
    async fn cron_requires_bearer_token(pool: sqlx::PgPool) {
        let app = test_app(pool.clone(), test_config(None, None));
        let (status, _) = get_json(app, "/api/v1/cron/pulse", &[]).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let app = test_app(pool, test_config(None, None));
        let (status, _) = get_json(
            app,
            "/api/v1/cron/pulse",
            &[("authorization", "Bearer wrong-token")],
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn cron_without_credential_is_a_fatal_error(pool: sqlx::PgPool) {
        let app = test_app(pool.clone(), test_config(None, None));
        let (status, json) = get_json(
            app,
            "/api/v1/cron/pulse",
            &[("authorization", "Bearer cron-token")],
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["status"], "error");
        assert!(json["error"]
            .as_str()
            .is_some_and(|e| e.contains("NEWS_API_KEY")));

        // The fatal outcome is still captured in the job log.
        let logs = pulse_db::list_recent_job_logs(&pool, 5)
            .await
            .expect("logs");
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].status, "error");
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn cron_runs_job_end_to_end_against_mock_source(pool: sqlx::PgPool) {
        use wiremock::matchers::{method, query_param};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        for query in ["musk-query", "bezos-query"] {
            Mock::given(method("GET"))
                .and(query_param("q", query))
                .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                    "status": "ok",
                    "totalResults": 8,
                    "articles": [{
                        "title": "Quiet day",
                        "description": "nothing much happened",
                        "url": "https://reuters.com/quiet",
                        "source": { "name": "Reuters" },
                        "publishedAt": "2026-08-08T09:00:00Z"
                    }]
                })))
                .mount(&server)
                .await;
        }

        let app = test_app(
            pool.clone(),
            test_config(Some("test-key"), Some(&server.uri())),
        );
        let (status, json) = get_json(
            app,
            "/api/v1/cron/pulse",
            &[("authorization", "Bearer cron-token")],
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "success");
        assert_eq!(json["results"].as_array().map(Vec::len), Some(2));
        assert_eq!(json["errors"], serde_json::json!([]));
        assert!(json["ran_at"].is_string());

        let cache = pulse_db::get_cache_row(&pool, "musk")
            .await
            .expect("cache query")
            .expect("musk cache row");
        assert_eq!(cache.pulse_7day, 8);
    }

    // ---------------------------------------------------------------------
    // Admin surface
    // ---------------------------------------------------------------------

    #[sqlx::test(migrations = "../../migrations")]
    async fn admin_requires_secret(pool: sqlx::PgPool) {
        let app = test_app(pool, test_config(None, None));
        let (status, _) = get_json(app, "/api/v1/admin/pulse", &[]).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn admin_status_returns_cache_and_logs(pool: sqlx::PgPool) {
        let today = Utc::now().date_naive();
        upsert_snapshot(&pool, "musk", today, 21, 0.0, &[])
            .await
            .expect("seed");
        recalculate_cache(&pool, "musk", today)
            .await
            .expect("recalc");
        pulse_db::insert_job_log(&pool, "success", "musk: 21 articles", None)
            .await
            .expect("log");

        let app = test_app(pool, test_config(None, None));
        let (status, json) = get_json(
            app,
            "/api/v1/admin/pulse",
            &[("x-admin-secret", "admin-secret")],
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let overlords = json["overlords"].as_array().expect("overlords");
        assert_eq!(overlords.len(), 1);
        assert_eq!(overlords[0]["key"], "musk");
        assert_eq!(overlords[0]["pulse_7day"], 21);
        let jobs = json["recent_jobs"].as_array().expect("recent_jobs");
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0]["status"], "success");
        assert!(json["last_updated"].is_string());
    }
}
