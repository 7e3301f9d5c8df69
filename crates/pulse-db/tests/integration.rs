//! Offline unit tests for pulse-db pool configuration and row types.
//! These tests do not require a live database connection.

use pulse_core::{AppConfig, Environment};
use pulse_db::{CacheRow, Headline, JobLogRow, PoolConfig};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

#[test]
fn pool_config_from_app_config_uses_core_values() {
    let app_config = AppConfig {
        database_url: "postgres://example".to_string(),
        env: Environment::Test,
        bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 3000),
        log_level: "info".to_string(),
        overlords_path: PathBuf::from("./config/overlords.yaml"),
        news_api_key: None,
        news_base_url: None,
        news_timeout_secs: 30,
        inter_request_delay_ms: 2000,
        cron_schedule: "0 0 6 * * *".to_string(),
        admin_secret: None,
        db_max_connections: 42,
        db_min_connections: 7,
        db_acquire_timeout_secs: 9,
    };

    let pool_config = PoolConfig::from_app_config(&app_config);
    assert_eq!(pool_config.max_connections, 42);
    assert_eq!(pool_config.min_connections, 7);
    assert_eq!(pool_config.acquire_timeout_secs, 9);
}

#[test]
fn headline_round_trips_through_json() {
    let headline = Headline {
        title: "Tesla unveils new battery".to_string(),
        source_name: "Reuters".to_string(),
        url: "https://reuters.com/tech/tesla-battery".to_string(),
        published_at: "2026-08-08T09:00:00Z".to_string(),
        description: "A breakthrough in energy density.".to_string(),
    };

    let json = serde_json::to_string(&headline).expect("serialize");
    assert!(json.contains("\"source_name\":\"Reuters\""));

    let back: Headline = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(back, headline);
}

/// Compile-time smoke test: confirm that [`CacheRow`] has all expected
/// fields with the correct types. No database required.
#[test]
fn cache_row_has_expected_fields() {
    use chrono::Utc;

    let row = CacheRow {
        overlord: "musk".to_string(),
        pulse_7day: 120,
        pulse_30day: 480,
        trend_percent: 30.0,
        trend_direction: "surging".to_string(),
        avg_sentiment_7day: -0.12,
        sentiment_label: "leaning negative".to_string(),
        top_headlines: serde_json::json!([]),
        peak_day_30d: None,
        peak_count_30d: 0,
        updated_at: Utc::now(),
    };

    assert_eq!(row.overlord, "musk");
    assert!(row.pulse_7day <= row.pulse_30day);
    assert!(row.peak_day_30d.is_none());
}

/// Compile-time smoke test for [`JobLogRow`].
#[test]
fn job_log_row_has_expected_fields() {
    use chrono::Utc;

    let row = JobLogRow {
        id: 1_i64,
        ran_at: Utc::now(),
        status: "partial".to_string(),
        summary: "musk: 12 articles".to_string(),
        error: Some("Error fetching bezos: timeout".to_string()),
    };

    assert_eq!(row.status, "partial");
    assert!(row.error.is_some());
}
