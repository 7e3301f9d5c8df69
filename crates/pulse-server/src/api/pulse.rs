//! Public read endpoints over the aggregate cache and snapshot history.
//!
//! Everything here is a pure read; ingestion runs only through the cron and
//! admin surfaces. Empty databases produce well-defined empty shapes so
//! consumers can render a "no data yet" state without special-casing.

use std::collections::BTreeMap;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use pulse_db::{CacheRow, DailyPoint};

use super::{map_db_error, ApiError, AppState};

const DETAIL_HISTORY_DAYS: i32 = 90;
const DEFAULT_HISTORY_DAYS: i32 = 90;
const MAX_HISTORY_DAYS: i32 = 365;

// ---------------------------------------------------------------------------
// Response shapes
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub(super) struct PulseOverview {
    updated_at: Option<DateTime<Utc>>,
    overlords: Vec<OverviewOverlord>,
    hottest: Option<String>,
    biggest_surge: Option<String>,
    most_negative: Option<String>,
    quietest: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct OverviewOverlord {
    key: String,
    name: String,
    short_name: String,
    accent_color: String,
    pulse_7day: i32,
    pulse_30day: i32,
    trend_percent: f64,
    trend_direction: String,
    avg_sentiment_7day: f64,
    sentiment_label: String,
    top_headlines: serde_json::Value,
    peak_day_30d: Option<NaiveDate>,
    peak_count_30d: i32,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub(super) struct CurrentStats {
    pulse_7day: i32,
    pulse_30day: i32,
    trend_percent: f64,
    trend_direction: String,
    avg_sentiment_7day: f64,
    sentiment_label: String,
}

#[derive(Debug, Serialize)]
pub(super) struct OverlordDetail {
    key: String,
    name: String,
    current: CurrentStats,
    top_headlines: serde_json::Value,
    daily_history: Vec<DailyPoint>,
}

#[derive(Debug, Deserialize)]
pub(super) struct HistoryQuery {
    days: Option<i32>,
}

#[derive(Debug, Serialize)]
pub(super) struct HistoryPoint {
    date: NaiveDate,
    count: i32,
}

#[derive(Debug, Serialize)]
pub(super) struct HistoryResponse {
    days: i32,
    data: BTreeMap<String, Vec<HistoryPoint>>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// `GET /api/v1/pulse` — all cache rows plus request-time superlatives.
pub(super) async fn get_pulse_overview(
    State(state): State<AppState>,
) -> Result<Json<PulseOverview>, ApiError> {
    let rows = pulse_db::list_cache_rows(&state.pool)
        .await
        .map_err(|e| map_db_error(&e))?;

    let updated_at = rows.iter().map(|r| r.updated_at).max();
    let hottest = reduce_key(&rows, |a, b| a.pulse_7day > b.pulse_7day);
    let quietest = reduce_key(&rows, |a, b| a.pulse_7day < b.pulse_7day);
    let biggest_surge = reduce_key(&rows, |a, b| a.trend_percent > b.trend_percent);
    let most_negative = reduce_key(&rows, |a, b| a.avg_sentiment_7day < b.avg_sentiment_7day);

    let overlords = rows
        .into_iter()
        .map(|row| {
            let config = state.roster.get(&row.overlord);
            OverviewOverlord {
                key: row.overlord.clone(),
                name: config.map_or_else(|| row.overlord.clone(), |c| c.name.clone()),
                short_name: config.map_or_else(|| row.overlord.clone(), |c| c.short_name.clone()),
                accent_color: config.map_or_else(|| "#888888".to_string(), |c| c.accent_color.clone()),
                pulse_7day: row.pulse_7day,
                pulse_30day: row.pulse_30day,
                trend_percent: row.trend_percent,
                trend_direction: row.trend_direction,
                avg_sentiment_7day: row.avg_sentiment_7day,
                sentiment_label: row.sentiment_label,
                top_headlines: row.top_headlines,
                peak_day_30d: row.peak_day_30d,
                peak_count_30d: row.peak_count_30d,
                updated_at: row.updated_at,
            }
        })
        .collect();

    Ok(Json(PulseOverview {
        updated_at,
        overlords,
        hottest,
        biggest_surge,
        most_negative,
        quietest,
    }))
}

/// `GET /api/v1/pulse/{overlord}` — one overlord's cache row plus trailing
/// 90-day history. 404 only for keys that are not configured; a configured
/// key with no data yet returns the zeroed shape.
pub(super) async fn get_overlord_detail(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<OverlordDetail>, ApiError> {
    let Some(config) = state.roster.get(&key) else {
        return Err(ApiError::not_found(format!("Unknown overlord: {key}")));
    };

    let cache = pulse_db::get_cache_row(&state.pool, &key)
        .await
        .map_err(|e| map_db_error(&e))?;
    let today = Utc::now().date_naive();
    let daily_history = pulse_db::get_daily_history(&state.pool, &key, DETAIL_HISTORY_DAYS, today)
        .await
        .map_err(|e| map_db_error(&e))?;

    let (current, top_headlines) = match cache {
        Some(row) => (
            CurrentStats {
                pulse_7day: row.pulse_7day,
                pulse_30day: row.pulse_30day,
                trend_percent: row.trend_percent,
                trend_direction: row.trend_direction,
                avg_sentiment_7day: row.avg_sentiment_7day,
                sentiment_label: row.sentiment_label,
            },
            row.top_headlines,
        ),
        None => (
            CurrentStats {
                pulse_7day: 0,
                pulse_30day: 0,
                trend_percent: 0.0,
                trend_direction: "stable".to_string(),
                avg_sentiment_7day: 0.0,
                sentiment_label: "neutral".to_string(),
            },
            serde_json::json!([]),
        ),
    };

    Ok(Json(OverlordDetail {
        key,
        name: config.name.clone(),
        current,
        top_headlines,
        daily_history,
    }))
}

/// `GET /api/v1/pulse/history?days=N` — every overlord's daily count series.
pub(super) async fn get_pulse_history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<HistoryResponse>, ApiError> {
    let days = query
        .days
        .unwrap_or(DEFAULT_HISTORY_DAYS)
        .clamp(1, MAX_HISTORY_DAYS);

    let today = Utc::now().date_naive();
    let rows = pulse_db::get_all_daily_history(&state.pool, days, today)
        .await
        .map_err(|e| map_db_error(&e))?;

    let mut data: BTreeMap<String, Vec<HistoryPoint>> = BTreeMap::new();
    for row in rows {
        data.entry(row.overlord).or_default().push(HistoryPoint {
            date: row.date,
            count: row.article_count,
        });
    }

    Ok(Json(HistoryResponse { days, data }))
}

/// First row winning `better` against the current best; ties keep the
/// earlier row, so the cache listing order (hottest first, then key) is the
/// deterministic tie-break.
fn reduce_key<F>(rows: &[CacheRow], better: F) -> Option<String>
where
    F: Fn(&CacheRow, &CacheRow) -> bool,
{
    let mut best: Option<&CacheRow> = None;
    for row in rows {
        match best {
            None => best = Some(row),
            Some(current) if better(row, current) => best = Some(row),
            Some(_) => {}
        }
    }
    best.map(|row| row.overlord.clone())
}
