//! Secret-guarded operational surface: trigger a run, inspect the cache and
//! recent job log. A privileged superset of the public read API plus the
//! cron trigger.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;

use pulse_engine::run_scheduled_pulse;

use super::{map_db_error, ApiError, AppState};

const RECENT_JOBS_LIMIT: i64 = 10;

#[derive(Debug, Serialize)]
pub(super) struct AdminStatus {
    overlords: Vec<AdminOverlordSummary>,
    recent_jobs: Vec<AdminJobLog>,
    last_updated: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub(super) struct AdminOverlordSummary {
    key: String,
    name: String,
    pulse_7day: i32,
    pulse_30day: i32,
    trend_direction: String,
    sentiment_label: String,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub(super) struct AdminJobLog {
    id: i64,
    ran_at: DateTime<Utc>,
    status: String,
    summary: String,
    error: Option<String>,
}

/// `GET /api/v1/admin/pulse` — cache summary plus recent job outcomes.
pub(super) async fn admin_status(
    State(state): State<AppState>,
) -> Result<Json<AdminStatus>, ApiError> {
    let rows = pulse_db::list_cache_rows(&state.pool)
        .await
        .map_err(|e| map_db_error(&e))?;
    let logs = pulse_db::list_recent_job_logs(&state.pool, RECENT_JOBS_LIMIT)
        .await
        .map_err(|e| map_db_error(&e))?;

    let last_updated = rows.iter().map(|r| r.updated_at).max();

    let overlords = rows
        .into_iter()
        .map(|row| AdminOverlordSummary {
            name: state
                .roster
                .get(&row.overlord)
                .map_or_else(|| row.overlord.clone(), |c| c.name.clone()),
            key: row.overlord,
            pulse_7day: row.pulse_7day,
            pulse_30day: row.pulse_30day,
            trend_direction: row.trend_direction,
            sentiment_label: row.sentiment_label,
            updated_at: row.updated_at,
        })
        .collect();

    let recent_jobs = logs
        .into_iter()
        .map(|log| AdminJobLog {
            id: log.id,
            ran_at: log.ran_at,
            status: log.status,
            summary: log.summary,
            error: log.error,
        })
        .collect();

    Ok(Json(AdminStatus {
        overlords,
        recent_jobs,
        last_updated,
    }))
}

/// `POST /api/v1/admin/pulse` — trigger a run outside the schedule.
pub(super) async fn admin_refresh(State(state): State<AppState>) -> impl IntoResponse {
    match run_scheduled_pulse(&state.pool, &state.roster, &state.config).await {
        Ok(outcome) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "status": outcome.status,
                "message": "Pulse job completed",
                "results": outcome.results,
                "errors": outcome.errors,
                "ran_at": Utc::now(),
            })),
        ),
        Err(e) => {
            tracing::error!(error = %e, "admin pulse refresh failed before starting");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({
                    "status": "error",
                    "error": e.to_string(),
                })),
            )
        }
    }
}
