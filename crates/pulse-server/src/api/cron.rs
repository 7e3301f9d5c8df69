//! The scheduled-trigger surface.
//!
//! An external scheduler hits this endpoint on a fixed cadence with a
//! bearer token; the built-in scheduler covers deployments without one.
//! Overlapping invocations are expected to be prevented by the trigger
//! mechanism, not here.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::Utc;

use pulse_engine::run_scheduled_pulse;

use super::AppState;

/// `GET /api/v1/cron/pulse` — run the daily pulse job now.
pub(super) async fn trigger_pulse(State(state): State<AppState>) -> impl IntoResponse {
    match run_scheduled_pulse(&state.pool, &state.roster, &state.config).await {
        Ok(outcome) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "status": outcome.status,
                "results": outcome.results,
                "errors": outcome.errors,
                "ran_at": Utc::now(),
            })),
        ),
        Err(e) => {
            tracing::error!(error = %e, "cron pulse run failed before starting");
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
