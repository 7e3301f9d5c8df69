//! The daily pulse job orchestrator.
//!
//! One run walks the roster strictly sequentially — the news source rate
//! limit is the binding constraint, so the inter-request delay is a
//! correctness requirement, not tuning. Per-overlord failures are collected
//! as strings and the run carries on; only a missing credential before the
//! loop is fatal.

use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use sqlx::PgPool;
use thiserror::Error;

use pulse_core::{round2, AppConfig, OverlordRoster};
use pulse_db::{insert_job_log, recalculate_cache, upsert_snapshot};
use pulse_newsapi::{NewsClient, NewsError};

use crate::filter::filter_articles;
use crate::headlines::project_headlines;
use crate::scorer::calculate_sentiment;

/// Fatal, pre-loop failures. Everything after the loop starts is recorded
/// in the run's error list instead.
#[derive(Debug, Error)]
pub enum JobError {
    #[error("NEWS_API_KEY is not configured")]
    MissingNewsApiKey,
    #[error(transparent)]
    Client(#[from] NewsError),
}

/// Terminal status of a completed (non-fatal) run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Success,
    Partial,
}

impl RunStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            RunStatus::Success => "success",
            RunStatus::Partial => "partial",
        }
    }
}

/// Per-overlord outcome of one run.
#[derive(Debug, Clone, Serialize)]
pub struct OverlordRunResult {
    pub overlord: String,
    /// The source's own total match count, not the retained page length.
    pub article_count: i64,
    pub sentiment_score: f64,
    pub headline_count: usize,
}

/// Outcome of one completed run.
#[derive(Debug, Clone, Serialize)]
pub struct PulseRunOutcome {
    pub status: RunStatus,
    pub results: Vec<OverlordRunResult>,
    pub errors: Vec<String>,
}

/// Run the daily pulse using credentials and tuning from `config`.
///
/// Builds the news client, then delegates to [`run_daily_pulse`]. A missing
/// API key (or an unconstructible client) is the one fatal path: it is
/// recorded as a single `error` job-log entry and returned without touching
/// any snapshot.
///
/// # Errors
///
/// Returns [`JobError`] when the run could not start at all.
pub async fn run_scheduled_pulse(
    pool: &PgPool,
    roster: &OverlordRoster,
    config: &AppConfig,
) -> Result<PulseRunOutcome, JobError> {
    let Some(api_key) = config.news_api_key.as_deref() else {
        log_fatal(pool, &JobError::MissingNewsApiKey.to_string()).await;
        return Err(JobError::MissingNewsApiKey);
    };

    let client = match &config.news_base_url {
        Some(base_url) => NewsClient::with_base_url(api_key, config.news_timeout_secs, base_url),
        None => NewsClient::new(api_key, config.news_timeout_secs),
    };
    let client = match client {
        Ok(client) => client,
        Err(e) => {
            log_fatal(pool, &e.to_string()).await;
            return Err(JobError::Client(e));
        }
    };

    Ok(run_daily_pulse(
        pool,
        roster,
        &client,
        Duration::from_millis(config.inter_request_delay_ms),
    )
    .await)
}

/// Run one pulse ingestion pass over the roster.
///
/// For each overlord, sequentially: fetch → filter → score → upsert the
/// day's snapshot. Each failure is recorded and the loop continues. After
/// the loop, the cache is recomputed for every overlord (failures likewise
/// recorded), and exactly one job-log entry is written.
///
/// `inter_request_delay` spaces the external API calls; pass
/// `Duration::ZERO` in tests.
pub async fn run_daily_pulse(
    pool: &PgPool,
    roster: &OverlordRoster,
    client: &NewsClient,
    inter_request_delay: Duration,
) -> PulseRunOutcome {
    let today = Utc::now().date_naive();
    let mut results: Vec<OverlordRunResult> = Vec::new();
    let mut errors: Vec<String> = Vec::new();

    for (index, overlord) in roster.overlords.iter().enumerate() {
        if index > 0 && !inter_request_delay.is_zero() {
            tokio::time::sleep(inter_request_delay).await;
        }

        match client.fetch_recent(&overlord.search_query).await {
            Ok(response) => {
                let clean = filter_articles(response.articles);
                let headlines = project_headlines(&clean);
                let sentiment_score = round2(calculate_sentiment(&clean));
                let article_count = response.total_results.max(0);

                match upsert_snapshot(
                    pool,
                    &overlord.key,
                    today,
                    i32::try_from(article_count).unwrap_or(i32::MAX),
                    sentiment_score,
                    &headlines,
                )
                .await
                {
                    Ok(()) => {
                        tracing::info!(
                            overlord = %overlord.key,
                            article_count,
                            sentiment_score,
                            headline_count = headlines.len(),
                            "pulse: snapshot upserted"
                        );
                        results.push(OverlordRunResult {
                            overlord: overlord.key.clone(),
                            article_count,
                            sentiment_score,
                            headline_count: headlines.len(),
                        });
                    }
                    Err(e) => {
                        let msg = format!("Error storing {}: {e}", overlord.key);
                        tracing::error!(overlord = %overlord.key, error = %e, "pulse: snapshot upsert failed");
                        errors.push(msg);
                    }
                }
            }
            Err(e) => {
                let msg = format!("Error fetching {}: {e}", overlord.key);
                tracing::error!(overlord = %overlord.key, error = %e, "pulse: news fetch failed");
                errors.push(msg);
            }
        }
    }

    // Recompute every overlord's cache only after all snapshots for the run
    // are in place. Cross-overlord order is irrelevant; each row is
    // independent.
    for overlord in &roster.overlords {
        if let Err(e) = recalculate_cache(pool, &overlord.key, today).await {
            let msg = format!("Error recalculating cache for {}: {e}", overlord.key);
            tracing::error!(overlord = %overlord.key, error = %e, "pulse: cache recompute failed");
            errors.push(msg);
        }
    }

    let status = if errors.is_empty() {
        RunStatus::Success
    } else {
        RunStatus::Partial
    };

    let summary = results
        .iter()
        .map(|r| format!("{}: {} articles", r.overlord, r.article_count))
        .collect::<Vec<_>>()
        .join(", ");
    let error_detail = if errors.is_empty() {
        None
    } else {
        Some(errors.join("; "))
    };

    if let Err(e) = insert_job_log(pool, status.as_str(), &summary, error_detail.as_deref()).await {
        tracing::error!(error = %e, "pulse: failed to write job log entry");
    }

    tracing::info!(
        status = status.as_str(),
        overlords = results.len(),
        errors = errors.len(),
        "pulse: run complete"
    );

    PulseRunOutcome {
        status,
        results,
        errors,
    }
}

async fn log_fatal(pool: &PgPool, message: &str) {
    if let Err(e) = insert_job_log(pool, "error", "", Some(message)).await {
        tracing::error!(error = %e, "pulse: failed to write fatal job log entry");
    }
}
