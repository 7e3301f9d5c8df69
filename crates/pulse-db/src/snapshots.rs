//! Database operations for the `pulse_snapshots` fact table.
//!
//! One row per (overlord, date). Rows are only ever written by the pulse
//! job; re-ingestion for the same day replaces count/score/headlines
//! wholesale, which is what keeps same-day re-runs idempotent.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A trimmed projection of one article, persisted inside a snapshot's
/// `top_headlines` JSONB list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Headline {
    pub title: String,
    pub source_name: String,
    pub url: String,
    pub published_at: String,
    pub description: String,
}

/// A row from the `pulse_snapshots` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SnapshotRow {
    pub id: i64,
    pub overlord: String,
    pub date: NaiveDate,
    pub article_count: i32,
    pub sentiment_score: f64,
    pub top_headlines: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One point of an overlord's daily series.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct DailyPoint {
    pub date: NaiveDate,
    pub article_count: i32,
    pub sentiment_score: f64,
}

/// One point of the all-overlords daily series.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AllHistoryPoint {
    pub overlord: String,
    pub date: NaiveDate,
    pub article_count: i32,
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Insert or replace the snapshot for one (overlord, date).
///
/// Conflicts on `(overlord, date)` replace `article_count`,
/// `sentiment_score`, `top_headlines`, and `updated_at` in place —
/// last-write-wins, never additive.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn upsert_snapshot(
    pool: &PgPool,
    overlord: &str,
    date: NaiveDate,
    article_count: i32,
    sentiment_score: f64,
    headlines: &[Headline],
) -> Result<(), DbError> {
    sqlx::query(
        "INSERT INTO pulse_snapshots \
             (overlord, date, article_count, sentiment_score, top_headlines) \
         VALUES ($1, $2, $3, $4, $5) \
         ON CONFLICT (overlord, date) DO UPDATE SET \
             article_count   = EXCLUDED.article_count, \
             sentiment_score = EXCLUDED.sentiment_score, \
             top_headlines   = EXCLUDED.top_headlines, \
             updated_at      = NOW()",
    )
    .bind(overlord)
    .bind(date)
    .bind(article_count)
    .bind(sentiment_score)
    .bind(sqlx::types::Json(headlines))
    .execute(pool)
    .await?;

    Ok(())
}

/// Fetch the snapshot for one (overlord, date), or `None` if absent.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_snapshot(
    pool: &PgPool,
    overlord: &str,
    date: NaiveDate,
) -> Result<Option<SnapshotRow>, DbError> {
    let row = sqlx::query_as::<_, SnapshotRow>(
        "SELECT id, overlord, date, article_count, sentiment_score, top_headlines, \
                created_at, updated_at \
         FROM pulse_snapshots \
         WHERE overlord = $1 AND date = $2",
    )
    .bind(overlord)
    .bind(date)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Ascending-by-date series of (date, count, score) for the trailing `days`
/// days from `today`, inclusive.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_daily_history(
    pool: &PgPool,
    overlord: &str,
    days: i32,
    today: NaiveDate,
) -> Result<Vec<DailyPoint>, DbError> {
    let rows = sqlx::query_as::<_, DailyPoint>(
        "SELECT date, article_count, sentiment_score \
         FROM pulse_snapshots \
         WHERE overlord = $1 AND date >= $2::date - $3 \
         ORDER BY date ASC",
    )
    .bind(overlord)
    .bind(today)
    .bind(days)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Same trailing series for all overlords at once, for comparative charting.
///
/// Rows are ordered by date ascending; callers group by overlord.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_all_daily_history(
    pool: &PgPool,
    days: i32,
    today: NaiveDate,
) -> Result<Vec<AllHistoryPoint>, DbError> {
    let rows = sqlx::query_as::<_, AllHistoryPoint>(
        "SELECT overlord, date, article_count \
         FROM pulse_snapshots \
         WHERE date >= $1::date - $2 \
         ORDER BY date ASC, overlord ASC",
    )
    .bind(today)
    .bind(days)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
