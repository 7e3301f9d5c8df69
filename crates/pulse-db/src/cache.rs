//! The `pulse_cache` table: derived rolling statistics per overlord.
//!
//! The cache is a materialized view over `pulse_snapshots` — always fully
//! re-derivable, overwritten wholesale by [`recalculate_cache`], and never
//! written to by anything else. Readers may observe a row from before the
//! current run's recompute; each upsert is atomic, so they never observe a
//! torn row.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;

use pulse_core::{round1, round2, SentimentLabel, TrendDirection};

use crate::DbError;

/// A row from the `pulse_cache` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CacheRow {
    pub overlord: String,
    pub pulse_7day: i32,
    pub pulse_30day: i32,
    pub trend_percent: f64,
    pub trend_direction: String,
    pub avg_sentiment_7day: f64,
    pub sentiment_label: String,
    pub top_headlines: serde_json::Value,
    pub peak_day_30d: Option<NaiveDate>,
    pub peak_count_30d: i32,
    pub updated_at: DateTime<Utc>,
}

/// Recompute and store the cache row for one overlord, anchored on `today`.
///
/// - `pulse_7day` / `pulse_30day`: sums of `article_count` over the trailing
///   windows `[today-7, today]` and `[today-30, today]`.
/// - `trend_percent`: week-over-week change of `pulse_7day` against the
///   half-open prior week `[today-14, today-7)`; 100 when the prior week is
///   empty but this week is not, 0 when both are. Rounded to 1 decimal.
/// - `avg_sentiment_7day`: mean score over the 7-day window, 0.0 with no
///   rows. Rounded to 2 decimals.
/// - `top_headlines`: copied from the most recent snapshot, `[]` if none.
/// - `peak_day_30d` / `peak_count_30d`: max-count day in the 30-day window;
///   ties break to the earliest date.
///
/// Deterministic and idempotent: with no new snapshots, a second call
/// produces an identical row (modulo `updated_at`).
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any query fails.
pub async fn recalculate_cache(
    pool: &PgPool,
    overlord: &str,
    today: NaiveDate,
) -> Result<(), DbError> {
    let pulse_7day = window_sum(pool, overlord, today, 7).await?;
    let pulse_30day = window_sum(pool, overlord, today, 30).await?;

    let last_week: i64 = sqlx::query_scalar(
        "SELECT COALESCE(SUM(article_count), 0) \
         FROM pulse_snapshots \
         WHERE overlord = $1 AND date >= $2::date - 14 AND date < $2::date - 7",
    )
    .bind(overlord)
    .bind(today)
    .fetch_one(pool)
    .await?;

    #[allow(clippy::cast_precision_loss)]
    let trend_percent = if last_week == 0 {
        if pulse_7day > 0 {
            100.0
        } else {
            0.0
        }
    } else {
        round1((pulse_7day - last_week) as f64 / last_week as f64 * 100.0)
    };
    let trend_direction = TrendDirection::from_percent(trend_percent);

    let avg_sentiment: Option<f64> = sqlx::query_scalar(
        "SELECT AVG(sentiment_score) \
         FROM pulse_snapshots \
         WHERE overlord = $1 AND date >= $2::date - 7",
    )
    .bind(overlord)
    .bind(today)
    .fetch_one(pool)
    .await?;
    let avg_sentiment_7day = round2(avg_sentiment.unwrap_or(0.0));
    let sentiment_label = SentimentLabel::from_score(avg_sentiment_7day);

    let top_headlines: serde_json::Value = sqlx::query_scalar(
        "SELECT top_headlines FROM pulse_snapshots \
         WHERE overlord = $1 \
         ORDER BY date DESC LIMIT 1",
    )
    .bind(overlord)
    .fetch_optional(pool)
    .await?
    .unwrap_or_else(|| serde_json::Value::Array(vec![]));

    let peak: Option<(NaiveDate, i32)> = sqlx::query_as(
        "SELECT date, article_count FROM pulse_snapshots \
         WHERE overlord = $1 AND date >= $2::date - 30 \
         ORDER BY article_count DESC, date ASC LIMIT 1",
    )
    .bind(overlord)
    .bind(today)
    .fetch_optional(pool)
    .await?;
    let (peak_day_30d, peak_count_30d) = match peak {
        Some((date, count)) => (Some(date), count),
        None => (None, 0),
    };

    sqlx::query(
        "INSERT INTO pulse_cache \
             (overlord, pulse_7day, pulse_30day, trend_percent, trend_direction, \
              avg_sentiment_7day, sentiment_label, top_headlines, \
              peak_day_30d, peak_count_30d, updated_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, NOW()) \
         ON CONFLICT (overlord) DO UPDATE SET \
             pulse_7day         = EXCLUDED.pulse_7day, \
             pulse_30day        = EXCLUDED.pulse_30day, \
             trend_percent      = EXCLUDED.trend_percent, \
             trend_direction    = EXCLUDED.trend_direction, \
             avg_sentiment_7day = EXCLUDED.avg_sentiment_7day, \
             sentiment_label    = EXCLUDED.sentiment_label, \
             top_headlines      = EXCLUDED.top_headlines, \
             peak_day_30d       = EXCLUDED.peak_day_30d, \
             peak_count_30d     = EXCLUDED.peak_count_30d, \
             updated_at         = NOW()",
    )
    .bind(overlord)
    .bind(clamp_count(pulse_7day))
    .bind(clamp_count(pulse_30day))
    .bind(trend_percent)
    .bind(trend_direction.as_str())
    .bind(avg_sentiment_7day)
    .bind(sentiment_label.as_str())
    .bind(top_headlines)
    .bind(peak_day_30d)
    .bind(peak_count_30d)
    .execute(pool)
    .await?;

    Ok(())
}

/// Fetch one overlord's cache row, or `None` before its first recompute.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_cache_row(pool: &PgPool, overlord: &str) -> Result<Option<CacheRow>, DbError> {
    let row = sqlx::query_as::<_, CacheRow>(
        "SELECT overlord, pulse_7day, pulse_30day, trend_percent, trend_direction, \
                avg_sentiment_7day, sentiment_label, top_headlines, \
                peak_day_30d, peak_count_30d, updated_at \
         FROM pulse_cache \
         WHERE overlord = $1",
    )
    .bind(overlord)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// All cache rows, hottest first; key is the deterministic tie-break.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_cache_rows(pool: &PgPool) -> Result<Vec<CacheRow>, DbError> {
    let rows = sqlx::query_as::<_, CacheRow>(
        "SELECT overlord, pulse_7day, pulse_30day, trend_percent, trend_direction, \
                avg_sentiment_7day, sentiment_label, top_headlines, \
                peak_day_30d, peak_count_30d, updated_at \
         FROM pulse_cache \
         ORDER BY pulse_7day DESC, overlord ASC",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

async fn window_sum(
    pool: &PgPool,
    overlord: &str,
    today: NaiveDate,
    days: i32,
) -> Result<i64, DbError> {
    let total: i64 = sqlx::query_scalar(
        "SELECT COALESCE(SUM(article_count), 0) \
         FROM pulse_snapshots \
         WHERE overlord = $1 AND date >= $2::date - $3",
    )
    .bind(overlord)
    .bind(today)
    .bind(days)
    .fetch_one(pool)
    .await?;

    Ok(total)
}

fn clamp_count(total: i64) -> i32 {
    i32::try_from(total).unwrap_or(i32::MAX)
}
