//! Append-only audit trail for pulse job runs.
//!
//! Rows are inserted once per run and never updated or deleted.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::DbError;

/// A row from the `pulse_job_log` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct JobLogRow {
    pub id: i64,
    pub ran_at: DateTime<Utc>,
    pub status: String,
    pub summary: String,
    pub error: Option<String>,
}

/// Append one run outcome and return its generated id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn insert_job_log(
    pool: &PgPool,
    status: &str,
    summary: &str,
    error: Option<&str>,
) -> Result<i64, DbError> {
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO pulse_job_log (status, summary, error) \
         VALUES ($1, $2, $3) \
         RETURNING id",
    )
    .bind(status)
    .bind(summary)
    .bind(error)
    .fetch_one(pool)
    .await?;

    Ok(id)
}

/// The most recent `limit` run outcomes, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_recent_job_logs(pool: &PgPool, limit: i64) -> Result<Vec<JobLogRow>, DbError> {
    let rows = sqlx::query_as::<_, JobLogRow>(
        "SELECT id, ran_at, status, summary, error \
         FROM pulse_job_log \
         ORDER BY id DESC \
         LIMIT $1",
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
