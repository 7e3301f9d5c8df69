//! Background job scheduler.
//!
//! Initialises a [`JobScheduler`] at server startup and registers the daily
//! pulse job. The HTTP cron endpoint remains available for external
//! schedulers and manual triggering; both drive the same engine entry
//! point.

use std::sync::Arc;

use sqlx::PgPool;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

use pulse_core::{AppConfig, OverlordRoster};

/// Builds and starts the background job scheduler.
///
/// Returns the running [`JobScheduler`] handle, which must be kept alive
/// for the lifetime of the process — dropping it shuts down all jobs.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if the scheduler cannot be initialised,
/// the job cannot be registered (e.g. an invalid cron expression), or the
/// scheduler fails to start.
pub async fn build_scheduler(
    pool: PgPool,
    roster: Arc<OverlordRoster>,
    config: Arc<AppConfig>,
) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;

    register_pulse_job(&scheduler, pool, roster, config).await?;

    scheduler.start().await?;
    Ok(scheduler)
}

/// Register the daily pulse ingestion job.
///
/// The schedule comes from `PULSE_CRON_SCHEDULE` (default 06:00 UTC daily).
/// The scheduler fires one invocation at a time, which is the only overlap
/// protection the job needs.
async fn register_pulse_job(
    scheduler: &JobScheduler,
    pool: PgPool,
    roster: Arc<OverlordRoster>,
    config: Arc<AppConfig>,
) -> Result<(), JobSchedulerError> {
    let pool = Arc::new(pool);
    let schedule = config.cron_schedule.clone();

    let job = Job::new_async(schedule.as_str(), move |_uuid, _lock| {
        let pool = Arc::clone(&pool);
        let roster = Arc::clone(&roster);
        let config = Arc::clone(&config);

        Box::pin(async move {
            tracing::info!("scheduler: starting daily pulse run");
            match pulse_engine::run_scheduled_pulse(&pool, &roster, &config).await {
                Ok(outcome) => {
                    tracing::info!(
                        status = outcome.status.as_str(),
                        overlords = outcome.results.len(),
                        errors = outcome.errors.len(),
                        "scheduler: daily pulse run complete"
                    );
                }
                Err(e) => {
                    tracing::error!(error = %e, "scheduler: daily pulse run failed to start");
                }
            }
        })
    })?;

    scheduler.add(job).await?;
    Ok(())
}
