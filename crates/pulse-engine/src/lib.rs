//! The pulse ingestion engine.
//!
//! Drives one daily run: for each configured overlord, fetch news for the
//! trailing day, drop junk articles, score sentiment by keyword counting,
//! and upsert the day's snapshot; then recompute every overlord's aggregate
//! cache and append one job-log entry. Per-overlord failures are recorded
//! and never abort the run.

pub mod filter;
pub mod headlines;
pub mod job;
pub mod scorer;

pub use filter::{filter_articles, BLOCKED_DOMAINS};
pub use headlines::project_headlines;
pub use job::{run_daily_pulse, run_scheduled_pulse, JobError, OverlordRunResult, PulseRunOutcome, RunStatus};
pub use scorer::calculate_sentiment;
