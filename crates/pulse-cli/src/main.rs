use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "pulse-cli")]
#[command(about = "Overpulse command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run one pulse ingestion pass against the configured database.
    Run,
    /// Print cache rows and recent job log entries.
    Status {
        /// Number of job log entries to show.
        #[arg(long, default_value_t = 10)]
        jobs: i64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = pulse_core::load_app_config()?;
    let pool_config = pulse_db::PoolConfig::from_app_config(&config);
    let pool = pulse_db::connect_pool(&config.database_url, pool_config).await?;
    pulse_db::run_migrations(&pool).await?;

    match cli.command {
        Commands::Run => {
            let roster = pulse_core::load_overlords(&config.overlords_path)?;
            let outcome = pulse_engine::run_scheduled_pulse(&pool, &roster, &config).await?;

            println!("status: {}", outcome.status.as_str());
            for result in &outcome.results {
                println!(
                    "  {}: {} articles (score {:.2}, {} headlines kept)",
                    result.overlord,
                    result.article_count,
                    result.sentiment_score,
                    result.headline_count
                );
            }
            for error in &outcome.errors {
                println!("  error: {error}");
            }
        }
        Commands::Status { jobs } => {
            let rows = pulse_db::list_cache_rows(&pool).await?;
            if rows.is_empty() {
                println!("no cache rows yet — run `pulse-cli run` first");
            }
            for row in &rows {
                println!(
                    "{:<12} 7d={:<5} 30d={:<5} trend={:>6.1}% {:<8} sentiment={:>5.2} ({})",
                    row.overlord,
                    row.pulse_7day,
                    row.pulse_30day,
                    row.trend_percent,
                    row.trend_direction,
                    row.avg_sentiment_7day,
                    row.sentiment_label
                );
            }

            let logs = pulse_db::list_recent_job_logs(&pool, jobs).await?;
            if !logs.is_empty() {
                println!("\nrecent runs:");
            }
            for log in &logs {
                let error = log.error.as_deref().unwrap_or("-");
                println!(
                    "  #{} {} {} | {} | {}",
                    log.id, log.ran_at, log.status, log.summary, error
                );
            }
        }
    }

    Ok(())
}
