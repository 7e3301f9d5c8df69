use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub overlords_path: PathBuf,
    /// News source credential. Optional at load time so read-only surfaces
    /// can start without it; a pulse run without it is a fatal run error.
    pub news_api_key: Option<String>,
    /// Override for the news API endpoint; unset means production.
    pub news_base_url: Option<String>,
    pub news_timeout_secs: u64,
    /// Delay between consecutive news API calls within one run. Rate-limit
    /// protection, not an optimization — see the job orchestrator.
    pub inter_request_delay_ms: u64,
    /// Six-field cron expression for the built-in daily scheduler.
    pub cron_schedule: String,
    pub admin_secret: Option<String>,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("overlords_path", &self.overlords_path)
            .field("database_url", &"[redacted]")
            .field(
                "news_api_key",
                &self.news_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("news_base_url", &self.news_base_url)
            .field("news_timeout_secs", &self.news_timeout_secs)
            .field("inter_request_delay_ms", &self.inter_request_delay_ms)
            .field("cron_schedule", &self.cron_schedule)
            .field(
                "admin_secret",
                &self.admin_secret.as_ref().map(|_| "[redacted]"),
            )
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .finish()
    }
}
