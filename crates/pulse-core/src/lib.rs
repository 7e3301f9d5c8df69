//! Shared configuration and pure domain functions for the pulse pipeline.
//!
//! Holds the overlord roster (static tracking configuration), environment
//! configuration for the binaries, and the trend/sentiment bucketing
//! functions used by the cache recompute and the scorer.

use thiserror::Error;

pub mod app_config;
pub mod config;
pub mod labels;
pub mod overlords;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use labels::{round1, round2, SentimentLabel, TrendDirection};
pub use overlords::{load_overlords, OverlordConfig, OverlordRoster};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
    #[error("failed to read overlords file at {path}")]
    OverlordsFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse overlords file")]
    OverlordsFileParse(#[from] serde_yaml::Error),
    #[error("invalid overlords configuration: {0}")]
    Validation(String),
}
