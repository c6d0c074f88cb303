//! Environment-based configuration
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0

use anyhow::{Context, Result};

/// Default scheduler polling interval in seconds
pub const DEFAULT_INTERVAL_SECS: u64 = 10;

/// Runtime configuration loaded from the environment (and `.env`)
#[derive(Debug, Clone)]
pub struct Config {
    /// Telegram Bot API token (`TELEGRAM_BOT_TOKEN`)
    pub telegram_token: String,
    /// Path to the sqlite database file (`DATABASE_PATH`, default `planner.db`)
    pub database_path: String,
    /// Default log filter (`LOG_LEVEL`, default `info`)
    pub log_level: String,
    /// Scheduler polling interval (`SCHEDULER_INTERVAL_SECS`, default 10)
    pub scheduler_interval_secs: u64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let telegram_token = std::env::var("TELEGRAM_BOT_TOKEN")
            .context("TELEGRAM_BOT_TOKEN environment variable is required")?;

        let database_path =
            std::env::var("DATABASE_PATH").unwrap_or_else(|_| "planner.db".to_string());

        let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let scheduler_interval_secs = match std::env::var("SCHEDULER_INTERVAL_SECS") {
            Ok(raw) => raw
                .parse::<u64>()
                .context("SCHEDULER_INTERVAL_SECS must be a positive integer")?,
            Err(_) => DEFAULT_INTERVAL_SECS,
        };

        Ok(Config {
            telegram_token,
            database_path,
            log_level,
            scheduler_interval_secs,
        })
    }
}
