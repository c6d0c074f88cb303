use anyhow::Result;
use dotenvy::dotenv;
use log::info;
use std::sync::Arc;
use std::time::Duration;

use planner::core::{Config, SystemClock};
use planner::database::Database;
use planner::features::ReminderScheduler;
use planner::notifier::TelegramNotifier;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    let config = Config::from_env()?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .init();

    info!("Starting Planner Bot...");

    let database = Database::new(&config.database_path).await?;
    let notifier = Arc::new(TelegramNotifier::new(&config.telegram_token)?);

    let scheduler = ReminderScheduler::new(
        database,
        notifier,
        Arc::new(SystemClock),
        Duration::from_secs(config.scheduler_interval_secs),
    );
    tokio::spawn(async move {
        scheduler.run().await;
    });

    info!("Bot configured successfully. Press Ctrl-C to stop.");
    tokio::signal::ctrl_c().await?;
    info!("Shutting down");

    Ok(())
}
