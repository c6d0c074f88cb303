// Core layer - shared domain types, configuration, clock
pub mod core;

// Features layer - all feature modules
pub mod features;

// Infrastructure
pub mod database;

// Delivery boundary - Telegram Bot API client
pub mod notifier;

// Re-export core items for convenience
pub use core::{Clock, Config, SystemClock};

// Re-export feature items
pub use features::{
    // Conflict detection
    Advisory, ConflictDetector,
    // Event CRUD surface for the dialogue layer
    EditOutcome, EventService, StatsPeriod,
    // Reminders
    ReminderScheduler,
};

// Re-export infrastructure
pub use database::Database;
pub use notifier::{Notifier, TelegramNotifier};
