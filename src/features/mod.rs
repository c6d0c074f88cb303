//! # Features Module
//!
//! Self-contained feature areas of the planner bot.
//!
//! - **Version**: 1.2.0
//! - **Since**: 0.2.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.2.0: Add conflict advisories
//! - 1.1.0: Add event service on top of the store
//! - 1.0.0: Initial reminder scheduling feature

pub mod conflict;
pub mod events;
pub mod reminders;

pub use conflict::{Advisory, ConflictDetector};
pub use events::{EditOutcome, EventService, StatsPeriod};
pub use reminders::ReminderScheduler;
