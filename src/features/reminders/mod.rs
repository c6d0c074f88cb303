//! # Reminders Feature
//!
//! Background reminder delivery and recurrence expansion.
//!
//! - **Version**: 1.2.0
//! - **Since**: 0.1.0
//! - **Toggleable**: true
//!
//! ## Changelog
//! - 1.2.0: Split recurrence arithmetic into its own module
//! - 1.1.0: Sweep expired events before evaluating reminders
//! - 1.0.0: Initial polling scheduler

pub mod recurrence;
pub mod scheduler;
pub mod sweeper;

pub use recurrence::{next_monthly, next_occurrence, next_yearly};
pub use scheduler::ReminderScheduler;
pub use sweeper::sweep_expired;
