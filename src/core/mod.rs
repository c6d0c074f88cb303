//! # Core Module
//!
//! Core domain types, configuration, and clock abstraction for the planner bot.
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.2.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.1.0: Add clock module so scheduler decisions are testable against a fixed time
//! - 1.0.0: Initial creation with config and event model

pub mod clock;
pub mod config;
pub mod event;
pub mod response;

// Re-export commonly used items
pub use clock::{Clock, SystemClock};
pub use config::Config;
pub use event::{
    Event, EventEdit, EventLookup, EventStats, NewEvent, Repeat, User, DATE_FORMAT, TIME_FORMAT,
};
pub use response::{truncate_for_message, MESSAGE_LIMIT};
