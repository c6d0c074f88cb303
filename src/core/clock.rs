//! Injectable wall clock
//!
//! The scheduler never calls `Local::now()` directly; every due/sweep
//! decision flows from a `Clock` handle so tests can pin the time.

use chrono::{Local, NaiveDateTime};

/// Source of "now" for all scheduling decisions
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

/// Production clock: local time in the deployment's fixed calendar zone
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Clock pinned to a fixed instant, for tests
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}
