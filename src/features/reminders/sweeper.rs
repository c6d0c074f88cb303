//! Expired-event sweeper
//!
//! Runs at the start of every scheduler tick, before reminder evaluation,
//! so an event more than an hour past its start is completed rather than
//! reminded.

use anyhow::Result;
use chrono::{Duration, NaiveDateTime};
use log::{info, warn};

use crate::database::Database;

/// How far past its start an event may be before it is auto-completed
fn expiry_grace() -> Duration {
    Duration::hours(1)
}

/// Mark events more than an hour past their start as done
///
/// Returns the number of events completed. Events without a time are never
/// swept; they have no start instant to be past.
pub async fn sweep_expired(db: &Database, now: NaiveDateTime) -> Result<usize> {
    let candidates = db.sweepable_events(now.date()).await?;
    let mut swept = 0;

    for mut event in candidates {
        let Some(started_at) = event.event_datetime() else {
            continue;
        };
        if now - started_at <= expiry_grace() {
            continue;
        }

        event.is_done = true;
        // a failed update only skips this event; the rest still get swept
        if let Err(e) = db.update_event(&event).await {
            warn!("Failed to sweep event {}: {e:#}", event.id);
            continue;
        }
        info!("🧹 Auto-completed expired event {} ({})", event.id, event.title);
        swept += 1;
    }

    Ok(swept)
}
