//! Polling reminder scheduler
//!
//! One background task owns the whole reminder pipeline: every tick it
//! sweeps expired events, evaluates which reminders are due, delivers them,
//! and expands recurring events into their next occurrence.
//!
//! Acknowledgement ordering is deliberate: an event is only marked
//! `notified` after its message was delivered, so a failed delivery is
//! retried on the next tick rather than silently dropped.

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use log::{debug, error, info, warn};
use std::sync::Arc;
use std::time::Duration;

use crate::core::{Clock, Event, NewEvent, Repeat};
use crate::database::Database;
use crate::features::reminders::recurrence::next_occurrence;
use crate::features::reminders::sweeper::sweep_expired;
use crate::notifier::{render_reminder, Notifier};

/// Background scheduler polling the event store for due reminders
pub struct ReminderScheduler {
    db: Database,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    interval: Duration,
}

impl ReminderScheduler {
    pub fn new(
        db: Database,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
        interval: Duration,
    ) -> Self {
        ReminderScheduler {
            db,
            notifier,
            clock,
            interval,
        }
    }

    /// Run the polling loop forever
    ///
    /// A failed tick is logged and the loop keeps going; the scheduler
    /// never dies because one pass hit a storage or delivery error.
    pub async fn run(self) {
        info!(
            "⏰ Reminder scheduler started (interval: {}s)",
            self.interval.as_secs()
        );

        loop {
            if let Err(e) = self.tick().await {
                error!("Scheduler tick failed: {e:#}");
            }
            tokio::time::sleep(self.interval).await;
        }
    }

    /// One scheduler pass: sweep, then evaluate and dispatch due reminders
    pub async fn tick(&self) -> Result<usize> {
        let now = self.clock.now();

        let swept = sweep_expired(&self.db, now).await?;
        if swept > 0 {
            debug!("Sweeper completed {swept} expired event(s)");
        }

        let candidates = self.db.reminder_candidates().await?;
        let mut delivered = 0;

        for event in candidates {
            if !is_due(&event, now) {
                continue;
            }
            // one broken event must not starve the rest of the batch
            match self.process_due_event(&event).await {
                Ok(()) => delivered += 1,
                Err(e) => error!("Failed to process reminder for event {}: {e:#}", event.id),
            }
        }

        Ok(delivered)
    }

    /// Deliver one due reminder, acknowledge it, and expand its recurrence
    async fn process_due_event(&self, event: &Event) -> Result<()> {
        let user = self
            .db
            .get_user(event.user_id)
            .await?
            .with_context(|| format!("event {} references missing user {}", event.id, event.user_id))?;

        let text = render_reminder(event);
        self.notifier
            .send(user.telegram_id, &text)
            .await
            .with_context(|| format!("delivery failed for event {}", event.id))?;

        // Re-fetch after the await: the user may have deleted the event
        // while the message was in flight.
        let Some(mut current) = self.db.get_event(event.id).await? else {
            warn!("Event {} vanished mid-delivery; skipping acknowledgement", event.id);
            return Ok(());
        };

        current.notified = true;
        self.db.update_event(&current).await?;
        info!("🔔 Reminder sent for event {} ({})", current.id, current.title);

        if current.repeat != Repeat::None {
            self.expand_recurrence(&current).await?;
        }

        Ok(())
    }

    /// Insert the next occurrence of a recurring event, exactly once
    async fn expand_recurrence(&self, event: &Event) -> Result<()> {
        let Some(next_date) = next_occurrence(event.repeat, event.date) else {
            return Ok(());
        };

        if self
            .db
            .clone_exists(event.user_id, &event.title, next_date)
            .await?
        {
            debug!(
                "Next occurrence of event {} on {next_date} already exists",
                event.id
            );
            return Ok(());
        }

        let clone = NewEvent {
            user_id: event.user_id,
            title: event.title.clone(),
            description: event.description.clone(),
            date: next_date,
            time: event.time,
            remind_before: event.remind_before,
            category: event.category.clone(),
            tag: event.tag.clone(),
            repeat: event.repeat,
        };
        let clone_id = self.db.insert_event(&clone).await?;
        info!(
            "🔁 Scheduled next occurrence of {} on {next_date} (event {clone_id})",
            event.title
        );

        Ok(())
    }
}

/// Whether an event's reminder instant has been reached
fn is_due(event: &Event, now: NaiveDateTime) -> bool {
    match event.notify_at() {
        Some(notify_at) => notify_at <= now,
        None => false,
    }
}
