//! # Events Feature
//!
//! Core-facing event operations the dialogue layer calls.
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.3.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.1.0: Route edits through typed EventEdit values
//! - 1.0.0: Initial create/done/delete/list service

use anyhow::Result;
use chrono::{Datelike, Duration, NaiveDate};
use log::info;
use std::sync::Arc;

use crate::core::{Clock, Event, EventEdit, EventLookup, EventStats, NewEvent, Repeat};
use crate::database::Database;
use crate::features::conflict::{Advisory, ConflictDetector};

/// Default horizon for upcoming-event listings
pub const DEFAULT_UPCOMING_DAYS: i64 = 7;

/// Outcome of an ownership-checked mutation
#[derive(Debug, Clone)]
pub enum EditOutcome {
    Updated(Event),
    NotFound,
    NotOwned,
}

/// Period selector for statistics reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatsPeriod {
    Week,
    Month,
    Year,
    All,
}

/// High-level event operations on top of the store
#[derive(Clone)]
pub struct EventService {
    db: Database,
    detector: ConflictDetector,
    clock: Arc<dyn Clock>,
}

impl EventService {
    pub fn new(db: Database, clock: Arc<dyn Clock>) -> Self {
        let detector = ConflictDetector::new(db.clone());
        EventService {
            db,
            detector,
            clock,
        }
    }

    /// Insert a new event and report scheduling advisories for its slot
    ///
    /// Advisories never block the insert; they are returned for the caller
    /// to surface.
    pub async fn create_event(&self, event: NewEvent) -> Result<(i64, Vec<Advisory>)> {
        let id = self.db.insert_event(&event).await?;
        info!("📝 Created event {id} ({}) for user {}", event.title, event.user_id);

        let advisories = self
            .detector
            .check(event.user_id, event.date, event.time, event.repeat, Some(id))
            .await?;
        Ok((id, advisories))
    }

    /// Apply one validated field edit to an event the user owns
    pub async fn edit_event(&self, id: i64, user_id: i64, edit: EventEdit) -> Result<EditOutcome> {
        let mut event = match self.db.get_event_for_user(id, user_id).await? {
            EventLookup::Found(event) => event,
            EventLookup::NotFound => return Ok(EditOutcome::NotFound),
            EventLookup::NotOwned => return Ok(EditOutcome::NotOwned),
        };

        edit.apply(&mut event);
        self.db.update_event(&event).await?;
        info!("✏️ Updated event {id} for user {user_id}");
        Ok(EditOutcome::Updated(event))
    }

    /// Mark an event the user owns as done
    ///
    /// `is_done` only moves false to true; marking a done event again is a
    /// no-op that still reports success.
    pub async fn mark_done(&self, id: i64, user_id: i64) -> Result<EditOutcome> {
        let mut event = match self.db.get_event_for_user(id, user_id).await? {
            EventLookup::Found(event) => event,
            EventLookup::NotFound => return Ok(EditOutcome::NotFound),
            EventLookup::NotOwned => return Ok(EditOutcome::NotOwned),
        };

        if !event.is_done {
            event.is_done = true;
            self.db.update_event(&event).await?;
            info!("✅ Completed event {id} for user {user_id}");
        }
        Ok(EditOutcome::Updated(event))
    }

    /// Delete an event the user owns; false when nothing matched
    pub async fn delete_event(&self, id: i64, user_id: i64) -> Result<bool> {
        let deleted = self.db.delete_event(id, user_id).await?;
        if deleted {
            info!("🗑️ Deleted event {id} for user {user_id}");
        }
        Ok(deleted)
    }

    /// Events from today through `days_ahead` days out, with optional filters
    pub async fn upcoming_events(
        &self,
        user_id: i64,
        days_ahead: Option<i64>,
        category: Option<&str>,
        tag: Option<&str>,
    ) -> Result<Vec<Event>> {
        let today = self.clock.now().date();
        let horizon = today + Duration::days(days_ahead.unwrap_or(DEFAULT_UPCOMING_DAYS));
        self.db
            .events_in_range(user_id, today, horizon, category, tag)
            .await
    }

    /// Aggregate event counts for a user over a period
    pub async fn stats(&self, user_id: i64, period: StatsPeriod) -> Result<EventStats> {
        let now = self.clock.now();
        let from = period_start(period, now.date());

        let events: Vec<_> = self
            .db
            .events_for_user(user_id)
            .await?
            .into_iter()
            .filter(|e| from.map_or(true, |from| e.date >= from))
            .collect();

        let mut stats = EventStats {
            total: events.len(),
            ..EventStats::default()
        };

        let mut categories = std::collections::BTreeMap::new();
        let mut repeats = std::collections::BTreeMap::new();

        for event in &events {
            if event.is_done {
                stats.done += 1;
            } else {
                // timeless events count as upcoming for the whole day
                let reference = event
                    .event_datetime()
                    .unwrap_or_else(|| event.date.and_time(now.time()));
                if reference >= now {
                    stats.upcoming += 1;
                } else {
                    stats.expired += 1;
                }
            }

            if let Some(category) = &event.category {
                *categories.entry(category.clone()).or_insert(0) += 1;
            }
            if event.repeat != Repeat::None {
                *repeats
                    .entry(event.repeat.as_str().to_string())
                    .or_insert(0) += 1;
            }
        }

        stats.categories = categories.into_iter().collect();
        stats.repeats = repeats.into_iter().collect();
        Ok(stats)
    }
}

/// First date included in a stats period, `None` for all time
fn period_start(period: StatsPeriod, today: NaiveDate) -> Option<NaiveDate> {
    match period {
        StatsPeriod::Week => {
            let days_from_monday = today.weekday().num_days_from_monday() as i64;
            Some(today - Duration::days(days_from_monday))
        }
        StatsPeriod::Month => today.with_day(1),
        StatsPeriod::Year => NaiveDate::from_ymd_opt(today.year(), 1, 1),
        StatsPeriod::All => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clock::FixedClock;
    use chrono::NaiveTime;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    async fn service_at(now: chrono::NaiveDateTime) -> (EventService, Database, i64) {
        let db = Database::new(":memory:").await.unwrap();
        let (user, _) = db.get_or_create_user(100, None, None, None).await.unwrap();
        let service = EventService::new(db.clone(), Arc::new(FixedClock(now)));
        (service, db, user.id)
    }

    #[tokio::test]
    async fn test_create_reports_advisories_but_inserts() {
        let (service, db, user_id) = service_at(date(2025, 6, 10).and_time(time(8, 0))).await;

        let mut first = NewEvent::new(user_id, "Dentist", date(2025, 6, 10));
        first.time = Some(time(14, 0));
        service.create_event(first).await.unwrap();

        let mut second = NewEvent::new(user_id, "Barber", date(2025, 6, 10));
        second.time = Some(time(14, 10));
        let (id, advisories) = service.create_event(second).await.unwrap();

        assert!(db.get_event(id).await.unwrap().is_some());
        assert_eq!(advisories.len(), 1);
    }

    #[tokio::test]
    async fn test_edit_respects_ownership() {
        let (service, db, user_id) = service_at(date(2025, 6, 10).and_time(time(8, 0))).await;
        let (other, _) = db.get_or_create_user(200, None, None, None).await.unwrap();
        let (id, _) = service
            .create_event(NewEvent::new(user_id, "Mine", date(2025, 6, 12)))
            .await
            .unwrap();

        let edit = EventEdit::parse_title("Taken").unwrap();
        match service.edit_event(id, other.id, edit).await.unwrap() {
            EditOutcome::NotOwned => {}
            other => panic!("expected NotOwned, got {other:?}"),
        }
        assert_eq!(db.get_event(id).await.unwrap().unwrap().title, "Mine");
    }

    #[tokio::test]
    async fn test_mark_done_is_monotonic() {
        let (service, db, user_id) = service_at(date(2025, 6, 10).and_time(time(8, 0))).await;
        let (id, _) = service
            .create_event(NewEvent::new(user_id, "Chore", date(2025, 6, 10)))
            .await
            .unwrap();

        service.mark_done(id, user_id).await.unwrap();
        service.mark_done(id, user_id).await.unwrap();
        assert!(db.get_event(id).await.unwrap().unwrap().is_done);
    }

    #[tokio::test]
    async fn test_upcoming_respects_horizon() {
        let (service, _db, user_id) = service_at(date(2025, 6, 10).and_time(time(8, 0))).await;
        service
            .create_event(NewEvent::new(user_id, "Soon", date(2025, 6, 12)))
            .await
            .unwrap();
        service
            .create_event(NewEvent::new(user_id, "Far", date(2025, 7, 1)))
            .await
            .unwrap();

        let events = service
            .upcoming_events(user_id, None, None, None)
            .await
            .unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].title, "Soon");
    }

    #[tokio::test]
    async fn test_stats_buckets() {
        let (service, _db, user_id) = service_at(date(2025, 6, 10).and_time(time(12, 0))).await;

        let mut past = NewEvent::new(user_id, "Past", date(2025, 6, 10));
        past.time = Some(time(9, 0));
        past.category = Some("work".to_string());
        service.create_event(past).await.unwrap();

        let mut future = NewEvent::new(user_id, "Future", date(2025, 6, 11));
        future.time = Some(time(9, 0));
        future.repeat = Repeat::Weekly;
        service.create_event(future).await.unwrap();

        let (done_id, _) = service
            .create_event(NewEvent::new(user_id, "Done", date(2025, 6, 9)))
            .await
            .unwrap();
        service.mark_done(done_id, user_id).await.unwrap();

        let stats = service.stats(user_id, StatsPeriod::All).await.unwrap();
        assert_eq!(stats.total, 3);
        assert_eq!(stats.done, 1);
        assert_eq!(stats.upcoming, 1);
        assert_eq!(stats.expired, 1);
        assert_eq!(stats.categories, vec![("work".to_string(), 1)]);
        assert_eq!(stats.repeats, vec![("weekly".to_string(), 1)]);
    }

    #[test]
    fn test_period_start() {
        // 2025-06-11 is a Wednesday
        assert_eq!(
            period_start(StatsPeriod::Week, date(2025, 6, 11)),
            Some(date(2025, 6, 9))
        );
        assert_eq!(
            period_start(StatsPeriod::Month, date(2025, 6, 11)),
            Some(date(2025, 6, 1))
        );
        assert_eq!(
            period_start(StatsPeriod::Year, date(2025, 6, 11)),
            Some(date(2025, 1, 1))
        );
        assert_eq!(period_start(StatsPeriod::All, date(2025, 6, 11)), None);
    }
}
