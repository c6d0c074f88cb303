//! Scheduling-conflict detection
//!
//! Checks run synchronously when an event is created, never on the polling
//! loop. Every result is advisory: the caller decides whether to go ahead,
//! nothing here blocks creation.

use anyhow::Result;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::core::{Repeat, TIME_FORMAT};
use crate::database::Database;

/// Half-width of the overlap window
const OVERLAP_WINDOW_MINUTES: i64 = 15;

/// Day with at least this many events triggers a busy-day advisory
const BUSY_DAY_THRESHOLD: usize = 5;

/// One advisory finding about a candidate event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advisory {
    /// Another event starts within 15 minutes of the candidate
    Overlap { title: String, time: NaiveTime },
    /// The day already holds `count` events
    BusyDay { count: usize },
    /// A recurring event with the same time and repeat kind already exists
    DuplicateRecurring { title: String },
}

impl Advisory {
    /// Human-readable advisory line
    pub fn message(&self) -> String {
        match self {
            Advisory::Overlap { title, time } => format!(
                "⚠️ Close to \"{title}\" at {}",
                time.format(TIME_FORMAT)
            ),
            Advisory::BusyDay { count } => {
                format!("📅 Busy day: {count} events already scheduled")
            }
            Advisory::DuplicateRecurring { title } => {
                format!("🔁 Looks like a duplicate of recurring \"{title}\"")
            }
        }
    }
}

/// Whether two start instants are within the overlap window
///
/// Strict on both ends: identical instants do not conflict (that case is
/// covered by the duplicate check), and exactly 15 minutes apart is fine.
pub fn is_conflicting(candidate: NaiveDateTime, other: NaiveDateTime) -> bool {
    let delta = (candidate - other).num_seconds().abs();
    delta > 0 && delta < OVERLAP_WINDOW_MINUTES * 60
}

/// Advisory checks against a user's existing events
#[derive(Clone)]
pub struct ConflictDetector {
    db: Database,
}

impl ConflictDetector {
    pub fn new(db: Database) -> Self {
        ConflictDetector { db }
    }

    /// Collect advisories for a candidate `(date, time, repeat)` slot
    ///
    /// `exclude_id` skips a specific event row, so editing an event does not
    /// report the event as conflicting with itself.
    pub async fn check(
        &self,
        user_id: i64,
        date: NaiveDate,
        time: Option<NaiveTime>,
        repeat: Repeat,
        exclude_id: Option<i64>,
    ) -> Result<Vec<Advisory>> {
        let same_day: Vec<_> = self
            .db
            .events_on_date(user_id, date)
            .await?
            .into_iter()
            .filter(|e| Some(e.id) != exclude_id)
            .collect();

        let mut advisories = Vec::new();

        if let Some(time) = time {
            let candidate_dt = date.and_time(time);
            for event in &same_day {
                let Some(other_dt) = event.event_datetime() else {
                    continue;
                };
                if is_conflicting(candidate_dt, other_dt) {
                    advisories.push(Advisory::Overlap {
                        title: event.title.clone(),
                        time: other_dt.time(),
                    });
                }
            }

            if repeat != Repeat::None {
                for event in &same_day {
                    if event.repeat == repeat && event.time == Some(time) {
                        advisories.push(Advisory::DuplicateRecurring {
                            title: event.title.clone(),
                        });
                    }
                }
            }
        }

        if same_day.len() >= BUSY_DAY_THRESHOLD {
            advisories.push(Advisory::BusyDay {
                count: same_day.len(),
            });
        }

        Ok(advisories)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::NewEvent;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_fourteen_minutes_conflicts() {
        let base = date(2025, 6, 10).and_time(time(14, 0));
        assert!(is_conflicting(base, date(2025, 6, 10).and_time(time(14, 14))));
        assert!(is_conflicting(base, date(2025, 6, 10).and_time(time(13, 46))));
    }

    #[test]
    fn test_fifteen_minutes_does_not_conflict() {
        let base = date(2025, 6, 10).and_time(time(14, 0));
        assert!(!is_conflicting(base, date(2025, 6, 10).and_time(time(14, 15))));
        assert!(!is_conflicting(base, date(2025, 6, 10).and_time(time(13, 45))));
    }

    #[test]
    fn test_identical_instant_does_not_conflict() {
        let base = date(2025, 6, 10).and_time(time(14, 0));
        assert!(!is_conflicting(base, base));
    }

    async fn seeded_db() -> (Database, i64) {
        let db = Database::new(":memory:").await.unwrap();
        let (user, _) = db.get_or_create_user(100, None, None, None).await.unwrap();
        (db, user.id)
    }

    async fn insert_at(db: &Database, user_id: i64, title: &str, at: NaiveTime) -> i64 {
        let mut event = NewEvent::new(user_id, title, date(2025, 6, 10));
        event.time = Some(at);
        db.insert_event(&event).await.unwrap()
    }

    #[tokio::test]
    async fn test_check_reports_overlap() {
        let (db, user_id) = seeded_db().await;
        insert_at(&db, user_id, "Dentist", time(14, 0)).await;

        let detector = ConflictDetector::new(db);
        let advisories = detector
            .check(user_id, date(2025, 6, 10), Some(time(14, 10)), Repeat::None, None)
            .await
            .unwrap();
        assert_eq!(
            advisories,
            vec![Advisory::Overlap {
                title: "Dentist".to_string(),
                time: time(14, 0),
            }]
        );
    }

    #[tokio::test]
    async fn test_check_excludes_event_being_edited() {
        let (db, user_id) = seeded_db().await;
        let id = insert_at(&db, user_id, "Dentist", time(14, 0)).await;

        let detector = ConflictDetector::new(db);
        let advisories = detector
            .check(
                user_id,
                date(2025, 6, 10),
                Some(time(14, 5)),
                Repeat::None,
                Some(id),
            )
            .await
            .unwrap();
        assert!(advisories.is_empty());
    }

    #[tokio::test]
    async fn test_busy_day_advisory() {
        let (db, user_id) = seeded_db().await;
        for i in 0..5u32 {
            insert_at(&db, user_id, &format!("Meeting {i}"), time(8 + i, 0)).await;
        }

        let detector = ConflictDetector::new(db);
        let advisories = detector
            .check(user_id, date(2025, 6, 10), None, Repeat::None, None)
            .await
            .unwrap();
        assert_eq!(advisories, vec![Advisory::BusyDay { count: 5 }]);
    }

    #[tokio::test]
    async fn test_duplicate_recurring_advisory() {
        let (db, user_id) = seeded_db().await;
        let mut event = NewEvent::new(user_id, "Standup", date(2025, 6, 10));
        event.time = Some(time(9, 0));
        event.repeat = Repeat::Daily;
        db.insert_event(&event).await.unwrap();

        let detector = ConflictDetector::new(db);
        let advisories = detector
            .check(user_id, date(2025, 6, 10), Some(time(9, 0)), Repeat::Daily, None)
            .await
            .unwrap();
        assert!(advisories.contains(&Advisory::DuplicateRecurring {
            title: "Standup".to_string(),
        }));
    }
}
