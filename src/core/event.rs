//! Event and user domain model
//!
//! - **Version**: 1.2.0
//! - **Since**: 0.2.0
//!
//! ## Changelog
//! - 1.2.0: Replace stringly-typed edit dispatch with the EventEdit variants
//! - 1.1.0: Add EventLookup for ownership-aware store lookups
//! - 1.0.0: Initial event/user model

use anyhow::{anyhow, bail, Result};
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

/// User-facing date format (e.g. `31.12.2025`)
pub const DATE_FORMAT: &str = "%d.%m.%Y";
/// User-facing time format (e.g. `14:30`)
pub const TIME_FORMAT: &str = "%H:%M";

/// How an event repeats after its reminder fires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Repeat {
    None,
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Repeat {
    /// String representation used for database storage
    pub fn as_str(&self) -> &'static str {
        match self {
            Repeat::None => "none",
            Repeat::Daily => "daily",
            Repeat::Weekly => "weekly",
            Repeat::Monthly => "monthly",
            Repeat::Yearly => "yearly",
        }
    }

    /// Parse a stored or user-entered repeat kind
    pub fn parse(value: &str) -> Result<Self> {
        match value.trim().to_lowercase().as_str() {
            "none" => Ok(Repeat::None),
            "daily" => Ok(Repeat::Daily),
            "weekly" => Ok(Repeat::Weekly),
            "monthly" => Ok(Repeat::Monthly),
            "yearly" => Ok(Repeat::Yearly),
            other => Err(anyhow!("invalid repeat kind: {other}")),
        }
    }
}

/// A registered bot user
#[derive(Debug, Clone)]
pub struct User {
    pub id: i64,
    /// Telegram chat id reminders are delivered to
    pub telegram_id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub created_at: NaiveDateTime,
}

/// A calendar event owned by exactly one user
#[derive(Debug, Clone)]
pub struct Event {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub date: NaiveDate,
    /// Events without a time are never selected for reminders
    pub time: Option<NaiveTime>,
    pub created_at: NaiveDateTime,
    pub category: Option<String>,
    pub tag: Option<String>,
    /// Monotonic: once true it is never reset
    pub is_done: bool,
    /// Minutes before the event to remind; 0 disables reminding
    pub remind_before: i64,
    pub repeat: Repeat,
    /// Monotonic per row; each recurrence clone starts false
    pub notified: bool,
}

impl Event {
    /// Combined date+time of the event, if a time is set
    pub fn event_datetime(&self) -> Option<NaiveDateTime> {
        self.time.map(|t| self.date.and_time(t))
    }

    /// Timestamp at which the reminder becomes due, if remindable
    pub fn notify_at(&self) -> Option<NaiveDateTime> {
        if self.remind_before <= 0 {
            return None;
        }
        self.event_datetime()
            .map(|dt| dt - Duration::minutes(self.remind_before))
    }
}

/// Payload for inserting a new event row
#[derive(Debug, Clone)]
pub struct NewEvent {
    pub user_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub date: NaiveDate,
    pub time: Option<NaiveTime>,
    pub remind_before: i64,
    pub category: Option<String>,
    pub tag: Option<String>,
    pub repeat: Repeat,
}

impl NewEvent {
    /// Minimal event with the default 10-minute reminder lead
    pub fn new(user_id: i64, title: impl Into<String>, date: NaiveDate) -> Self {
        NewEvent {
            user_id,
            title: title.into(),
            description: None,
            date,
            time: None,
            remind_before: 10,
            category: None,
            tag: None,
            repeat: Repeat::None,
        }
    }
}

/// Result of an ownership-aware event lookup
///
/// Replaces `Option`-based sentinels so callers must distinguish a missing
/// row from a row that belongs to another user.
#[derive(Debug, Clone)]
pub enum EventLookup {
    Found(Event),
    NotFound,
    NotOwned,
}

/// One validated edit to a single event field
///
/// Each variant carries its own parser, so the dialogue layer hands raw user
/// text to exactly one constructor and gets a typed, validated edit back.
#[derive(Debug, Clone, PartialEq)]
pub enum EventEdit {
    Title(String),
    Date(NaiveDate),
    Time(Option<NaiveTime>),
    RemindBefore(i64),
    Category(Option<String>),
    Tag(Option<String>),
    Repeat(Repeat),
}

impl EventEdit {
    /// New title; must be non-empty
    pub fn parse_title(value: &str) -> Result<Self> {
        let title = value.trim();
        if title.is_empty() {
            bail!("title must not be empty");
        }
        Ok(EventEdit::Title(title.to_string()))
    }

    /// New date in `DD.MM.YYYY` form
    pub fn parse_date(value: &str) -> Result<Self> {
        let date = NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)?;
        Ok(EventEdit::Date(date))
    }

    /// New time in `HH:MM` form; `-` clears the time
    pub fn parse_time(value: &str) -> Result<Self> {
        let value = value.trim();
        if value == "-" {
            return Ok(EventEdit::Time(None));
        }
        let time = NaiveTime::parse_from_str(value, TIME_FORMAT)?;
        Ok(EventEdit::Time(Some(time)))
    }

    /// New reminder lead in minutes; must be non-negative
    pub fn parse_remind_before(value: &str) -> Result<Self> {
        let minutes: i64 = value.trim().parse()?;
        if minutes < 0 {
            bail!("remind_before must be non-negative");
        }
        Ok(EventEdit::RemindBefore(minutes))
    }

    /// New category; `-` clears it
    pub fn parse_category(value: &str) -> Result<Self> {
        Ok(EventEdit::Category(clearable(value)))
    }

    /// New tag list; `-` clears it
    pub fn parse_tag(value: &str) -> Result<Self> {
        Ok(EventEdit::Tag(clearable(value)))
    }

    /// New repeat kind (`none` / `daily` / `weekly` / `monthly` / `yearly`)
    pub fn parse_repeat(value: &str) -> Result<Self> {
        Ok(EventEdit::Repeat(Repeat::parse(value)?))
    }

    /// Apply this edit to an event in memory
    pub fn apply(self, event: &mut Event) {
        match self {
            EventEdit::Title(title) => event.title = title,
            EventEdit::Date(date) => event.date = date,
            EventEdit::Time(time) => event.time = time,
            EventEdit::RemindBefore(minutes) => event.remind_before = minutes,
            EventEdit::Category(category) => event.category = category,
            EventEdit::Tag(tag) => event.tag = tag,
            EventEdit::Repeat(repeat) => event.repeat = repeat,
        }
    }
}

fn clearable(value: &str) -> Option<String> {
    let value = value.trim();
    if value == "-" || value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Aggregated event counts for a user, optionally limited to a period
#[derive(Debug, Clone, Default)]
pub struct EventStats {
    pub total: usize,
    pub done: usize,
    pub upcoming: usize,
    pub expired: usize,
    /// Per-category counts, sorted by name
    pub categories: Vec<(String, usize)>,
    /// Per-repeat-kind counts (excluding `none`), sorted by name
    pub repeats: Vec<(String, usize)>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn sample_event() -> Event {
        Event {
            id: 1,
            user_id: 1,
            title: "Dentist".to_string(),
            description: None,
            date: date(2025, 6, 10),
            time: Some(time(14, 0)),
            created_at: date(2025, 6, 1).and_time(time(9, 0)),
            category: None,
            tag: None,
            is_done: false,
            remind_before: 10,
            repeat: Repeat::None,
            notified: false,
        }
    }

    #[test]
    fn test_repeat_round_trip() {
        for kind in [
            Repeat::None,
            Repeat::Daily,
            Repeat::Weekly,
            Repeat::Monthly,
            Repeat::Yearly,
        ] {
            assert_eq!(Repeat::parse(kind.as_str()).unwrap(), kind);
        }
        assert!(Repeat::parse("hourly").is_err());
    }

    #[test]
    fn test_notify_at_subtracts_lead() {
        let event = sample_event();
        assert_eq!(
            event.notify_at().unwrap(),
            date(2025, 6, 10).and_time(time(13, 50))
        );
    }

    #[test]
    fn test_notify_at_none_without_time() {
        let mut event = sample_event();
        event.time = None;
        assert_eq!(event.notify_at(), None);
    }

    #[test]
    fn test_notify_at_none_when_disabled() {
        let mut event = sample_event();
        event.remind_before = 0;
        assert_eq!(event.notify_at(), None);
    }

    #[test]
    fn test_edit_parse_date() {
        assert_eq!(
            EventEdit::parse_date("31.12.2025").unwrap(),
            EventEdit::Date(date(2025, 12, 31))
        );
        assert!(EventEdit::parse_date("2025-12-31").is_err());
    }

    #[test]
    fn test_edit_parse_time_clearable() {
        assert_eq!(
            EventEdit::parse_time("09:30").unwrap(),
            EventEdit::Time(Some(time(9, 30)))
        );
        assert_eq!(EventEdit::parse_time("-").unwrap(), EventEdit::Time(None));
        assert!(EventEdit::parse_time("25:00").is_err());
    }

    #[test]
    fn test_edit_parse_remind_rejects_negative() {
        assert!(EventEdit::parse_remind_before("-5").is_err());
        assert_eq!(
            EventEdit::parse_remind_before(" 15 ").unwrap(),
            EventEdit::RemindBefore(15)
        );
    }

    #[test]
    fn test_edit_parse_title_rejects_empty() {
        assert!(EventEdit::parse_title("   ").is_err());
    }

    #[test]
    fn test_edit_apply() {
        let mut event = sample_event();
        EventEdit::parse_title("Checkup").unwrap().apply(&mut event);
        EventEdit::parse_category("health").unwrap().apply(&mut event);
        EventEdit::parse_category("-").unwrap().apply(&mut event);
        EventEdit::parse_repeat("weekly").unwrap().apply(&mut event);
        assert_eq!(event.title, "Checkup");
        assert_eq!(event.category, None);
        assert_eq!(event.repeat, Repeat::Weekly);
    }
}
