//! # Database Module
//!
//! Sqlite-backed event store shared by the scheduler and the interactive
//! path. The handle is cheap to clone; every statement commits on its own,
//! which is the store's atomic unit of work.
//!
//! - **Version**: 1.2.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.2.0: Ownership-aware lookups return EventLookup instead of Option
//! - 1.1.0: Range queries with category/tag filters
//! - 1.0.0: Initial schema with users and events tables

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use log::debug;
use sqlite::{Connection, ConnectionWithFullMutex, State, Statement};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::core::event::{Event, EventLookup, NewEvent, Repeat, User};

const DATE_STORE_FORMAT: &str = "%Y-%m-%d";
const TIME_STORE_FORMAT: &str = "%H:%M";
const DATETIME_STORE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    telegram_id INTEGER NOT NULL UNIQUE,
    username TEXT,
    first_name TEXT,
    last_name TEXT,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS events (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    title TEXT NOT NULL,
    description TEXT,
    date TEXT NOT NULL,
    time TEXT,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    category TEXT,
    tag TEXT,
    is_done INTEGER NOT NULL DEFAULT 0,
    remind_before INTEGER NOT NULL DEFAULT 10,
    repeat TEXT NOT NULL DEFAULT 'none',
    notified INTEGER NOT NULL DEFAULT 0
);

CREATE INDEX IF NOT EXISTS idx_events_user_date ON events(user_id, date);
";

const EVENT_COLUMNS: &str = "id, user_id, title, description, date, time, \
                             created_at, category, tag, is_done, remind_before, repeat, notified";

/// Shared handle to the sqlite store
#[derive(Clone)]
pub struct Database {
    connection: Arc<Mutex<ConnectionWithFullMutex>>,
}

impl Database {
    /// Open (or create) the database at `path` and ensure the schema exists
    ///
    /// Use `:memory:` for throwaway test databases.
    pub async fn new(path: &str) -> Result<Self> {
        let connection = Connection::open_with_full_mutex(path)
            .with_context(|| format!("failed to open database at {path}"))?;
        connection.execute(SCHEMA)?;
        debug!("Database ready at {path}");
        Ok(Database {
            connection: Arc::new(Mutex::new(connection)),
        })
    }

    // -- users ------------------------------------------------------------

    /// Fetch a user by internal id
    pub async fn get_user(&self, id: i64) -> Result<Option<User>> {
        let connection = self.connection.lock().await;
        let mut statement = connection.prepare(
            "SELECT id, telegram_id, username, first_name, last_name, created_at \
             FROM users WHERE id = ?",
        )?;
        statement.bind((1, id))?;
        if statement.next()? == State::Row {
            Ok(Some(read_user(&statement)?))
        } else {
            Ok(None)
        }
    }

    /// Fetch a user by Telegram chat id
    pub async fn get_user_by_telegram_id(&self, telegram_id: i64) -> Result<Option<User>> {
        let connection = self.connection.lock().await;
        let mut statement = connection.prepare(
            "SELECT id, telegram_id, username, first_name, last_name, created_at \
             FROM users WHERE telegram_id = ?",
        )?;
        statement.bind((1, telegram_id))?;
        if statement.next()? == State::Row {
            Ok(Some(read_user(&statement)?))
        } else {
            Ok(None)
        }
    }

    /// Fetch a user by Telegram chat id, creating the row if absent
    ///
    /// Returns the user and whether a new row was inserted.
    pub async fn get_or_create_user(
        &self,
        telegram_id: i64,
        username: Option<&str>,
        first_name: Option<&str>,
        last_name: Option<&str>,
    ) -> Result<(User, bool)> {
        if let Some(user) = self.get_user_by_telegram_id(telegram_id).await? {
            return Ok((user, false));
        }

        {
            let connection = self.connection.lock().await;
            let mut statement = connection.prepare(
                "INSERT INTO users (telegram_id, username, first_name, last_name) \
                 VALUES (?, ?, ?, ?)",
            )?;
            statement.bind((1, telegram_id))?;
            statement.bind((2, username))?;
            statement.bind((3, first_name))?;
            statement.bind((4, last_name))?;
            statement.next()?;
        }

        let user = self
            .get_user_by_telegram_id(telegram_id)
            .await?
            .context("user row missing right after insert")?;
        Ok((user, true))
    }

    // -- event CRUD -------------------------------------------------------

    /// Insert a new event row; returns the assigned id
    pub async fn insert_event(&self, event: &NewEvent) -> Result<i64> {
        let connection = self.connection.lock().await;
        let mut statement = connection.prepare(
            "INSERT INTO events \
             (user_id, title, description, date, time, category, tag, remind_before, repeat) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )?;
        let date = event.date.format(DATE_STORE_FORMAT).to_string();
        let time = event
            .time
            .map(|t| t.format(TIME_STORE_FORMAT).to_string());
        statement.bind((1, event.user_id))?;
        statement.bind((2, event.title.as_str()))?;
        statement.bind((3, event.description.as_deref()))?;
        statement.bind((4, date.as_str()))?;
        statement.bind((5, time.as_deref()))?;
        statement.bind((6, event.category.as_deref()))?;
        statement.bind((7, event.tag.as_deref()))?;
        statement.bind((8, event.remind_before))?;
        statement.bind((9, event.repeat.as_str()))?;
        statement.next()?;

        let mut id_statement = connection.prepare("SELECT last_insert_rowid()")?;
        id_statement.next()?;
        let id = id_statement.read::<i64, _>(0)?;
        Ok(id)
    }

    /// Persist every mutable field of an existing event row
    pub async fn update_event(&self, event: &Event) -> Result<()> {
        let connection = self.connection.lock().await;
        let mut statement = connection.prepare(
            "UPDATE events SET title = ?, description = ?, date = ?, time = ?, \
             category = ?, tag = ?, is_done = ?, remind_before = ?, repeat = ?, notified = ? \
             WHERE id = ?",
        )?;
        let date = event.date.format(DATE_STORE_FORMAT).to_string();
        let time = event
            .time
            .map(|t| t.format(TIME_STORE_FORMAT).to_string());
        statement.bind((1, event.title.as_str()))?;
        statement.bind((2, event.description.as_deref()))?;
        statement.bind((3, date.as_str()))?;
        statement.bind((4, time.as_deref()))?;
        statement.bind((5, event.category.as_deref()))?;
        statement.bind((6, event.tag.as_deref()))?;
        statement.bind((7, event.is_done as i64))?;
        statement.bind((8, event.remind_before))?;
        statement.bind((9, event.repeat.as_str()))?;
        statement.bind((10, event.notified as i64))?;
        statement.bind((11, event.id))?;
        statement.next()?;
        Ok(())
    }

    /// Delete an event owned by `user_id`; returns whether a row was removed
    pub async fn delete_event(&self, id: i64, user_id: i64) -> Result<bool> {
        let connection = self.connection.lock().await;
        let mut statement =
            connection.prepare("DELETE FROM events WHERE id = ? AND user_id = ?")?;
        statement.bind((1, id))?;
        statement.bind((2, user_id))?;
        statement.next()?;
        Ok(connection.change_count() > 0)
    }

    /// Fetch an event by id regardless of owner
    pub async fn get_event(&self, id: i64) -> Result<Option<Event>> {
        let connection = self.connection.lock().await;
        let mut statement = connection
            .prepare(format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = ?"))?;
        statement.bind((1, id))?;
        if statement.next()? == State::Row {
            Ok(Some(read_event(&statement)?))
        } else {
            Ok(None)
        }
    }

    /// Ownership-aware lookup used by edit/done/delete surfaces
    pub async fn get_event_for_user(&self, id: i64, user_id: i64) -> Result<EventLookup> {
        match self.get_event(id).await? {
            None => Ok(EventLookup::NotFound),
            Some(event) if event.user_id != user_id => Ok(EventLookup::NotOwned),
            Some(event) => Ok(EventLookup::Found(event)),
        }
    }

    // -- scheduler queries ------------------------------------------------

    /// Events the completion sweeper must examine: not done, timed,
    /// dated today or earlier
    pub async fn sweepable_events(&self, today: NaiveDate) -> Result<Vec<Event>> {
        let connection = self.connection.lock().await;
        let mut statement = connection.prepare(format!(
            "SELECT {EVENT_COLUMNS} FROM events \
             WHERE is_done = 0 AND time IS NOT NULL AND date <= ? \
             ORDER BY date, time, id"
        ))?;
        let today = today.format(DATE_STORE_FORMAT).to_string();
        statement.bind((1, today.as_str()))?;
        read_events(&mut statement)
    }

    /// Events the notification evaluator must examine: not done, not yet
    /// notified, timed, with reminding enabled
    pub async fn reminder_candidates(&self) -> Result<Vec<Event>> {
        let connection = self.connection.lock().await;
        let mut statement = connection.prepare(format!(
            "SELECT {EVENT_COLUMNS} FROM events \
             WHERE is_done = 0 AND notified = 0 AND time IS NOT NULL AND remind_before > 0 \
             ORDER BY date, time, id"
        ))?;
        read_events(&mut statement)
    }

    /// True if the user already has an event with this title on this date;
    /// the recurrence expander's idempotence probe
    pub async fn clone_exists(&self, user_id: i64, title: &str, date: NaiveDate) -> Result<bool> {
        let connection = self.connection.lock().await;
        let mut statement = connection.prepare(
            "SELECT 1 FROM events WHERE user_id = ? AND title = ? AND date = ? LIMIT 1",
        )?;
        let date = date.format(DATE_STORE_FORMAT).to_string();
        statement.bind((1, user_id))?;
        statement.bind((2, title))?;
        statement.bind((3, date.as_str()))?;
        Ok(statement.next()? == State::Row)
    }

    // -- listing queries --------------------------------------------------

    /// All events of a user in deterministic order
    pub async fn events_for_user(&self, user_id: i64) -> Result<Vec<Event>> {
        let connection = self.connection.lock().await;
        let mut statement = connection.prepare(format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE user_id = ? ORDER BY date, time, id"
        ))?;
        statement.bind((1, user_id))?;
        read_events(&mut statement)
    }

    /// All of a user's events on one calendar date
    pub async fn events_on_date(&self, user_id: i64, date: NaiveDate) -> Result<Vec<Event>> {
        let connection = self.connection.lock().await;
        let mut statement = connection.prepare(format!(
            "SELECT {EVENT_COLUMNS} FROM events \
             WHERE user_id = ? AND date = ? ORDER BY date, time, id"
        ))?;
        let date = date.format(DATE_STORE_FORMAT).to_string();
        statement.bind((1, user_id))?;
        statement.bind((2, date.as_str()))?;
        read_events(&mut statement)
    }

    /// Events in an inclusive date range with optional category/tag filters
    pub async fn events_in_range(
        &self,
        user_id: i64,
        start: NaiveDate,
        end: NaiveDate,
        category: Option<&str>,
        tag: Option<&str>,
    ) -> Result<Vec<Event>> {
        let connection = self.connection.lock().await;
        let mut sql = format!(
            "SELECT {EVENT_COLUMNS} FROM events \
             WHERE user_id = ? AND date >= ? AND date <= ?"
        );
        if category.is_some() {
            sql.push_str(" AND category LIKE ?");
        }
        if tag.is_some() {
            sql.push_str(" AND tag LIKE ?");
        }
        sql.push_str(" ORDER BY date, time, id");

        let mut statement = connection.prepare(sql)?;
        let start = start.format(DATE_STORE_FORMAT).to_string();
        let end = end.format(DATE_STORE_FORMAT).to_string();
        statement.bind((1, user_id))?;
        statement.bind((2, start.as_str()))?;
        statement.bind((3, end.as_str()))?;
        let mut index = 4;
        if let Some(category) = category {
            let pattern = format!("%{category}%");
            statement.bind((index, pattern.as_str()))?;
            index += 1;
        }
        if let Some(tag) = tag {
            let pattern = format!("%{tag}%");
            statement.bind((index, pattern.as_str()))?;
        }
        read_events(&mut statement)
    }
}

fn read_events(statement: &mut Statement) -> Result<Vec<Event>> {
    let mut events = Vec::new();
    while statement.next()? == State::Row {
        events.push(read_event(statement)?);
    }
    Ok(events)
}

fn read_event(statement: &Statement) -> Result<Event> {
    let date: String = statement.read("date")?;
    let time: Option<String> = statement.read("time")?;
    let created_at: String = statement.read("created_at")?;
    let repeat: String = statement.read("repeat")?;

    Ok(Event {
        id: statement.read("id")?,
        user_id: statement.read("user_id")?,
        title: statement.read("title")?,
        description: statement.read("description")?,
        date: parse_date(&date)?,
        time: time.as_deref().map(parse_time).transpose()?,
        created_at: parse_datetime(&created_at)?,
        category: statement.read("category")?,
        tag: statement.read("tag")?,
        is_done: statement.read::<i64, _>("is_done")? != 0,
        remind_before: statement.read("remind_before")?,
        repeat: Repeat::parse(&repeat)?,
        notified: statement.read::<i64, _>("notified")? != 0,
    })
}

fn read_user(statement: &Statement) -> Result<User> {
    let created_at: String = statement.read("created_at")?;
    Ok(User {
        id: statement.read("id")?,
        telegram_id: statement.read("telegram_id")?,
        username: statement.read("username")?,
        first_name: statement.read("first_name")?,
        last_name: statement.read("last_name")?,
        created_at: parse_datetime(&created_at)?,
    })
}

fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_STORE_FORMAT)
        .with_context(|| format!("bad stored date: {value}"))
}

fn parse_time(value: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(value, TIME_STORE_FORMAT)
        .with_context(|| format!("bad stored time: {value}"))
}

fn parse_datetime(value: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, DATETIME_STORE_FORMAT)
        .with_context(|| format!("bad stored datetime: {value}"))
}
