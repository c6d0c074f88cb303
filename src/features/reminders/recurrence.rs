//! Recurrence date arithmetic
//!
//! Pure functions from a base date to the next occurrence. All calendar
//! edge cases live here so the scheduler never touches chrono directly.

use chrono::{Datelike, Duration, NaiveDate};

use crate::core::Repeat;

/// Next occurrence of a repeating event, or `None` for one-shot events
pub fn next_occurrence(repeat: Repeat, date: NaiveDate) -> Option<NaiveDate> {
    match repeat {
        Repeat::None => None,
        Repeat::Daily => Some(date + Duration::days(1)),
        Repeat::Weekly => Some(date + Duration::days(7)),
        Repeat::Monthly => Some(next_monthly(date)),
        Repeat::Yearly => Some(next_yearly(date)),
    }
}

/// Same day-of-month in the next month
///
/// When the next month is too short for the day (e.g. Jan 31 -> Feb), the
/// occurrence skips to the first day of the month after next instead of
/// clamping to the short month's end.
pub fn next_monthly(date: NaiveDate) -> NaiveDate {
    let (year, month) = bump_month(date.year(), date.month());

    if let Some(next) = NaiveDate::from_ymd_opt(year, month, date.day()) {
        return next;
    }

    let (year, month) = bump_month(year, month);
    // day 1 exists in every month
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(date)
}

/// Same calendar date in the next year
///
/// Feb 29 has no next-year counterpart outside leap years; those fall back
/// to base date + 365 days.
pub fn next_yearly(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year() + 1, date.month(), date.day())
        .unwrap_or_else(|| date + Duration::days(365))
}

fn bump_month(year: i32, month: u32) -> (i32, u32) {
    if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    }
}
