use chrono::{DateTime, Datelike, NaiveDate, Utc, Weekday};
use chrono_tz::Tz;

/// Weekday numbering used throughout the engine: 0 = Sunday … 6 = Saturday.
///
/// Any external representation counting from Monday (or from 1) converts at
/// the boundary through [`weekday_from_index`] / [`weekday_to_index`]; nothing
/// inside the engine ever sees another numbering.
pub fn weekday_from_index(index: u8) -> Option<Weekday> {
    Some(match index {
        0 => Weekday::Sun,
        1 => Weekday::Mon,
        2 => Weekday::Tue,
        3 => Weekday::Wed,
        4 => Weekday::Thu,
        5 => Weekday::Fri,
        6 => Weekday::Sat,
        _ => return None,
    })
}

pub fn weekday_to_index(weekday: Weekday) -> u8 {
    weekday.num_days_from_sunday() as u8
}

pub fn weekday_of(day: NaiveDate) -> Weekday {
    day.weekday()
}

/// Parse an IANA zone name ("America/New_York"). Returns `None` for unknown
/// names; the UTC fallback is the caller's policy, applied once where an
/// event enters the engine.
pub fn parse_timezone(name: &str) -> Option<Tz> {
    name.trim().parse().ok()
}

/// Source of "now" for the engine. Injected so tests can pin or advance the
/// calendar without touching the wall clock.
pub trait TimeContext: Send + Sync {
    fn now_utc(&self) -> DateTime<Utc>;

    /// The current calendar day in `tz`: a (year, month, day) triple, never a
    /// timestamp, so comparisons stay stable once resolved.
    fn today(&self, tz: Tz) -> NaiveDate {
        self.now_utc().with_timezone(&tz).date_naive()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl TimeContext for SystemClock {
    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
