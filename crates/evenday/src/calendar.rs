//! Mapping absolute timestamps onto the local calendar.
//!
//! Bookings are stored with absolute Unix timestamps (seconds), while
//! timetables speak in weekdays and minutes of the day. A [`Calendar`] binds
//! one IANA timezone and performs every conversion between the two worlds in
//! that zone, so "which day is this booking on" has exactly one answer.
//!
//! All functions are pure: no system clock access, no ambient local zone.

use chrono::{DateTime, Datelike, Timelike, Utc, Weekday};
use chrono_tz::Tz;

use crate::error::EvendayError;
use crate::interval::{Interval, MINUTES_PER_DAY};

/// Format of the calendar-date key stored on every booking (e.g. `2026.03.16`).
pub const DAY_KEY_FORMAT: &str = "%Y.%m.%d";

/// Local-calendar semantics for one timezone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Calendar {
    tz: Tz,
}

impl Default for Calendar {
    fn default() -> Self {
        Self { tz: Tz::UTC }
    }
}

impl Calendar {
    /// A calendar in the given timezone.
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }

    /// A calendar for an IANA timezone name (e.g. `"Europe/Budapest"`).
    ///
    /// # Errors
    ///
    /// Returns [`EvendayError::InvalidTimezone`] if the name is not a valid IANA timezone.
    pub fn from_name(name: &str) -> Result<Self, EvendayError> {
        name.parse::<Tz>()
            .map(Self::new)
            .map_err(|_| EvendayError::InvalidTimezone(format!("'{name}'")))
    }

    /// The timezone this calendar interprets timestamps in.
    pub fn timezone(&self) -> Tz {
        self.tz
    }

    /// The instant `ts` (Unix seconds) expressed in local time.
    ///
    /// # Errors
    ///
    /// Returns [`EvendayError::InvalidTimestamp`] if `ts` is outside chrono's range.
    pub fn local(&self, ts: i64) -> Result<DateTime<Tz>, EvendayError> {
        DateTime::<Utc>::from_timestamp(ts, 0)
            .map(|dt| dt.with_timezone(&self.tz))
            .ok_or_else(|| EvendayError::InvalidTimestamp(format!("{ts} is out of range")))
    }

    /// Minutes elapsed since local midnight at `ts` (seconds are truncated).
    pub fn minute_of_day(&self, ts: i64) -> Result<u32, EvendayError> {
        let local = self.local(ts)?;
        Ok(local.hour() * 60 + local.minute())
    }

    /// Local weekday at `ts`.
    pub fn weekday(&self, ts: i64) -> Result<Weekday, EvendayError> {
        Ok(self.local(ts)?.weekday())
    }

    /// Calendar-date key (`YYYY.MM.DD`) of the local day containing `ts`.
    pub fn day_key(&self, ts: i64) -> Result<String, EvendayError> {
        Ok(self.local(ts)?.format(DAY_KEY_FORMAT).to_string())
    }

    /// The minute-of-day span covered by the absolute range `[from, to)`.
    ///
    /// Both ends are read off the local wall clock, so a range spanning a DST
    /// change keeps the local times a timetable is written in. A range ending
    /// exactly at the following local midnight maps to `..1440`. Partial
    /// minutes are widened: the start is floored and the end is ceiled.
    ///
    /// # Errors
    ///
    /// Returns [`EvendayError::InvalidInterval`] if `to <= from`, the range
    /// runs past the end of `from`'s local day, or the wall clock ends no
    /// later than it starts (a range inside a repeated fall-back hour).
    ///
    /// # Examples
    ///
    /// ```
    /// use evenday::Calendar;
    ///
    /// let cal = Calendar::default();
    /// // 2026-03-16 09:30 UTC, one hour long
    /// let i = cal.interval(1_773_653_400, 1_773_657_000).unwrap();
    /// assert_eq!((i.start(), i.end()), (570, 630));
    /// ```
    pub fn interval(&self, from: i64, to: i64) -> Result<Interval, EvendayError> {
        if to <= from {
            return Err(EvendayError::InvalidInterval(format!(
                "range end {to} does not follow start {from}"
            )));
        }
        let start = self.local(from)?;
        let end = self.local(to)?;
        let end_secs = i64::from(end.num_seconds_from_midnight());
        let end_secs = if end.date_naive() == start.date_naive() {
            end_secs
        } else if end_secs == 0 && start.date_naive().succ_opt() == Some(end.date_naive()) {
            i64::from(MINUTES_PER_DAY) * 60
        } else {
            return Err(EvendayError::InvalidInterval(format!(
                "range {from}-{to} runs past the end of {}",
                start.format(DAY_KEY_FORMAT)
            )));
        };
        let start_min = i64::from(start.num_seconds_from_midnight()) / 60;
        Interval::from_minutes(start_min, (end_secs + 59) / 60)
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────
