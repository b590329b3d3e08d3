//! Weekly working-hours timetables.
//!
//! A [`TimeTable`] maps each of the seven weekdays to a [`WindowSet`]: zero
//! or more disjoint open [`Interval`]s during which a professional accepts
//! bookings. A day with an empty window set is a day off.
//!
//! Timetables arrive in two shapes:
//!
//! - **Textual** ([`RawTimeTable`]), as submitted by a professional: either a
//!   list of up to seven day entries (Monday first) or a map from weekday name
//!   to entry. Each entry is a comma-separated list of `HH:MM-HH:MM` windows.
//! - **Stored**, as persisted in a timetable document: a seven-element array
//!   (Monday first) of `{start, end}` minute pairs. This is the serde form of
//!   [`TimeTable`] itself.
//!
//! Both parse paths validate every window and produce a total mapping:
//! weekdays that are not mentioned get an empty window set.

use std::collections::BTreeMap;

use chrono::Weekday;
use serde::{Deserialize, Serialize};

use crate::error::EvendayError;
use crate::interval::Interval;

const DAYS_PER_WEEK: usize = 7;

const WEEKDAYS: [Weekday; DAYS_PER_WEEK] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

// ── WindowSet ───────────────────────────────────────────────────────────────

/// The open windows of a single weekday, sorted by start and pairwise disjoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Interval>", into = "Vec<Interval>")]
pub struct WindowSet {
    windows: Vec<Interval>,
}

impl WindowSet {
    /// A day off.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a window set, sorting the windows by start.
    ///
    /// Windows may touch (`12:00-13:00, 13:00-17:00`) but not overlap.
    ///
    /// # Errors
    ///
    /// Returns [`EvendayError::InvalidTimeTable`] if two windows overlap.
    pub fn new(mut windows: Vec<Interval>) -> Result<Self, EvendayError> {
        windows.sort();
        if let Some(pair) = windows.windows(2).find(|w| w[0].overlaps(&w[1])) {
            return Err(EvendayError::InvalidTimeTable(format!(
                "windows {} and {} overlap",
                pair[0], pair[1]
            )));
        }
        Ok(Self { windows })
    }

    /// Parse a comma-separated list of `HH:MM-HH:MM` windows.
    ///
    /// A blank string is a day off.
    pub fn parse(s: &str) -> Result<Self, EvendayError> {
        let windows = s
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(|part| {
                part.parse::<Interval>()
                    .map_err(|e| EvendayError::InvalidTimeTable(format!("window '{part}': {e}")))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(windows)
    }

    /// The windows in ascending order.
    pub fn windows(&self) -> &[Interval] {
        &self.windows
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    /// Whether `interval` fits entirely inside a single window.
    pub fn contains(&self, interval: &Interval) -> bool {
        self.windows.iter().any(|w| w.contains(interval))
    }
}

impl TryFrom<Vec<Interval>> for WindowSet {
    type Error = EvendayError;

    fn try_from(windows: Vec<Interval>) -> Result<Self, Self::Error> {
        Self::new(windows)
    }
}

impl From<WindowSet> for Vec<Interval> {
    fn from(set: WindowSet) -> Self {
        set.windows
    }
}

// ── TimeTable ───────────────────────────────────────────────────────────────

/// A professional's working hours for every weekday.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<WindowSet>", into = "Vec<WindowSet>")]
pub struct TimeTable {
    days: [WindowSet; DAYS_PER_WEEK],
}

impl TimeTable {
    /// A timetable with every day off.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the windows of `weekday`.
    pub fn with_day(mut self, weekday: Weekday, windows: WindowSet) -> Self {
        self.days[weekday.num_days_from_monday() as usize] = windows;
        self
    }

    /// The open windows of `weekday` (empty on a day off).
    pub fn day(&self, weekday: Weekday) -> &WindowSet {
        &self.days[weekday.num_days_from_monday() as usize]
    }

    /// Whether `interval` fits inside one of the open windows of `weekday`.
    pub fn contains(&self, weekday: Weekday, interval: &Interval) -> bool {
        self.day(weekday).contains(interval)
    }

    /// Iterate over `(weekday, windows)` from Monday to Sunday.
    pub fn iter(&self) -> impl Iterator<Item = (Weekday, &WindowSet)> {
        WEEKDAYS.iter().copied().zip(self.days.iter())
    }

    /// Parse a submitted textual timetable.
    ///
    /// # Errors
    ///
    /// Returns [`EvendayError::InvalidTimeTable`] on an unknown weekday name, a
    /// weekday listed twice, more than seven list entries, or any malformed or
    /// overlapping window.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::Weekday;
    /// use evenday::{RawTimeTable, TimeTable};
    ///
    /// let raw = RawTimeTable::Days(vec!["08:00-12:00, 13:00-17:00".into()]);
    /// let tt = TimeTable::parse(&raw).unwrap();
    /// assert_eq!(tt.day(Weekday::Mon).windows().len(), 2);
    /// assert!(tt.day(Weekday::Tue).is_empty());
    /// ```
    pub fn parse(raw: &RawTimeTable) -> Result<Self, EvendayError> {
        match raw {
            RawTimeTable::Days(entries) => {
                if entries.len() > DAYS_PER_WEEK {
                    return Err(EvendayError::InvalidTimeTable(format!(
                        "expected at most {DAYS_PER_WEEK} day entries, got {}",
                        entries.len()
                    )));
                }
                entries
                    .iter()
                    .zip(WEEKDAYS)
                    .try_fold(Self::new(), |tt, (entry, weekday)| {
                        Ok(tt.with_day(weekday, parse_day(weekday, entry)?))
                    })
            }
            RawTimeTable::Named(map) => {
                let mut tt = Self::new();
                let mut seen = [false; DAYS_PER_WEEK];
                for (name, entry) in map {
                    let weekday = name.trim().parse::<Weekday>().map_err(|_| {
                        EvendayError::InvalidTimeTable(format!("unknown weekday '{name}'"))
                    })?;
                    let idx = weekday.num_days_from_monday() as usize;
                    if std::mem::replace(&mut seen[idx], true) {
                        return Err(EvendayError::InvalidTimeTable(format!(
                            "weekday {weekday} listed more than once"
                        )));
                    }
                    tt = tt.with_day(weekday, parse_day(weekday, &entry.joined())?);
                }
                Ok(tt)
            }
        }
    }

    /// Parse a stored timetable from its generic JSON form.
    pub fn from_value(value: &serde_json::Value) -> Result<Self, EvendayError> {
        Self::deserialize(value).map_err(|e| EvendayError::InvalidTimeTable(e.to_string()))
    }
}

impl TryFrom<Vec<WindowSet>> for TimeTable {
    type Error = EvendayError;

    fn try_from(days: Vec<WindowSet>) -> Result<Self, Self::Error> {
        if days.len() > DAYS_PER_WEEK {
            return Err(EvendayError::InvalidTimeTable(format!(
                "expected at most {DAYS_PER_WEEK} days, got {}",
                days.len()
            )));
        }
        Ok(days
            .into_iter()
            .zip(WEEKDAYS)
            .fold(Self::new(), |tt, (windows, weekday)| tt.with_day(weekday, windows)))
    }
}

impl From<TimeTable> for Vec<WindowSet> {
    fn from(tt: TimeTable) -> Self {
        tt.days.into()
    }
}

fn parse_day(weekday: Weekday, entry: &str) -> Result<WindowSet, EvendayError> {
    WindowSet::parse(entry).map_err(|e| match e {
        EvendayError::InvalidTimeTable(msg) => {
            EvendayError::InvalidTimeTable(format!("{weekday}: {msg}"))
        }
        other => other,
    })
}

// ── Raw (submitted) form ────────────────────────────────────────────────────

/// A timetable as submitted by a professional, before validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawTimeTable {
    /// Day entries from Monday onward; trailing days may be omitted.
    Days(Vec<String>),
    /// Entries keyed by weekday name (`"mon"`, `"Tuesday"`, ...).
    Named(BTreeMap<String, RawDay>),
}

/// One weekday's windows, either as a single comma-separated string or a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawDay {
    Text(String),
    List(Vec<String>),
}

impl RawDay {
    fn joined(&self) -> String {
        match self {
            RawDay::Text(s) => s.clone(),
            RawDay::List(parts) => parts.join(","),
        }
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn iv(start: u32, end: u32) -> Interval {
        Interval::new(start, end).unwrap()
    }

    #[test]
    fn test_window_set_sorts() {
        let set = WindowSet::new(vec![iv(780, 1020), iv(480, 720)]).unwrap();
        assert_eq!(set.windows(), &[iv(480, 720), iv(780, 1020)]);
    }

    #[test]
    fn test_window_set_rejects_overlap() {
        let err = WindowSet::new(vec![iv(480, 720), iv(700, 800)])
            .unwrap_err()
            .to_string();
        assert!(err.contains("overlap"), "got: {err}");
    }

    #[test]
    fn test_window_set_allows_touching() {
        assert!(WindowSet::new(vec![iv(480, 720), iv(720, 800)]).is_ok());
    }

    #[test]
    fn test_window_set_contains_needs_single_window() {
        let set = WindowSet::new(vec![iv(480, 720), iv(720, 800)]).unwrap();
        assert!(set.contains(&iv(480, 720)));
        // Spans two touching windows: not inside any single one.
        assert!(!set.contains(&iv(700, 740)));
    }

    #[test]
    fn test_window_set_parse_blank_is_day_off() {
        assert!(WindowSet::parse("").unwrap().is_empty());
        assert!(WindowSet::parse("  ,  ").unwrap().is_empty());
    }

    #[test]
    fn test_parse_days_list() {
        let raw = RawTimeTable::Days(vec![
            "08:00-17:00".into(),
            "".into(),
            "09:00-12:00,13:00-18:00".into(),
        ]);
        let tt = TimeTable::parse(&raw).unwrap();
        assert_eq!(tt.day(Weekday::Mon).windows(), &[iv(480, 1020)]);
        assert!(tt.day(Weekday::Tue).is_empty());
        assert_eq!(tt.day(Weekday::Wed).windows().len(), 2);
        assert!(tt.day(Weekday::Sun).is_empty());
    }

    #[test]
    fn test_parse_days_list_too_long() {
        let raw = RawTimeTable::Days(vec![String::new(); 8]);
        assert!(TimeTable::parse(&raw).is_err());
    }

    #[test]
    fn test_parse_named() {
        let raw: RawTimeTable = serde_json::from_value(json!({
            "Friday": "10:00-14:00",
            "sat": ["08:00-10:00", "11:00-12:00"],
        }))
        .unwrap();
        let tt = TimeTable::parse(&raw).unwrap();
        assert_eq!(tt.day(Weekday::Fri).windows(), &[iv(600, 840)]);
        assert_eq!(tt.day(Weekday::Sat).windows(), &[iv(480, 600), iv(660, 720)]);
        assert!(tt.day(Weekday::Mon).is_empty());
    }

    #[test]
    fn test_parse_named_unknown_weekday() {
        let raw: RawTimeTable = serde_json::from_value(json!({"funday": "10:00-11:00"})).unwrap();
        let err = TimeTable::parse(&raw).unwrap_err().to_string();
        assert!(err.contains("unknown weekday"), "got: {err}");
    }

    #[test]
    fn test_parse_named_duplicate_weekday() {
        let raw: RawTimeTable =
            serde_json::from_value(json!({"mon": "10:00-11:00", "Monday": "12:00-13:00"}))
                .unwrap();
        let err = TimeTable::parse(&raw).unwrap_err().to_string();
        assert!(err.contains("more than once"), "got: {err}");
    }

    #[test]
    fn test_parse_reports_weekday_of_bad_window() {
        let raw = RawTimeTable::Days(vec!["08:00-17:00".into(), "17:00-08:00".into()]);
        let err = TimeTable::parse(&raw).unwrap_err().to_string();
        assert!(err.contains("Tue"), "got: {err}");
    }

    #[test]
    fn test_stored_form_round_trip() {
        let tt = TimeTable::new()
            .with_day(Weekday::Mon, WindowSet::new(vec![iv(480, 1020)]).unwrap())
            .with_day(Weekday::Sun, WindowSet::new(vec![iv(600, 660)]).unwrap());
        let value = serde_json::to_value(&tt).unwrap();
        assert_eq!(value.as_array().unwrap().len(), 7);
        assert_eq!(value[0], json!([{"start": 480, "end": 1020}]));
        assert_eq!(TimeTable::from_value(&value).unwrap(), tt);
    }

    #[test]
    fn test_stored_form_short_array_is_total() {
        let tt = TimeTable::from_value(&json!([[{"start": 480, "end": 600}]])).unwrap();
        assert!(tt.contains(Weekday::Mon, &iv(480, 600)));
        assert!(tt.iter().skip(1).all(|(_, w)| w.is_empty()));
    }

    #[test]
    fn test_stored_form_rejects_bad_interval() {
        let err = TimeTable::from_value(&json!([[{"start": 600, "end": 480}]]))
            .unwrap_err()
            .to_string();
        assert!(err.contains("Invalid timetable"), "got: {err}");
    }

    #[test]
    fn test_contains_by_weekday() {
        let tt = TimeTable::new().with_day(Weekday::Wed, WindowSet::parse("08:00-17:00").unwrap());
        assert!(tt.contains(Weekday::Wed, &iv(960, 1020)));
        assert!(!tt.contains(Weekday::Wed, &iv(990, 1050)));
        assert!(!tt.contains(Weekday::Thu, &iv(600, 630)));
    }
}
