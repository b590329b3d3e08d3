//! Validated minute-of-day ranges.
//!
//! An [`Interval`] is a half-open range `[start, end)` of minutes within one
//! calendar day. Both bounds lie in `0..=1440` and `start < end`; the only way
//! to obtain an `Interval` is through a constructor that checks this, so every
//! value in circulation is valid.
//!
//! Intervals have a textual form `HH:MM-HH:MM` (e.g. `"08:00-12:30"`), where
//! `24:00` is accepted as an end bound to express "until midnight".

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::EvendayError;

/// Number of minutes in a calendar day; the exclusive upper bound of any interval.
pub const MINUTES_PER_DAY: u32 = 1440;

/// A minute-of-day range `[start, end)` with `0 <= start < end <= 1440`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "RawInterval")]
pub struct Interval {
    start: u32,
    end: u32,
}

/// Unvalidated wire shape used when deserializing stored intervals.
#[derive(Deserialize)]
struct RawInterval {
    start: i64,
    end: i64,
}

impl TryFrom<RawInterval> for Interval {
    type Error = EvendayError;

    fn try_from(raw: RawInterval) -> Result<Self, Self::Error> {
        Interval::from_minutes(raw.start, raw.end)
    }
}

impl Interval {
    /// Build an interval from minute-of-day bounds.
    ///
    /// # Errors
    ///
    /// Returns [`EvendayError::InvalidInterval`] if `start >= end` or either
    /// bound lies outside `0..=1440`.
    ///
    /// # Examples
    ///
    /// ```
    /// use evenday::Interval;
    ///
    /// let morning = Interval::new(480, 720).unwrap();
    /// assert_eq!(morning.len(), 240);
    /// assert!(Interval::new(720, 720).is_err());
    /// ```
    pub fn new(start: u32, end: u32) -> Result<Self, EvendayError> {
        if start > MINUTES_PER_DAY || end > MINUTES_PER_DAY {
            return Err(EvendayError::InvalidInterval(format!(
                "bounds must lie within 0..={MINUTES_PER_DAY}, got {start}-{end}"
            )));
        }
        if start >= end {
            return Err(EvendayError::InvalidInterval(format!(
                "start must precede end, got {start}-{end}"
            )));
        }
        Ok(Self { start, end })
    }

    /// Like [`Interval::new`] but accepts signed, possibly out-of-range input.
    pub fn from_minutes(start: i64, end: i64) -> Result<Self, EvendayError> {
        let to_minute = |m: i64| {
            u32::try_from(m).map_err(|_| {
                EvendayError::InvalidInterval(format!(
                    "bounds must lie within 0..={MINUTES_PER_DAY}, got {start}-{end}"
                ))
            })
        };
        Self::new(to_minute(start)?, to_minute(end)?)
    }

    /// First minute covered by the interval.
    pub fn start(&self) -> u32 {
        self.start
    }

    /// First minute after the interval.
    pub fn end(&self) -> u32 {
        self.end
    }

    /// Length in minutes (always at least 1).
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> u32 {
        self.end - self.start
    }

    /// Whether the two intervals share at least one minute.
    ///
    /// Intervals that only touch (`a.end == b.start`) do not overlap.
    pub fn overlaps(&self, other: &Interval) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Whether `other` lies entirely inside `self`.
    pub fn contains(&self, other: &Interval) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Absolute distance in minutes between the two start points.
    pub fn start_distance(&self, other: &Interval) -> u32 {
        self.start.abs_diff(other.start)
    }

    /// The interval of length `len` starting where `self` starts, if it fits.
    pub fn head(&self, len: u32) -> Option<Interval> {
        if len == 0 || len > self.len() {
            return None;
        }
        Some(Interval {
            start: self.start,
            end: self.start + len,
        })
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", format_clock(self.start), format_clock(self.end))
    }
}

impl FromStr for Interval {
    type Err = EvendayError;

    /// Parse `"HH:MM-HH:MM"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (from, to) = s.trim().split_once('-').ok_or_else(|| {
            EvendayError::InvalidInterval(format!("expected 'HH:MM-HH:MM', got '{}'", s.trim()))
        })?;
        Interval::new(parse_clock(from)?, parse_clock(to)?)
    }
}

/// Parse a wall-clock time `H:MM` / `HH:MM` into minutes past midnight.
///
/// `24:00` is accepted and maps to [`MINUTES_PER_DAY`].
fn parse_clock(s: &str) -> Result<u32, EvendayError> {
    let s = s.trim();
    let invalid = || EvendayError::InvalidInterval(format!("invalid clock time '{s}'"));

    let (h, m) = s.split_once(':').ok_or_else(invalid)?;
    if h.is_empty() || h.len() > 2 || m.len() != 2 {
        return Err(invalid());
    }
    if !h.bytes().chain(m.bytes()).all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    let hours: u32 = h.parse().map_err(|_| invalid())?;
    let minutes: u32 = m.parse().map_err(|_| invalid())?;

    if minutes > 59 || hours > 24 || (hours == 24 && minutes != 0) {
        return Err(invalid());
    }
    Ok(hours * 60 + minutes)
}

fn format_clock(minute: u32) -> String {
    format!("{:02}:{:02}", minute / 60, minute % 60)
}

// ── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_valid_interval() {
        let i = Interval::new(480, 1020).unwrap();
        assert_eq!(i.start(), 480);
        assert_eq!(i.end(), 1020);
        assert_eq!(i.len(), 540);
    }

    #[test]
    fn test_new_whole_day() {
        let i = Interval::new(0, MINUTES_PER_DAY).unwrap();
        assert_eq!(i.len(), 1440);
    }

    #[test]
    fn test_new_rejects_empty() {
        let err = Interval::new(600, 600).unwrap_err().to_string();
        assert!(err.contains("Invalid interval"), "got: {err}");
    }

    #[test]
    fn test_new_rejects_reversed() {
        assert!(Interval::new(700, 600).is_err());
    }

    #[test]
    fn test_new_rejects_past_midnight() {
        assert!(Interval::new(1400, 1441).is_err());
    }

    #[test]
    fn test_from_minutes_rejects_negative() {
        assert!(Interval::from_minutes(-10, 30).is_err());
    }

    #[test]
    fn test_overlap_is_half_open() {
        let a = Interval::new(600, 660).unwrap();
        let touching = Interval::new(660, 720).unwrap();
        let crossing = Interval::new(650, 700).unwrap();
        assert!(!a.overlaps(&touching));
        assert!(!touching.overlaps(&a));
        assert!(a.overlaps(&crossing));
        assert!(crossing.overlaps(&a));
    }

    #[test]
    fn test_contains() {
        let window = Interval::new(480, 1020).unwrap();
        assert!(window.contains(&Interval::new(480, 510).unwrap()));
        assert!(window.contains(&Interval::new(990, 1020).unwrap()));
        assert!(!window.contains(&Interval::new(1000, 1030).unwrap()));
    }

    #[test]
    fn test_head() {
        let seg = Interval::new(570, 600).unwrap();
        assert_eq!(seg.head(30), Some(seg));
        assert_eq!(seg.head(10), Some(Interval::new(570, 580).unwrap()));
        assert_eq!(seg.head(31), None);
        assert_eq!(seg.head(0), None);
    }

    #[test]
    fn test_parse_text() {
        let i: Interval = "08:00-17:00".parse().unwrap();
        assert_eq!(i, Interval::new(480, 1020).unwrap());
        let i: Interval = " 9:30 - 24:00 ".parse().unwrap();
        assert_eq!(i, Interval::new(570, 1440).unwrap());
    }

    #[test]
    fn test_parse_text_rejects_garbage() {
        for bad in ["", "08:00", "8-17", "08:60-09:00", "24:30-25:00", "ab:cd-10:00", "10:00-09:00"] {
            assert!(bad.parse::<Interval>().is_err(), "accepted '{bad}'");
        }
    }

    #[test]
    fn test_display_round_trips_through_text() {
        let i = Interval::new(545, 1440).unwrap();
        assert_eq!(i.to_string(), "09:05-24:00");
    }

    #[test]
    fn test_deserialize_validates() {
        let ok: Interval = serde_json::from_str(r#"{"start":480,"end":600}"#).unwrap();
        assert_eq!(ok.len(), 120);
        assert!(serde_json::from_str::<Interval>(r#"{"start":600,"end":480}"#).is_err());
    }
}
