//! Already-booked intervals of one professional on one calendar date.

use crate::calendar::Calendar;
use crate::error::EvendayError;
use crate::interval::Interval;

/// The taken intervals of a single day, in the order they were supplied.
///
/// A `DaySchedule` is a projection, not a validator: overlapping or duplicate
/// entries are kept as-is. The advisor tolerates them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DaySchedule {
    taken: Vec<Interval>,
}

impl DaySchedule {
    pub fn new(taken: Vec<Interval>) -> Self {
        Self { taken }
    }

    /// Project absolute `(from, to)` booking ranges onto minute-of-day intervals.
    ///
    /// # Errors
    ///
    /// Fails on the first range that does not form a valid same-day interval.
    pub fn from_ranges<I>(calendar: &Calendar, ranges: I) -> Result<Self, EvendayError>
    where
        I: IntoIterator<Item = (i64, i64)>,
    {
        ranges
            .into_iter()
            .map(|(from, to)| calendar.interval(from, to))
            .collect::<Result<Vec<_>, _>>()
            .map(Self::new)
    }

    pub fn taken(&self) -> &[Interval] {
        &self.taken
    }

    pub fn len(&self) -> usize {
        self.taken.len()
    }

    pub fn is_empty(&self) -> bool {
        self.taken.is_empty()
    }

    /// Whether `interval` overlaps any taken interval.
    pub fn is_taken(&self, interval: &Interval) -> bool {
        self.taken.iter().any(|t| t.overlaps(interval))
    }
}

impl FromIterator<Interval> for DaySchedule {
    fn from_iter<T: IntoIterator<Item = Interval>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_ranges() {
        let cal = Calendar::default();
        // 2026-03-16 10:00 UTC and 14:00 UTC
        let ten = 1_773_655_200;
        let two = ten + 4 * 3600;
        let day = DaySchedule::from_ranges(&cal, [(ten, ten + 3600), (two, two + 1800)]).unwrap();
        assert_eq!(
            day.taken(),
            &[Interval::new(600, 660).unwrap(), Interval::new(840, 870).unwrap()]
        );
    }

    #[test]
    fn test_from_ranges_rejects_degenerate() {
        let cal = Calendar::default();
        assert!(DaySchedule::from_ranges(&cal, [(100, 100)]).is_err());
    }

    #[test]
    fn test_overlaps_pass_through() {
        let a = Interval::new(600, 660).unwrap();
        let b = Interval::new(630, 700).unwrap();
        let day: DaySchedule = [a, b, a].into_iter().collect();
        assert_eq!(day.len(), 3);
    }

    #[test]
    fn test_is_taken() {
        let day = DaySchedule::new(vec![Interval::new(600, 660).unwrap()]);
        assert!(day.is_taken(&Interval::new(630, 690).unwrap()));
        assert!(!day.is_taken(&Interval::new(660, 690).unwrap()));
        assert!(!DaySchedule::default().is_taken(&Interval::new(0, 1440).unwrap()));
    }
}
