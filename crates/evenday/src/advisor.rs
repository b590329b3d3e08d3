//! Free-slot search and proximity ranking.
//!
//! Given the open windows of a weekday and the intervals already taken on a
//! concrete date, the [`Advisor`] suggests where a booking of a requested
//! length could go instead:
//!
//! 1. Subtract every taken interval from every open window, leaving maximal
//!    disjoint free segments.
//! 2. Drop segments shorter than the request.
//! 3. Each remaining segment yields exactly one candidate: its earliest
//!    sub-range of the requested length.
//! 4. Rank candidates by distance between their start and the requested
//!    start; ties go to the earlier candidate.
//! 5. Keep the first `amount` candidates.
//!
//! The advisor is pure and holds only shared borrows, so one instance can be
//! used from many threads at once.

use crate::interval::Interval;
use crate::schedule::DaySchedule;
use crate::timetable::WindowSet;

/// Ranks free slots of a day against a requested interval.
#[derive(Debug, Clone, Copy)]
pub struct Advisor<'a> {
    open: &'a WindowSet,
    taken: &'a DaySchedule,
    amount: usize,
}

impl<'a> Advisor<'a> {
    /// An advisor returning a single suggestion by default.
    pub fn new(open: &'a WindowSet, taken: &'a DaySchedule) -> Self {
        Self {
            open,
            taken,
            amount: 1,
        }
    }

    /// Set the maximum number of suggestions returned by [`Advisor::advise`].
    pub fn amount(mut self, amount: usize) -> Self {
        self.amount = amount;
        self
    }

    /// Rank free candidates for `request`.
    ///
    /// Every candidate is exactly `request.len()` minutes long, lies inside one
    /// open window, and overlaps no taken interval. The result is ordered by
    /// non-decreasing distance from `request.start()` and holds at most
    /// `amount` entries; it is empty when nothing fits.
    ///
    /// # Examples
    ///
    /// ```
    /// use evenday::{Advisor, DaySchedule, Interval, WindowSet};
    ///
    /// let open = WindowSet::parse("08:00-17:00").unwrap();
    /// let taken = DaySchedule::new(vec![
    ///     Interval::new(480, 570).unwrap(),
    ///     Interval::new(600, 660).unwrap(),
    /// ]);
    /// let request = Interval::new(570, 600).unwrap();
    ///
    /// let best = Advisor::new(&open, &taken).advise(&request);
    /// assert_eq!(best, vec![Interval::new(570, 600).unwrap()]);
    /// ```
    pub fn advise(&self, request: &Interval) -> Vec<Interval> {
        if self.amount == 0 {
            return Vec::new();
        }

        let mut candidates: Vec<Interval> = free_segments(self.open, self.taken)
            .iter()
            .filter_map(|segment| segment.head(request.len()))
            .collect();

        candidates.sort_by_key(|c| (c.start_distance(request), c.start()));
        candidates.truncate(self.amount);
        candidates
    }
}

/// The maximal free segments left in `open` once `taken` is removed.
///
/// Taken intervals may overlap each other or reach outside the windows; only
/// the portions inside a window matter. Segments come out sorted by start.
pub fn free_segments(open: &WindowSet, taken: &DaySchedule) -> Vec<Interval> {
    let mut free = Vec::new();

    for window in open.windows() {
        let mut blocking: Vec<&Interval> =
            taken.taken().iter().filter(|t| t.overlaps(window)).collect();
        blocking.sort_by_key(|t| t.start());

        let mut cursor = window.start();
        for t in blocking {
            if t.start() > cursor {
                push_segment(&mut free, cursor, t.start());
            }
            cursor = cursor.max(t.end());
            if cursor >= window.end() {
                break;
            }
        }
        if cursor < window.end() {
            push_segment(&mut free, cursor, window.end());
        }
    }

    free
}

fn push_segment(free: &mut Vec<Interval>, start: u32, end: u32) {
    // Bounds come from already-valid intervals with start < end.
    if let Ok(segment) = Interval::new(start, end) {
        free.push(segment);
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────
