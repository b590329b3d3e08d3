//! Property tests for the advisor contracts.

use evenday::{free_segments, Advisor, DaySchedule, Interval, WindowSet};
use proptest::prelude::*;

/// Disjoint, sorted windows built from a list of cut points.
fn arb_windows() -> impl Strategy<Value = WindowSet> {
    prop::collection::btree_set(0u32..=1440, 0..8).prop_map(|cuts| {
        let cuts: Vec<u32> = cuts.into_iter().collect();
        let windows = cuts
            .chunks_exact(2)
            .filter_map(|pair| Interval::new(pair[0], pair[1]).ok())
            .collect();
        WindowSet::new(windows).expect("chunks of a sorted set are disjoint")
    })
}

fn arb_interval() -> impl Strategy<Value = Interval> {
    (0u32..1440, 1u32..=240).prop_filter_map("fits in a day", |(start, len)| {
        Interval::new(start, start + len).ok()
    })
}

fn arb_schedule() -> impl Strategy<Value = DaySchedule> {
    prop::collection::vec(arb_interval(), 0..10).prop_map(DaySchedule::new)
}

proptest! {
    #[test]
    fn candidates_fit_windows_and_avoid_taken(
        open in arb_windows(),
        taken in arb_schedule(),
        request in arb_interval(),
        amount in 0usize..6,
    ) {
        let result = Advisor::new(&open, &taken).amount(amount).advise(&request);
        prop_assert!(result.len() <= amount);
        for c in &result {
            prop_assert_eq!(c.len(), request.len());
            prop_assert!(open.contains(c), "{} outside windows", c);
            prop_assert!(!taken.is_taken(c), "{} overlaps a booking", c);
        }
    }

    #[test]
    fn candidates_are_ranked_by_distance(
        open in arb_windows(),
        taken in arb_schedule(),
        request in arb_interval(),
    ) {
        let result = Advisor::new(&open, &taken).amount(usize::MAX).advise(&request);
        for pair in result.windows(2) {
            let (a, b) = (pair[0].start_distance(&request), pair[1].start_distance(&request));
            prop_assert!(a < b || (a == b && pair[0].start() < pair[1].start()));
        }
    }

    #[test]
    fn something_is_found_iff_a_long_enough_segment_exists(
        open in arb_windows(),
        taken in arb_schedule(),
        request in arb_interval(),
    ) {
        let fits = free_segments(&open, &taken).iter().any(|s| s.len() >= request.len());
        let result = Advisor::new(&open, &taken).advise(&request);
        prop_assert_eq!(fits, !result.is_empty());
    }

    #[test]
    fn free_segments_are_disjoint_and_free(
        open in arb_windows(),
        taken in arb_schedule(),
    ) {
        let free = free_segments(&open, &taken);
        for pair in free.windows(2) {
            prop_assert!(pair[0].end() <= pair[1].start());
        }
        for s in &free {
            prop_assert!(open.contains(s));
            prop_assert!(!taken.is_taken(s));
        }
    }
}
