//! Property-Based Tests for Slabs Module
//!
//! Uses proptest to check parsing, aggregation and derived metrics over
//! generated server replies.

use proptest::prelude::*;

use crate::protocol::{ResponseKind, StatLine};
use crate::slabs::{
    wasted_memory_percent, ExpireStatus, GrowthProgression, SlabRecord, SlabStats,
};

// == Strategies ==
/// Reply lines that are not `STAT` lines
fn non_stat_line_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-z ]{0,20}".prop_map(|s| s),
        "ITEM [a-z]{1,8} \\[[0-9]{1,4} b; [0-9]{1,10} s\\]".prop_map(|s| s),
        Just("ERROR".to_string()),
        Just("VERSION 1.6.21".to_string()),
    ]
}

/// `(slab ids, chunk sizes)` for a `stats slabs` reply
fn slab_ids_strategy() -> impl Strategy<Value = Vec<(u32, u64)>> {
    prop::collection::vec((1u32..64, 48u64..1_048_576), 1..20)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // Replies without STAT lines produce no records
    #[test]
    fn prop_no_stat_lines_no_records(
        lines in prop::collection::vec(non_stat_line_strategy(), 0..20)
    ) {
        let stats = SlabStats::from_responses(&lines, &lines);
        prop_assert!(stats.classes.is_empty());
        prop_assert!(stats.total.is_empty());

        for line in &lines {
            let parsed = StatLine::classify(ResponseKind::Stats, line);
            prop_assert_eq!(parsed, StatLine::Unrecognized);
        }
    }

    // Every slab id of `stats slabs` gets a record, item fields defaulted
    #[test]
    fn prop_slab_without_items_defaulted(slabs in slab_ids_strategy()) {
        let lines: Vec<String> = slabs
            .iter()
            .map(|(id, chunk)| format!("STAT {}:chunk_size {}", id, chunk))
            .collect();
        let stats = SlabStats::from_responses(&lines, &[]);

        for (id, _) in &slabs {
            let record = stats.get(*id);
            prop_assert!(record.is_some());
            let record = record.unwrap();
            prop_assert_eq!(record.number, 0);
            prop_assert_eq!(record.age, 0);
            prop_assert_eq!(record.evicted, 0);
            prop_assert_eq!(record.evicted_time, 0);
            prop_assert_eq!(record.outofmemory, 0);
        }
    }

    // Last write wins within one reply
    #[test]
    fn prop_last_chunk_size_wins(id in 1u32..64, first in 1u64..10_000, second in 1u64..10_000) {
        let lines = vec![
            format!("STAT {}:chunk_size {}", id, first),
            format!("STAT {}:chunk_size {}", id, second),
        ];
        let stats = SlabStats::from_responses(&lines, &[]);
        prop_assert_eq!(stats.get(id).map(|r| r.chunk_size), Some(second));
    }

    // Wasted percentage stays within [0, 100] when requested <= allocated
    #[test]
    fn prop_wasted_in_range(
        chunk in 1u64..1_048_576,
        number in 1u64..100_000,
        ratio in 0.0f64..=1.0
    ) {
        let allocated = chunk * number;
        let requested = (allocated as f64 * ratio) as u64;
        let wasted = wasted_memory_percent(requested.min(allocated), chunk, number);
        prop_assert!((0.0..=100.0).contains(&wasted), "wasted = {}", wasted);
    }

    // Empty classes waste nothing
    #[test]
    fn prop_wasted_zero_for_empty(chunk in 0u64..1_048_576, requested in 0u64..1_000_000) {
        prop_assert_eq!(wasted_memory_percent(requested, chunk, 0), 0.0);
    }

    // Full iff no free chunks at the end
    #[test]
    fn prop_full_iff_no_free_chunks_end(free in 0u64..3) {
        let record = SlabRecord { free_chunks_end: free, ..SlabRecord::default() };
        prop_assert_eq!(record.is_full(), free == 0);
    }

    // The progression terminates and matches repeated multiplication
    #[test]
    fn prop_page_count_matches_multiplication(
        factor in 1.01f64..4.0,
        max in 97u64..(64 * 1024 * 1024)
    ) {
        let progression = GrowthProgression::new(factor, max).unwrap();
        let pages = progression.page_count();

        let last = 96.0 * factor.powi((pages - 1) as i32);
        prop_assert!(last * factor >= max as f64 * (1.0 - 1e-9));
        if pages > 1 {
            prop_assert!(last < max as f64 * (1.0 + 1e-9));
        }
    }

    // The chunk chosen for a size holds it, unless clamped to the max
    #[test]
    fn prop_chunk_holds_size(factor in 1.01f64..4.0, size in 1u64..2_000_000) {
        let max = 1_048_576u64;
        let progression = GrowthProgression::new(factor, max).unwrap();
        let chunk = progression.chunk_for_size(size);

        prop_assert!(chunk <= max as f64);
        if size <= max {
            prop_assert!(chunk >= size as f64);
        } else {
            prop_assert_eq!(chunk, max as f64);
        }
    }

    // Items stored with the start time never expire
    #[test]
    fn prop_start_time_never_expires(start in 0i64..2_000_000_000, now in 0i64..2_000_000_000) {
        prop_assert_eq!(ExpireStatus::classify(start, now, start), ExpireStatus::NeverExpires);
    }

    // Otherwise the remaining seconds add up to the expiration
    #[test]
    fn prop_remaining_adds_up(now in 0i64..2_000_000_000, left in 0u64..1_000_000) {
        let expiration = now + left as i64;
        match ExpireStatus::classify(expiration, now, -1) {
            ExpireStatus::Remaining(secs) => prop_assert_eq!(secs, left),
            other => prop_assert!(false, "unexpected status {:?}", other),
        }
    }
}
