//! Interval and nearest-neighbor lookups over sorted event sequences.
//!
//! Every helper here requires its input slice to be sorted ascending by
//! `ts`; the generators enforce that with `timing::ensure_sorted_by_ts`
//! before correlation runs. Lookups are binary-search based so correlation
//! stays sub-quadratic on large traces.

use crate::timing::{millis_to_micros, Timed};

/// How far back from a rendering pass a candidate cause may end and still be
/// considered plausibly causal.
pub const ROOT_CAUSE_WINDOW_MICROS: u64 = millis_to_micros(500);

// ---------------------------------------------------------------------------
// Root-cause window test
// ---------------------------------------------------------------------------

/// True iff `event` ended strictly before `target` started, and no more than
/// [`ROOT_CAUSE_WINDOW_MICROS`] before it. The lower bound is closed: an
/// event ending exactly 500 ms before the target is in window. The upper
/// bound is open: an event ending exactly at `target.ts` is not.
pub fn is_in_root_cause_window<E: Timed, T: Timed>(event: &E, target: &T) -> bool {
    let end = event.end_micros();
    let target_ts = target.ts_micros();
    let window_start = target_ts.saturating_sub(ROOT_CAUSE_WINDOW_MICROS);
    window_start <= end && end < target_ts
}

// ---------------------------------------------------------------------------
// Nearest-following-event lookup
// ---------------------------------------------------------------------------

/// Index of the first event in `sorted` starting strictly after `target`
/// ended, or `None` when the target outlasts every candidate.
pub fn next_event_index<E: Timed, T: Timed>(sorted: &[E], target: &T) -> Option<usize> {
    let target_end = target.end_micros();
    // partition_point: everything with ts <= target_end is on the left.
    let idx = sorted.partition_point(|e| e.ts_micros() <= target_end);
    (idx < sorted.len()).then_some(idx)
}

/// First event in `sorted` starting strictly after `target` ended.
pub fn next_event<'e, E: Timed, T: Timed>(sorted: &'e [E], target: &T) -> Option<&'e E> {
    next_event_index(sorted, target).map(|idx| &sorted[idx])
}

/// Index of the first event in `sorted` with `ts >= at_micros`, or
/// `sorted.len()` when every event starts earlier.
pub fn first_index_at_or_after<E: Timed>(sorted: &[E], at_micros: u64) -> usize {
    sorted.partition_point(|e| e.ts_micros() < at_micros)
}
