//! Microsecond timing primitives shared by every trace event kind.
//!
//! All trace timestamps are monotonic microseconds from trace start. An
//! event's end time is `ts + dur`, or `ts` for instant events with no
//! duration. Callers are required to hand generators per-kind sequences
//! sorted ascending by `ts`; `ensure_sorted_by_ts` re-sorts defensively so a
//! violated precondition degrades to a stable sort instead of silently wrong
//! correlation results.

use serde::{Deserialize, Serialize};

/// Microseconds per millisecond, for converting wall-unit thresholds into
/// trace units.
pub const MICROS_PER_MILLI: u64 = 1_000;

/// Convert a millisecond quantity into trace microseconds.
pub const fn millis_to_micros(millis: u64) -> u64 {
    millis * MICROS_PER_MILLI
}

/// Convert trace microseconds into fractional milliseconds.
pub fn micros_to_millis(micros: u64) -> f64 {
    micros as f64 / MICROS_PER_MILLI as f64
}

// ---------------------------------------------------------------------------
// EventTiming — the common base every event kind embeds
// ---------------------------------------------------------------------------

/// Start timestamp and duration of one trace occurrence, in microseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventTiming {
    /// Monotonic start timestamp (microseconds).
    pub ts_micros: u64,
    /// Duration in microseconds; zero for instant events.
    pub dur_micros: u64,
}

impl EventTiming {
    pub const fn new(ts_micros: u64, dur_micros: u64) -> Self {
        Self {
            ts_micros,
            dur_micros,
        }
    }

    /// An instant occurrence with no duration.
    pub const fn instant(ts_micros: u64) -> Self {
        Self::new(ts_micros, 0)
    }

    /// End timestamp: `ts + dur` (saturating; traces never reach u64::MAX in
    /// practice but a malformed duration must not wrap).
    pub const fn end_micros(&self) -> u64 {
        self.ts_micros.saturating_add(self.dur_micros)
    }
}

/// Capability shared by every event kind: access to its timing base.
pub trait Timed {
    fn timing(&self) -> &EventTiming;

    fn ts_micros(&self) -> u64 {
        self.timing().ts_micros
    }

    fn end_micros(&self) -> u64 {
        self.timing().end_micros()
    }
}

impl Timed for EventTiming {
    fn timing(&self) -> &EventTiming {
        self
    }
}

// ---------------------------------------------------------------------------
// TimeBounds — a closed scope window
// ---------------------------------------------------------------------------

/// Closed time window `[min, max]` scoping one navigation or the whole trace.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeBounds {
    pub min_micros: u64,
    pub max_micros: u64,
}

impl TimeBounds {
    pub const fn new(min_micros: u64, max_micros: u64) -> Self {
        Self {
            min_micros,
            max_micros,
        }
    }

    /// True when the event's start timestamp falls inside the window.
    pub fn contains<T: Timed>(&self, event: &T) -> bool {
        let ts = event.ts_micros();
        self.min_micros <= ts && ts <= self.max_micros
    }

    /// Retain only events whose start timestamp falls inside the window,
    /// preserving input order.
    pub fn filter_in_bounds<T: Timed + Clone>(&self, events: &[T]) -> Vec<T> {
        events.iter().filter(|e| self.contains(*e)).cloned().collect()
    }
}

// ---------------------------------------------------------------------------
// Sortedness — defensive precondition enforcement
// ---------------------------------------------------------------------------

/// True when the sequence is non-decreasing by start timestamp.
pub fn is_sorted_by_ts<T: Timed>(events: &[T]) -> bool {
    events.windows(2).all(|w| w[0].ts_micros() <= w[1].ts_micros())
}

/// Sort the sequence by start timestamp if (and only if) it violates the
/// sorted-input precondition. Stable, so equal-`ts` events keep their
/// original relative order.
pub fn ensure_sorted_by_ts<T: Timed>(events: &mut Vec<T>) {
    if !is_sorted_by_ts(events) {
        events.sort_by_key(|e| e.ts_micros());
    }
}
