//! Grouping of layout shifts by the pre-paint pass that produced them.
//!
//! Shifts are computed during a pre-paint pass, so a shift belongs to the
//! pass whose `[ts, ts + dur]` window contains its timestamp. Both inputs
//! are arena slices sorted ascending by `ts`; the result maps pre-paint
//! arena indices to contiguous runs of shift arena indices. Passes that
//! produced no shifts are absent from the map.

use std::collections::BTreeMap;

use crate::event_lookup::first_index_at_or_after;
use crate::timing::Timed;
use crate::trace_event::{LayoutShift, PrePaint};

/// Map from pre-paint arena index to the shifts inside its window, in
/// original shift order.
pub type ShiftsByPrePaint = BTreeMap<usize, Vec<usize>>;

/// Group `shifts` by the pre-paint pass whose window contains them.
pub fn shifts_by_pre_paint(shifts: &[LayoutShift], pre_paints: &[PrePaint]) -> ShiftsByPrePaint {
    let mut grouped = ShiftsByPrePaint::new();
    for (pp_idx, pre_paint) in pre_paints.iter().enumerate() {
        let window_end = pre_paint.end_micros();
        let first = first_index_at_or_after(shifts, pre_paint.ts_micros());
        // Shifts are sorted, so the window's members are one contiguous run.
        let mut members = Vec::new();
        for (offset, shift) in shifts[first..].iter().enumerate() {
            if shift.ts_micros() > window_end {
                break;
            }
            members.push(first + offset);
        }
        if !members.is_empty() {
            grouped.insert(pp_idx, members);
        }
    }
    grouped
}
