//! Per-shift root-cause accumulation and the four candidate correlators.
//!
//! Each correlator maps candidate-cause events of one kind onto the
//! pre-paint pass they preceded, then onto the layout shifts that pass
//! produced. Accumulators are keyed by shift arena index and allocated
//! eagerly before any correlator runs, so a grouped shift without a record
//! is a construction-order bug, not a recoverable condition.

use serde::{Deserialize, Serialize};

use crate::animation_failures::{non_composited_failures, NonCompositedFailure};
use crate::event_lookup::{is_in_root_cause_window, next_event, next_event_index};
use crate::shift_grouping::ShiftsByPrePaint;
use crate::timing::Timed;
use crate::trace_event::{
    AnimationEvent, DomLoadingEvent, DomNodeId, FrameId, IframeCreatedEvent, NetworkRequest,
    PaintImageEvent, PrePaint, UnsizedImageEvent,
};

// ---------------------------------------------------------------------------
// RootCauses — the per-shift accumulator
// ---------------------------------------------------------------------------

/// Candidate causes attributed to one layout shift. All four lists start
/// empty and stay empty unless a correlator implicates a candidate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RootCauses {
    /// Frames whose creation preceded the shift's rendering pass.
    pub iframe_ids: Vec<FrameId>,
    /// Font fetches that finished inside the causal window.
    pub font_requests: Vec<NetworkRequest>,
    /// Non-composited animation failures inside the causal window.
    pub non_composited_animations: Vec<NonCompositedFailure>,
    /// Unsized images painted right after the shift's rendering pass.
    pub unsized_image_node_ids: Vec<DomNodeId>,
}

/// Root-cause records for every in-scope shift, keyed by shift arena index.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RootCauseRegistry {
    per_shift: Vec<RootCauses>,
}

impl RootCauseRegistry {
    /// Eagerly allocate one empty record per shift.
    pub fn with_shift_count(shift_count: usize) -> Self {
        Self {
            per_shift: vec![RootCauses::default(); shift_count],
        }
    }

    pub fn len(&self) -> usize {
        self.per_shift.len()
    }

    pub fn is_empty(&self) -> bool {
        self.per_shift.is_empty()
    }

    pub fn for_shift(&self, shift_idx: usize) -> &RootCauses {
        &self.per_shift[shift_idx]
    }

    /// Mutable record for one shift. Panics when the shift was never
    /// allocated: correlators only see shift indices produced by the same
    /// grouping pass that sized this registry, so a miss is a logic bug.
    pub fn for_shift_mut(&mut self, shift_idx: usize) -> &mut RootCauses {
        let len = self.per_shift.len();
        self.per_shift.get_mut(shift_idx).unwrap_or_else(|| {
            panic!("layout shift {shift_idx} has no pre-allocated root-cause record (registry holds {len})")
        })
    }

    /// Consume the registry into the per-shift records, in shift order.
    pub fn into_records(self) -> Vec<RootCauses> {
        self.per_shift
    }
}

// ---------------------------------------------------------------------------
// Iframe correlator
// ---------------------------------------------------------------------------

/// Attribute iframe creations to the shifts of the pre-paint pass that
/// followed them. The created frame's id is recovered from the first
/// DOM-loading event inside the creation event's own span.
pub fn correlate_iframes(
    iframe_events: &[IframeCreatedEvent],
    dom_loading_events: &[DomLoadingEvent],
    pre_paints: &[PrePaint],
    grouped: &ShiftsByPrePaint,
    registry: &mut RootCauseRegistry,
) {
    for iframe_event in iframe_events {
        let Some(pp_idx) = next_event_index(pre_paints, iframe_event) else {
            continue;
        };
        let Some(shift_idxs) = grouped.get(&pp_idx) else {
            continue;
        };
        let Some(dom_loading) = dom_loading_events.iter().find(|e| {
            iframe_event.ts_micros() <= e.ts_micros() && e.ts_micros() <= iframe_event.end_micros()
        }) else {
            continue;
        };
        for &shift_idx in shift_idxs {
            registry
                .for_shift_mut(shift_idx)
                .iframe_ids
                .push(dom_loading.frame.clone());
        }
    }
}

// ---------------------------------------------------------------------------
// Font correlator
// ---------------------------------------------------------------------------

/// Attribute font fetches to the shifts of the following pre-paint pass,
/// when the fetch finished inside the 500 ms causal window.
pub fn correlate_font_requests(
    font_requests: &[NetworkRequest],
    pre_paints: &[PrePaint],
    grouped: &ShiftsByPrePaint,
    registry: &mut RootCauseRegistry,
) {
    for request in font_requests {
        let Some(pp_idx) = next_event_index(pre_paints, request) else {
            continue;
        };
        if !is_in_root_cause_window(request, &pre_paints[pp_idx]) {
            continue;
        }
        let Some(shift_idxs) = grouped.get(&pp_idx) else {
            continue;
        };
        for &shift_idx in shift_idxs {
            registry
                .for_shift_mut(shift_idx)
                .font_requests
                .push(request.clone());
        }
    }
}

// ---------------------------------------------------------------------------
// Animation correlator
// ---------------------------------------------------------------------------

/// Attribute non-composited animation failures to the shifts of the pre-paint
/// pass following each masked instant, when the instant is inside the 500 ms
/// causal window. Returns every decoded failure across all animations,
/// attributed or not, for the insight's top-level failure list.
pub fn correlate_animations(
    animations: &[AnimationEvent],
    pre_paints: &[PrePaint],
    grouped: &ShiftsByPrePaint,
    registry: &mut RootCauseRegistry,
) -> Vec<NonCompositedFailure> {
    let mut all_failures = Vec::new();
    for (animation_idx, animation) in animations.iter().enumerate() {
        let failures = non_composited_failures(animation, animation_idx);
        let masked_instants = animation
            .instants
            .iter()
            .filter(|instant| instant.composite_failed_mask != 0);
        for (instant, failure) in masked_instants.zip(&failures) {
            if let Some(pp_idx) = next_event_index(pre_paints, instant) {
                if is_in_root_cause_window(instant, &pre_paints[pp_idx]) {
                    if let Some(shift_idxs) = grouped.get(&pp_idx) {
                        for &shift_idx in shift_idxs {
                            registry
                                .for_shift_mut(shift_idx)
                                .non_composited_animations
                                .push(failure.clone());
                        }
                    }
                }
            }
        }
        all_failures.extend(failures);
    }
    all_failures
}

// ---------------------------------------------------------------------------
// Unsized-image correlator
// ---------------------------------------------------------------------------

/// Attribute unsized images to the shifts of each pre-paint pass: the paint
/// immediately following a pass is matched against unsized-image layout
/// events by node id, giving at most one match per pass.
pub fn correlate_unsized_images(
    unsized_images: &[UnsizedImageEvent],
    paint_images: &[PaintImageEvent],
    pre_paints: &[PrePaint],
    grouped: &ShiftsByPrePaint,
    registry: &mut RootCauseRegistry,
) {
    for (pp_idx, shift_idxs) in grouped {
        let Some(paint_image) = next_event(paint_images, &pre_paints[*pp_idx]) else {
            continue;
        };
        let Some(unsized_image) = unsized_images
            .iter()
            .find(|image| image.node_id == paint_image.node_id)
        else {
            continue;
        };
        for &shift_idx in shift_idxs {
            registry
                .for_shift_mut(shift_idx)
                .unsized_image_node_ids
                .push(unsized_image.node_id);
        }
    }
}
