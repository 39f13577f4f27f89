//! Root-cause attribution for Cumulative Layout Shift.
//!
//! Orchestrates the four candidate correlators over one navigation's events:
//! scope every candidate kind to the context bounds, flatten the navigation's
//! shift clusters into an arena, eagerly allocate one root-cause record per
//! shift, then let each correlator append its implications. The worst cluster
//! is the in-scope cluster with the highest cumulative score; ties keep the
//! first encountered.

use serde::{Deserialize, Serialize};

use crate::animation_failures::NonCompositedFailure;
use crate::insight::{HandlerDependency, InsightKind, InsightWarning, RelatedEvent};
use crate::parsed_trace::{InsightContext, ParsedTrace};
use crate::root_causes::{
    correlate_animations, correlate_font_requests, correlate_iframes, correlate_unsized_images,
    RootCauseRegistry, RootCauses,
};
use crate::shift_grouping::shifts_by_pre_paint;
use crate::timing::ensure_sorted_by_ts;
use crate::trace_event::{LayoutShift, ResourceType, ShiftCluster};

/// Handlers this insight reads.
pub fn deps() -> &'static [HandlerDependency] {
    &[
        HandlerDependency::Meta,
        HandlerDependency::Animations,
        HandlerDependency::LayoutShifts,
        HandlerDependency::NetworkRequests,
    ]
}

// ---------------------------------------------------------------------------
// Result records
// ---------------------------------------------------------------------------

/// One in-scope layout shift with its accumulated root causes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributedShift {
    pub shift: LayoutShift,
    /// Index of the owning cluster in the insight's cluster list.
    pub cluster_index: usize,
    pub root_causes: RootCauses,
}

/// Immutable result of one CLS-culprits computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClsCulpritsInsight {
    pub kind: InsightKind,
    /// Every in-scope shift, ascending by `ts`, each with its root causes.
    pub shifts: Vec<AttributedShift>,
    /// In-scope clusters in original order.
    pub clusters: Vec<ShiftCluster>,
    /// Index of the highest-cumulative-score cluster, when any exist.
    pub worst_cluster_index: Option<usize>,
    /// Every non-composited animation failure in scope, attributed or not.
    pub animation_failures: Vec<NonCompositedFailure>,
    pub related_events: Vec<RelatedEvent>,
    pub warnings: Vec<InsightWarning>,
}

// ---------------------------------------------------------------------------
// Generator
// ---------------------------------------------------------------------------

/// Compute layout-shift root causes for one navigation context.
pub fn generate_insight(trace: &ParsedTrace, context: &InsightContext) -> ClsCulpritsInsight {
    let bounds = context.bounds;
    let shift_data = &trace.layout_shifts;

    // Scope every candidate-event kind to the context window, repairing sort
    // order defensively where a caller violated the precondition.
    let mut pre_paints = bounds.filter_in_bounds(&shift_data.pre_paint_events);
    ensure_sorted_by_ts(&mut pre_paints);
    let mut iframe_events = bounds.filter_in_bounds(&shift_data.iframe_created_events);
    ensure_sorted_by_ts(&mut iframe_events);
    let mut dom_loading_events = bounds.filter_in_bounds(&shift_data.dom_loading_events);
    ensure_sorted_by_ts(&mut dom_loading_events);
    let mut unsized_images = bounds.filter_in_bounds(&shift_data.unsized_image_events);
    ensure_sorted_by_ts(&mut unsized_images);
    let mut paint_images = bounds.filter_in_bounds(&shift_data.paint_image_events);
    ensure_sorted_by_ts(&mut paint_images);
    let mut animations = bounds.filter_in_bounds(&trace.animations.animations);
    ensure_sorted_by_ts(&mut animations);
    let mut font_requests: Vec<_> = trace
        .network
        .by_time
        .iter()
        .filter(|request| request.resource_type == ResourceType::Font)
        .filter(|request| bounds.contains(*request))
        .cloned()
        .collect();
    ensure_sorted_by_ts(&mut font_requests);

    // Clusters for this navigation (or the pre-navigation bucket), then the
    // flattened shift arena the accumulators are keyed by.
    let clusters: Vec<ShiftCluster> = shift_data
        .clusters_for(context.navigation_id.as_ref())
        .iter()
        .filter(|cluster| bounds.contains(*cluster))
        .cloned()
        .collect();
    let worst_cluster_index = worst_cluster(&clusters);

    let mut shifts: Vec<(usize, LayoutShift)> = Vec::new();
    for (cluster_idx, cluster) in clusters.iter().enumerate() {
        for shift in &cluster.shifts {
            if bounds.contains(shift) {
                shifts.push((cluster_idx, shift.clone()));
            }
        }
    }
    shifts.sort_by_key(|(_, shift)| shift.timing.ts_micros);
    let shift_arena: Vec<LayoutShift> = shifts.iter().map(|(_, s)| s.clone()).collect();

    let grouped = shifts_by_pre_paint(&shift_arena, &pre_paints);
    let mut registry = RootCauseRegistry::with_shift_count(shift_arena.len());

    correlate_iframes(
        &iframe_events,
        &dom_loading_events,
        &pre_paints,
        &grouped,
        &mut registry,
    );
    correlate_font_requests(&font_requests, &pre_paints, &grouped, &mut registry);
    let animation_failures =
        correlate_animations(&animations, &pre_paints, &grouped, &mut registry);
    correlate_unsized_images(
        &unsized_images,
        &paint_images,
        &pre_paints,
        &grouped,
        &mut registry,
    );

    let records = registry.into_records();
    let attributed: Vec<AttributedShift> = shifts
        .into_iter()
        .zip(records)
        .map(|((cluster_index, shift), root_causes)| AttributedShift {
            shift,
            cluster_index,
            root_causes,
        })
        .collect();

    let mut related_events: Vec<RelatedEvent> =
        (0..attributed.len()).map(RelatedEvent::Shift).collect();
    if let Some(worst) = worst_cluster_index {
        related_events.push(RelatedEvent::Cluster(worst));
    }

    ClsCulpritsInsight {
        kind: InsightKind::ClsCulprits,
        shifts: attributed,
        clusters,
        worst_cluster_index,
        animation_failures,
        related_events,
        warnings: Vec::new(),
    }
}

/// Index of the cluster with the highest cumulative score; the first
/// encountered wins ties.
fn worst_cluster(clusters: &[ShiftCluster]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (idx, cluster) in clusters.iter().enumerate() {
        match best {
            Some((_, score)) if cluster.cumulative_score <= score => {}
            _ => best = Some((idx, cluster.cumulative_score)),
        }
    }
    best.map(|(idx, _)| idx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timing::{EventTiming, TimeBounds};
    use crate::trace_event::FrameId;

    fn cluster(ts: u64, dur: u64, score: f64, shift_ts: &[u64]) -> ShiftCluster {
        ShiftCluster {
            timing: EventTiming::new(ts, dur),
            shifts: shift_ts
                .iter()
                .map(|&t| LayoutShift {
                    timing: EventTiming::instant(t),
                    score: score / shift_ts.len() as f64,
                })
                .collect(),
            cumulative_score: score,
        }
    }

    // -- Worst-cluster selection --

    #[test]
    fn worst_cluster_prefers_highest_score() {
        let clusters = vec![
            cluster(100, 10, 0.1, &[100]),
            cluster(300, 10, 0.4, &[300]),
            cluster(500, 10, 0.2, &[500]),
        ];
        assert_eq!(worst_cluster(&clusters), Some(1));
    }

    #[test]
    fn worst_cluster_tie_keeps_first() {
        let clusters = vec![
            cluster(100, 10, 0.4, &[100]),
            cluster(300, 10, 0.4, &[300]),
        ];
        assert_eq!(worst_cluster(&clusters), Some(0));
    }

    #[test]
    fn worst_cluster_empty_is_none() {
        assert_eq!(worst_cluster(&[]), None);
    }

    // -- Generator scoping --

    #[test]
    fn every_in_scope_shift_gets_a_record() {
        let mut trace = ParsedTrace::default();
        trace.layout_shifts.clusters_by_navigation = vec![crate::parsed_trace::NavigationClusters {
            navigation_id: None,
            clusters: vec![cluster(1_000, 100, 0.3, &[1_010, 1_040, 1_090])],
        }];
        let context = InsightContext {
            bounds: TimeBounds::new(0, 10_000),
            frame_id: FrameId("F1".to_string()),
            navigation_id: None,
            simulation: None,
        };
        let insight = generate_insight(&trace, &context);
        assert_eq!(insight.shifts.len(), 3);
        for attributed in &insight.shifts {
            assert!(attributed.root_causes.iframe_ids.is_empty());
            assert!(attributed.root_causes.font_requests.is_empty());
            assert!(attributed.root_causes.non_composited_animations.is_empty());
            assert!(attributed.root_causes.unsized_image_node_ids.is_empty());
        }
        assert_eq!(insight.worst_cluster_index, Some(0));
        // All shifts plus the worst cluster.
        assert_eq!(insight.related_events.len(), 4);
    }

    #[test]
    fn out_of_bounds_shifts_are_excluded() {
        let mut trace = ParsedTrace::default();
        trace.layout_shifts.clusters_by_navigation = vec![crate::parsed_trace::NavigationClusters {
            navigation_id: None,
            clusters: vec![cluster(1_000, 100, 0.3, &[1_010, 9_999_999])],
        }];
        let context = InsightContext {
            bounds: TimeBounds::new(0, 10_000),
            frame_id: FrameId("F1".to_string()),
            navigation_id: None,
            simulation: None,
        };
        let insight = generate_insight(&trace, &context);
        assert_eq!(insight.shifts.len(), 1);
    }
}
