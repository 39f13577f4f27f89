//! Detection of requests that blocked the first paint.
//!
//! A request is render-blocking when the renderer marked it `blocking`, or
//! marked it `in_body_parser_blocking` and its priority suggests it appeared
//! early in body parsing: very-high priority, or a high-priority script. The
//! priority rule is a deliberate approximation; the trace carries no signal
//! for actual parser position.

use serde::{Deserialize, Serialize};

use crate::insight::{HandlerDependency, InsightKind, InsightWarning, RelatedEvent};
use crate::parsed_trace::{InsightContext, ParsedTrace};
use crate::timing::millis_to_micros;
use crate::trace_event::{
    NetworkRequest, PaintMilestoneKind, RenderBlockingBehavior, RequestPriority, ResourceType,
};

/// Download durations at or below this threshold are not worth reporting
/// per-request.
pub const MATERIAL_DOWNLOAD_MICROS: u64 = millis_to_micros(50);

/// Handlers this insight reads.
pub fn deps() -> &'static [HandlerDependency] {
    &[
        HandlerDependency::Meta,
        HandlerDependency::NetworkRequests,
        HandlerDependency::PageLoadMetrics,
    ]
}

// ---------------------------------------------------------------------------
// Result records
// ---------------------------------------------------------------------------

/// One request that blocked first paint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockingRequest {
    pub request: NetworkRequest,
    /// Download duration, reported only above [`MATERIAL_DOWNLOAD_MICROS`].
    pub material_download_micros: Option<u64>,
}

/// Immutable result of one render-blocking computation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderBlockingInsight {
    pub kind: InsightKind,
    /// Blocking requests in request order.
    pub requests: Vec<BlockingRequest>,
    /// Clamped-to-zero estimated first-contentful-paint savings were the
    /// blocking requests deferred; present only when the context supplied a
    /// simulation model.
    pub estimated_fcp_savings_micros: Option<u64>,
    pub related_events: Vec<RelatedEvent>,
    pub warnings: Vec<InsightWarning>,
}

impl RenderBlockingInsight {
    fn empty_with_warning(warning: InsightWarning) -> Self {
        Self {
            kind: InsightKind::RenderBlocking,
            requests: Vec::new(),
            estimated_fcp_savings_micros: None,
            related_events: Vec::new(),
            warnings: vec![warning],
        }
    }
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Whether the renderer's blocking marker, combined with the priority
/// heuristic for body-parser blocking, makes this request render-blocking.
pub fn is_render_blocking(request: &NetworkRequest) -> bool {
    match request.render_blocking {
        RenderBlockingBehavior::Blocking => true,
        RenderBlockingBehavior::InBodyParserBlocking => {
            request.priority == RequestPriority::VeryHigh
                || (request.priority == RequestPriority::High
                    && request.resource_type == ResourceType::Script)
        }
        RenderBlockingBehavior::PotentiallyBlocking | RenderBlockingBehavior::NonBlocking => false,
    }
}

// ---------------------------------------------------------------------------
// Generator
// ---------------------------------------------------------------------------

/// Compute the render-blocking request set for one navigation context.
pub fn generate_insight(trace: &ParsedTrace, context: &InsightContext) -> RenderBlockingInsight {
    let Some(first_paint) = trace.page_load.paint_milestones.iter().find(|paint| {
        paint.kind == PaintMilestoneKind::FirstPaint
            && paint.frame == context.frame_id
            && match (&paint.navigation_id, &context.navigation_id) {
                (Some(paint_nav), Some(context_nav)) => paint_nav == context_nav,
                _ => context.bounds.contains(*paint),
            }
    }) else {
        return RenderBlockingInsight::empty_with_warning(InsightWarning::NoFirstPaint);
    };
    let first_paint_micros = first_paint.timing.ts_micros;

    let mut blocking: Vec<(usize, &NetworkRequest)> = Vec::new();
    for (request_index, request) in trace.network.by_time.iter().enumerate() {
        if request.frame != context.frame_id {
            continue;
        }
        let in_navigation = match (&request.navigation_id, &context.navigation_id) {
            (Some(request_nav), Some(context_nav)) => request_nav == context_nav,
            _ => context.bounds.contains(request),
        };
        if !in_navigation {
            continue;
        }
        if request.finished_micros() >= first_paint_micros {
            continue;
        }
        if is_render_blocking(request) {
            blocking.push((request_index, request));
        }
    }

    let estimated_fcp_savings_micros = context.simulation.as_ref().map(|simulation| {
        let roots: Vec<usize> = blocking
            .iter()
            .flat_map(|(request_index, _)| simulation.graph.nodes_for_request(*request_index))
            .collect();
        let deferred = simulation.graph.subtree(&roots);
        let baseline = simulation.graph.baseline_micros();
        baseline.saturating_sub(simulation.graph.estimate_micros(&deferred))
    });

    let requests: Vec<BlockingRequest> = blocking
        .into_iter()
        .map(|(_, request)| BlockingRequest {
            request: request.clone(),
            material_download_micros: (request.download_dur_micros > MATERIAL_DOWNLOAD_MICROS)
                .then_some(request.download_dur_micros),
        })
        .collect();
    let related_events = (0..requests.len()).map(RelatedEvent::Request).collect();

    RenderBlockingInsight {
        kind: InsightKind::RenderBlocking,
        requests,
        estimated_fcp_savings_micros,
        related_events,
        warnings: Vec::new(),
    }
}
