//! Mobile-viewport fitness check for one navigation.
//!
//! Every compositor frame commit records whether it was produced with
//! mobile-optimized viewport metadata. The page is mobile-optimized only if
//! every in-scope commit says so; the first counter-example decides. A trace
//! with no commits for the context yields a `no_layout` warning, not an
//! error, since traces routinely cover partial page lifecycles.

use serde::{Deserialize, Serialize};

use crate::insight::{HandlerDependency, InsightKind, InsightWarning};
use crate::parsed_trace::{InsightContext, ParsedTrace};
use crate::trace_event::MetaViewportEvent;

/// Handlers this insight reads.
pub fn deps() -> &'static [HandlerDependency] {
    &[HandlerDependency::Meta, HandlerDependency::LayoutShifts]
}

/// Immutable result of one viewport computation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewportInsight {
    pub kind: InsightKind,
    /// `Some(true)` when every in-scope commit was mobile-optimized,
    /// `Some(false)` on the first counter-example, `None` without layout
    /// data.
    pub mobile_optimized: Option<bool>,
    /// The parsed meta-viewport tag for the context, when one was recorded.
    pub viewport_event: Option<MetaViewportEvent>,
    pub warnings: Vec<InsightWarning>,
}

/// Check whether every compositor commit for the context was produced with
/// mobile-optimized viewport metadata.
pub fn generate_insight(trace: &ParsedTrace, context: &InsightContext) -> ViewportInsight {
    let shift_data = &trace.layout_shifts;
    let mut commits = shift_data
        .compositor_commit_events
        .iter()
        .filter(|commit| commit.frame == context.frame_id)
        .filter(|commit| context.bounds.contains(*commit))
        .peekable();

    if commits.peek().is_none() {
        return ViewportInsight {
            kind: InsightKind::Viewport,
            mobile_optimized: None,
            viewport_event: None,
            warnings: vec![InsightWarning::NoLayout],
        };
    }

    // Short-circuits on the first non-optimized commit.
    let mobile_optimized = commits.all(|commit| commit.is_mobile_optimized);

    let viewport_event = shift_data
        .meta_viewport_events
        .iter()
        .find(|event| event.frame == context.frame_id && context.bounds.contains(*event))
        .cloned();

    ViewportInsight {
        kind: InsightKind::Viewport,
        mobile_optimized: Some(mobile_optimized),
        viewport_event,
        warnings: Vec::new(),
    }
}
