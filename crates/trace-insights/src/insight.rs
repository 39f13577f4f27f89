//! Shared contract between insight generators and the reporting layer.
//!
//! Each generator declares its parsing-handler dependencies statically,
//! returns an immutable result record, and annotates missing-but-optional
//! trace data with warning codes instead of failing. Title and description
//! strings come from a static table at finalize time; the localization
//! mechanism behind that table is a collaborator this crate treats as an
//! opaque string lookup.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Handler dependencies
// ---------------------------------------------------------------------------

/// A parsing handler whose output an insight reads. Declared statically via
/// each insight's `deps()` so an orchestrator can check data availability
/// before invoking the generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandlerDependency {
    Meta,
    Animations,
    LayoutShifts,
    NetworkRequests,
    PageLoadMetrics,
    Renderer,
}

// ---------------------------------------------------------------------------
// Insight kinds and strings
// ---------------------------------------------------------------------------

/// The insight kinds this crate computes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightKind {
    ClsCulprits,
    RenderBlocking,
    ThirdParties,
    Viewport,
}

impl fmt::Display for InsightKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ClsCulprits => "cls_culprits",
            Self::RenderBlocking => "render_blocking",
            Self::ThirdParties => "third_parties",
            Self::Viewport => "viewport",
        };
        f.write_str(name)
    }
}

/// Display strings attached to a finalized insight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InsightStrings {
    pub title: &'static str,
    pub description: &'static str,
}

/// Static title/description table, one entry per kind.
pub fn insight_strings(kind: InsightKind) -> InsightStrings {
    match kind {
        InsightKind::ClsCulprits => InsightStrings {
            title: "Layout shift culprits",
            description:
                "Layout shifts happen when elements move without user interaction. \
                 These are the root causes detected for the shifts on this page.",
        },
        InsightKind::RenderBlocking => InsightStrings {
            title: "Render-blocking requests",
            description:
                "Requests that block the initial render of the page. \
                 Deferring or inlining them can move first paint earlier.",
        },
        InsightKind::ThirdParties => InsightStrings {
            title: "Third parties",
            description:
                "Third-party code can significantly impact load performance. \
                 Transfer size and main-thread time are attributed per organization.",
        },
        InsightKind::Viewport => InsightStrings {
            title: "Mobile-optimized viewport",
            description:
                "Pages without a mobile-optimized viewport incur extra input delay \
                 and render at desktop widths on mobile devices.",
        },
    }
}

// ---------------------------------------------------------------------------
// Warnings
// ---------------------------------------------------------------------------

/// Symbolic codes a generator attaches when expected-but-optional trace data
/// is missing. A warned result is still valid, just mostly empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightWarning {
    /// The trace holds no first-paint event for the context's frame.
    NoFirstPaint,
    /// The trace holds no compositor layout data for the context.
    NoLayout,
}

impl fmt::Display for InsightWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoFirstPaint => f.write_str("no first paint event in trace"),
            Self::NoLayout => f.write_str("no layout data in trace"),
        }
    }
}

// ---------------------------------------------------------------------------
// Related events
// ---------------------------------------------------------------------------

/// Reference to an event a downstream renderer should highlight alongside an
/// insight. Arena indices refer into the result's own event lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelatedEvent {
    /// Index into the insight's shift list.
    Shift(usize),
    /// Index into the insight's cluster list.
    Cluster(usize),
    /// Index into the insight's request list.
    Request(usize),
}
