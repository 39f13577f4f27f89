//! The consumed data contract with the upstream trace-parsing layer.
//!
//! A [`ParsedTrace`] is the already-materialized output of the parsing
//! handlers: per-kind event sequences sorted ascending by `ts`, navigation
//! metadata, and the renderer call tree. Insight generators only read from
//! it; nothing here is mutated after construction.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::simulation::SimulationContext;
use crate::timing::{EventTiming, TimeBounds, Timed};
use crate::trace_event::{
    AnimationEvent, CompositorCommitEvent, DomLoadingEvent, FrameId, IframeCreatedEvent,
    MetaViewportEvent, NavigationId, NetworkRequest, PaintImageEvent, PaintMilestone, PrePaint,
    ShiftCluster, UnsizedImageEvent,
};

// ---------------------------------------------------------------------------
// Meta — navigations and trace bounds
// ---------------------------------------------------------------------------

/// Bounds and identity of one navigation within the trace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationBounds {
    pub bounds: TimeBounds,
    pub frame: FrameId,
    /// Document URL the navigation committed to.
    pub url: String,
}

/// Trace-wide metadata from the Meta handler.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaData {
    pub trace_bounds: TimeBounds,
    pub main_frame_id: FrameId,
    pub navigations: BTreeMap<NavigationId, NavigationBounds>,
}

// ---------------------------------------------------------------------------
// LayoutShifts — clusters and rendering-pass events
// ---------------------------------------------------------------------------

/// Shift clusters scoped to one navigation, or to the pre-navigation
/// sentinel bucket when `navigation_id` is `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavigationClusters {
    pub navigation_id: Option<NavigationId>,
    pub clusters: Vec<ShiftCluster>,
}

/// Output of the LayoutShifts handler.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutShiftsData {
    pub clusters_by_navigation: Vec<NavigationClusters>,
    pub pre_paint_events: Vec<PrePaint>,
    pub dom_loading_events: Vec<DomLoadingEvent>,
    pub iframe_created_events: Vec<IframeCreatedEvent>,
    pub unsized_image_events: Vec<UnsizedImageEvent>,
    pub paint_image_events: Vec<PaintImageEvent>,
    pub compositor_commit_events: Vec<CompositorCommitEvent>,
    pub meta_viewport_events: Vec<MetaViewportEvent>,
}

impl LayoutShiftsData {
    /// Clusters for the given navigation, or the no-navigation bucket.
    pub fn clusters_for(&self, navigation_id: Option<&NavigationId>) -> &[ShiftCluster] {
        self.clusters_by_navigation
            .iter()
            .find(|group| group.navigation_id.as_ref() == navigation_id)
            .map(|group| group.clusters.as_slice())
            .unwrap_or(&[])
    }
}

// ---------------------------------------------------------------------------
// NetworkRequests / Animations / PageLoad
// ---------------------------------------------------------------------------

/// Output of the NetworkRequests handler.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkRequestsData {
    /// All requests, ascending by send timestamp.
    pub by_time: Vec<NetworkRequest>,
}

/// Output of the Animations handler.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimationsData {
    pub animations: Vec<AnimationEvent>,
}

/// Output of the PageLoadMetrics handler.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageLoadData {
    /// Paint milestones, ascending by `ts`.
    pub paint_milestones: Vec<PaintMilestone>,
}

// ---------------------------------------------------------------------------
// Renderer — main-thread call tree
// ---------------------------------------------------------------------------

/// One node of the main-thread call tree, arena-indexed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallNode {
    pub timing: EventTiming,
    /// Script URL attributed to this node, when resolvable.
    pub url: Option<String>,
    /// Arena indices of direct children.
    pub children: Vec<usize>,
}

impl Timed for CallNode {
    fn timing(&self) -> &EventTiming {
        &self.timing
    }
}

/// Output of the Renderer handler: the main frame's main-thread call tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RendererData {
    /// Arena of call-tree nodes.
    pub main_thread_nodes: Vec<CallNode>,
}

// ---------------------------------------------------------------------------
// ParsedTrace and per-navigation context
// ---------------------------------------------------------------------------

/// The full parsed-trace data model insight generators consume.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedTrace {
    pub meta: MetaData,
    pub layout_shifts: LayoutShiftsData,
    pub network: NetworkRequestsData,
    pub animations: AnimationsData,
    pub page_load: PageLoadData,
    pub renderer: RendererData,
}

/// Scope for one `generate_insight` call: one frame, one navigation (or the
/// pre-navigation window), and its time bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct InsightContext {
    pub bounds: TimeBounds,
    pub frame_id: FrameId,
    pub navigation_id: Option<NavigationId>,
    /// What-if model for savings estimation; generators that support it
    /// produce estimates only when this is present.
    pub simulation: Option<SimulationContext>,
}

impl InsightContext {
    /// Context covering one committed navigation.
    pub fn for_navigation(meta: &MetaData, navigation_id: &NavigationId) -> Option<Self> {
        let nav = meta.navigations.get(navigation_id)?;
        Some(Self {
            bounds: nav.bounds,
            frame_id: nav.frame.clone(),
            navigation_id: Some(navigation_id.clone()),
            simulation: None,
        })
    }

    /// Context covering the window before the first navigation commits.
    pub fn pre_navigation(meta: &MetaData) -> Self {
        let end = meta
            .navigations
            .values()
            .map(|nav| nav.bounds.min_micros)
            .min()
            .unwrap_or(meta.trace_bounds.max_micros);
        Self {
            bounds: TimeBounds::new(meta.trace_bounds.min_micros, end),
            frame_id: meta.main_frame_id.clone(),
            navigation_id: None,
            simulation: None,
        }
    }

    /// URL of the document this context navigated to, when known.
    pub fn navigation_url<'t>(&self, meta: &'t MetaData) -> Option<&'t str> {
        let id = self.navigation_id.as_ref()?;
        meta.navigations.get(id).map(|nav| nav.url.as_str())
    }
}
