//! Typed trace event kinds consumed by the insight generators.
//!
//! The upstream parsing layer hands each generator kind-homogeneous,
//! `ts`-sorted sequences of these records. Every kind embeds an
//! [`EventTiming`] base; kind-specific payloads are plain fields, so no
//! generator has to make runtime assumptions about loosely-typed event
//! arguments.

use serde::{Deserialize, Serialize};

use crate::timing::{EventTiming, Timed};

// ---------------------------------------------------------------------------
// Identifier newtypes
// ---------------------------------------------------------------------------

/// Identifier of one frame (main frame or iframe) within the traced page.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FrameId(pub String);

/// Identifier of one navigation within the trace.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NavigationId(pub String);

/// Backend DOM node identifier, stable within one renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DomNodeId(pub u64);

// ---------------------------------------------------------------------------
// Layout shifts and clusters
// ---------------------------------------------------------------------------

/// One visible content movement without user interaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutShift {
    pub timing: EventTiming,
    /// Weighted score contribution of this shift.
    pub score: f64,
}

impl Timed for LayoutShift {
    fn timing(&self) -> &EventTiming {
        &self.timing
    }
}

/// A group of temporally-adjacent layout shifts treated as one jank episode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShiftCluster {
    pub timing: EventTiming,
    /// Shifts in ascending `ts` order.
    pub shifts: Vec<LayoutShift>,
    /// Cumulative score of the cluster's shifts.
    pub cumulative_score: f64,
}

impl Timed for ShiftCluster {
    fn timing(&self) -> &EventTiming {
        &self.timing
    }
}

// ---------------------------------------------------------------------------
// Rendering passes and paints
// ---------------------------------------------------------------------------

/// One pre-paint rendering pass; layout shifts are computed within its
/// `[ts, ts + dur]` window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrePaint {
    pub timing: EventTiming,
}

impl Timed for PrePaint {
    fn timing(&self) -> &EventTiming {
        &self.timing
    }
}

/// Which paint milestone a [`PaintMilestone`] event marks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaintMilestoneKind {
    FirstPaint,
    FirstContentfulPaint,
}

/// A paint milestone for one frame/navigation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaintMilestone {
    pub timing: EventTiming,
    pub kind: PaintMilestoneKind,
    pub frame: FrameId,
    pub navigation_id: Option<NavigationId>,
}

impl Timed for PaintMilestone {
    fn timing(&self) -> &EventTiming {
        &self.timing
    }
}

/// A decoded image draw, correlated to unsized-image layout events by node id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaintImageEvent {
    pub timing: EventTiming,
    pub node_id: DomNodeId,
}

impl Timed for PaintImageEvent {
    fn timing(&self) -> &EventTiming {
        &self.timing
    }
}

/// A layout pass that laid out an image element with no explicit dimensions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnsizedImageEvent {
    pub timing: EventTiming,
    pub node_id: DomNodeId,
}

impl Timed for UnsizedImageEvent {
    fn timing(&self) -> &EventTiming {
        &self.timing
    }
}

// ---------------------------------------------------------------------------
// Iframe and document lifecycle
// ---------------------------------------------------------------------------

/// Creation of a child frame (iframe) by the renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IframeCreatedEvent {
    pub timing: EventTiming,
    pub frame: FrameId,
}

impl Timed for IframeCreatedEvent {
    fn timing(&self) -> &EventTiming {
        &self.timing
    }
}

/// Start of document loading in one frame; used to recover which frame an
/// iframe-creation event affected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomLoadingEvent {
    pub timing: EventTiming,
    pub frame: FrameId,
}

impl Timed for DomLoadingEvent {
    fn timing(&self) -> &EventTiming {
        &self.timing
    }
}

// ---------------------------------------------------------------------------
// Animations
// ---------------------------------------------------------------------------

/// An instant sub-event embedded in an [`AnimationEvent`], optionally
/// carrying the compositor's failure bitmask for that sample.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimationInstant {
    pub timing: EventTiming,
    /// Bitmask of non-composited failure reasons; zero means the sample
    /// carried no failure.
    pub composite_failed_mask: u32,
    /// CSS property names the compositor could not accelerate, when reported.
    pub unsupported_properties: Option<Vec<String>>,
}

impl Timed for AnimationInstant {
    fn timing(&self) -> &EventTiming {
        &self.timing
    }
}

/// A begin/instant animation event pair with its embedded samples.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimationEvent {
    pub timing: EventTiming,
    /// Author-visible animation name, when one was recorded.
    pub name: Option<String>,
    /// Instant sub-events in ascending `ts` order.
    pub instants: Vec<AnimationInstant>,
}

impl Timed for AnimationEvent {
    fn timing(&self) -> &EventTiming {
        &self.timing
    }
}

// ---------------------------------------------------------------------------
// Network requests
// ---------------------------------------------------------------------------

/// Loader priority assigned to a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestPriority {
    VeryLow,
    Low,
    Medium,
    High,
    VeryHigh,
}

/// Render-blocking classification reported by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderBlockingBehavior {
    /// Unconditionally blocks rendering.
    Blocking,
    /// Blocks only while the body parser is stalled on it.
    InBodyParserBlocking,
    /// Would block, but was loaded in a potentially-blocking-optional way.
    PotentiallyBlocking,
    NonBlocking,
}

/// Resource type of a network request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
    Document,
    Stylesheet,
    Script,
    Font,
    Image,
    Media,
    Fetch,
    Other,
}

/// One network request, spanning send to finish.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkRequest {
    pub timing: EventTiming,
    pub url: String,
    pub frame: FrameId,
    /// Navigation the request belongs to, when attributable.
    pub navigation_id: Option<NavigationId>,
    pub priority: RequestPriority,
    pub render_blocking: RenderBlockingBehavior,
    pub resource_type: ResourceType,
    /// Bytes transferred over the network (after encoding).
    pub transfer_size_bytes: u64,
    /// Portion of the request spent downloading the body, in microseconds.
    pub download_dur_micros: u64,
}

impl NetworkRequest {
    /// Timestamp at which the request finished.
    pub fn finished_micros(&self) -> u64 {
        self.timing.end_micros()
    }
}

impl Timed for NetworkRequest {
    fn timing(&self) -> &EventTiming {
        &self.timing
    }
}

// ---------------------------------------------------------------------------
// Compositor and viewport
// ---------------------------------------------------------------------------

/// One compositor frame commit, carrying the viewport fitness flag computed
/// by the compositor for that frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompositorCommitEvent {
    pub timing: EventTiming,
    pub frame: FrameId,
    pub is_mobile_optimized: bool,
}

impl Timed for CompositorCommitEvent {
    fn timing(&self) -> &EventTiming {
        &self.timing
    }
}

/// The parsed `<meta name="viewport">` tag for one frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaViewportEvent {
    pub timing: EventTiming,
    pub frame: FrameId,
    /// Raw content attribute of the meta tag.
    pub content: String,
}

impl Timed for MetaViewportEvent {
    fn timing(&self) -> &EventTiming {
        &self.timing
    }
}
