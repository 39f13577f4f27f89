//! Edge-case integration tests for the viewport insight.

use trace_insights::insight::{HandlerDependency, InsightWarning};
use trace_insights::parsed_trace::{InsightContext, ParsedTrace};
use trace_insights::timing::{EventTiming, TimeBounds};
use trace_insights::trace_event::{CompositorCommitEvent, FrameId, MetaViewportEvent};
use trace_insights::viewport::{deps, generate_insight, ViewportInsight};

fn commit(ts: u64, mobile: bool) -> CompositorCommitEvent {
    CompositorCommitEvent {
        timing: EventTiming::instant(ts),
        frame: FrameId("F1".to_string()),
        is_mobile_optimized: mobile,
    }
}

fn context() -> InsightContext {
    InsightContext {
        bounds: TimeBounds::new(0, 1_000_000),
        frame_id: FrameId("F1".to_string()),
        navigation_id: None,
        simulation: None,
    }
}

#[test]
fn second_commit_counter_example_decides_regardless_of_third() {
    let mut trace = ParsedTrace::default();
    trace.layout_shifts.compositor_commit_events =
        vec![commit(100, true), commit(200, false), commit(300, true)];
    let insight = generate_insight(&trace, &context());
    assert_eq!(insight.mobile_optimized, Some(false));
    assert!(insight.warnings.is_empty());
}

#[test]
fn viewport_event_attached_when_in_scope() {
    let mut trace = ParsedTrace::default();
    trace.layout_shifts.compositor_commit_events = vec![commit(100, true)];
    trace.layout_shifts.meta_viewport_events = vec![MetaViewportEvent {
        timing: EventTiming::instant(50),
        frame: FrameId("F1".to_string()),
        content: "width=device-width, initial-scale=1".to_string(),
    }];
    let insight = generate_insight(&trace, &context());
    assert_eq!(insight.mobile_optimized, Some(true));
    assert_eq!(
        insight.viewport_event.map(|e| e.content),
        Some("width=device-width, initial-scale=1".to_string())
    );
}

#[test]
fn empty_trace_round_trips_with_warning() {
    let trace = ParsedTrace::default();
    let insight = generate_insight(&trace, &context());
    assert_eq!(insight.warnings, vec![InsightWarning::NoLayout]);

    let json = serde_json::to_string(&insight).expect("serialize");
    let back: ViewportInsight = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(back, insight);
}

#[test]
fn declared_deps_cover_consumed_handlers() {
    assert_eq!(
        deps(),
        &[HandlerDependency::Meta, HandlerDependency::LayoutShifts]
    );
}
