//! Integration tests for the third-party attribution insight.

use trace_insights::entity_registry::EntityRegistry;
use trace_insights::insight::HandlerDependency;
use trace_insights::parsed_trace::{
    CallNode, InsightContext, MetaData, NavigationBounds, ParsedTrace,
};
use trace_insights::third_party::{deps, generate_insight};
use trace_insights::timing::{EventTiming, TimeBounds};
use trace_insights::trace_event::{
    FrameId, NavigationId, NetworkRequest, RenderBlockingBehavior, RequestPriority, ResourceType,
};

fn request(ts: u64, url: &str, transfer: u64) -> NetworkRequest {
    NetworkRequest {
        timing: EventTiming::new(ts, 10_000),
        url: url.to_string(),
        frame: FrameId("F1".to_string()),
        navigation_id: None,
        priority: RequestPriority::Medium,
        render_blocking: RenderBlockingBehavior::NonBlocking,
        resource_type: ResourceType::Script,
        transfer_size_bytes: transfer,
        download_dur_micros: 2_000,
    }
}

fn context() -> InsightContext {
    InsightContext {
        bounds: TimeBounds::new(0, 10_000_000),
        frame_id: FrameId("F1".to_string()),
        navigation_id: None,
        simulation: None,
    }
}

// ===========================================================================
// Entity resolution and cache
// ===========================================================================

#[test]
fn repeated_unknown_domains_share_one_entity() {
    let mut trace = ParsedTrace::default();
    trace.network.by_time = vec![
        request(1_000, "https://cdn.widgets.example/a.js", 5_000),
        request(2_000, "https://api.widgets.example/b.js", 7_000),
    ];
    let mut registry = EntityRegistry::new();
    let insight = generate_insight(&trace, &context(), &mut registry);

    let first = insight.requests[0].entity.expect("resolved");
    let second = insight.requests[1].entity.expect("resolved");
    assert_eq!(first, second);
    assert!(insight.entities[first.0].is_unrecognized);

    // One rollup entry carrying both transfers.
    assert_eq!(insight.entity_summaries.len(), 1);
    assert_eq!(insight.entity_summaries[0].transfer_size_bytes, 12_000);
}

#[test]
fn malformed_urls_are_skipped_silently() {
    let mut trace = ParsedTrace::default();
    trace.network.by_time = vec![request(1_000, "data:text/plain,hi", 5_000)];
    let mut registry = EntityRegistry::new();
    let insight = generate_insight(&trace, &context(), &mut registry);
    assert_eq!(insight.requests[0].entity, None);
    assert!(insight.entity_summaries.is_empty());
    assert!(insight.warnings.is_empty());
}

// ===========================================================================
// Main-thread time attribution
// ===========================================================================

#[test]
fn self_time_rolls_up_to_owning_entity() {
    let mut trace = ParsedTrace::default();
    trace.network.by_time = vec![request(
        1_000,
        "https://www.google-analytics.com/analytics.js",
        40_000,
    )];
    trace.renderer.main_thread_nodes = vec![
        CallNode {
            timing: EventTiming::new(5_000, 9_000),
            url: Some("https://www.google-analytics.com/analytics.js".to_string()),
            children: vec![1],
        },
        CallNode {
            timing: EventTiming::new(6_000, 4_000),
            url: None,
            children: vec![],
        },
    ];

    let mut registry = EntityRegistry::new();
    let insight = generate_insight(&trace, &context(), &mut registry);

    assert_eq!(insight.requests[0].main_thread_time_micros, 5_000);
    let summary = &insight.entity_summaries[0];
    assert_eq!(insight.entities[summary.entity.0].name, "Google Analytics");
    assert_eq!(summary.main_thread_time_micros, 5_000);
    assert_eq!(summary.transfer_size_bytes, 40_000);
}

#[test]
fn duplicate_url_requests_do_not_double_count_cpu_time() {
    let mut trace = ParsedTrace::default();
    trace.network.by_time = vec![
        request(1_000, "https://cdn.widgets.example/a.js", 5_000),
        request(2_000, "https://cdn.widgets.example/a.js", 5_000),
    ];
    trace.renderer.main_thread_nodes = vec![CallNode {
        timing: EventTiming::new(5_000, 3_000),
        url: Some("https://cdn.widgets.example/a.js".to_string()),
        children: vec![],
    }];

    let mut registry = EntityRegistry::new();
    let insight = generate_insight(&trace, &context(), &mut registry);

    // Each summary carries the full per-URL self time.
    assert_eq!(insight.requests[0].main_thread_time_micros, 3_000);
    assert_eq!(insight.requests[1].main_thread_time_micros, 3_000);
    // The entity rollup counts the URL once.
    assert_eq!(insight.entity_summaries.len(), 1);
    assert_eq!(insight.entity_summaries[0].main_thread_time_micros, 3_000);
    assert_eq!(insight.entity_summaries[0].transfer_size_bytes, 10_000);
}

#[test]
fn dangling_call_tree_child_is_tolerated() {
    let mut trace = ParsedTrace::default();
    trace.network.by_time = vec![request(1_000, "https://cdn.widgets.example/a.js", 5_000)];
    trace.renderer.main_thread_nodes = vec![CallNode {
        timing: EventTiming::new(5_000, 2_000),
        url: Some("https://cdn.widgets.example/a.js".to_string()),
        children: vec![42],
    }];

    let mut registry = EntityRegistry::new();
    let insight = generate_insight(&trace, &context(), &mut registry);
    assert_eq!(insight.requests[0].main_thread_time_micros, 2_000);
}

// ===========================================================================
// Rollup ordering and first party
// ===========================================================================

#[test]
fn summaries_sorted_by_transfer_then_name() {
    let mut trace = ParsedTrace::default();
    trace.network.by_time = vec![
        request(1_000, "https://alpha.example/a.js", 10_000),
        request(2_000, "https://beta.example/b.js", 10_000),
        request(3_000, "https://www.googletagmanager.com/gtm.js", 90_000),
    ];
    let mut registry = EntityRegistry::new();
    let insight = generate_insight(&trace, &context(), &mut registry);

    assert_eq!(insight.entity_summaries.len(), 3);
    assert_eq!(
        insight.entities[insight.entity_summaries[0].entity.0].name,
        "Google Tag Manager"
    );
    // Equal transfers tie-break by name.
    assert_eq!(
        insight.entities[insight.entity_summaries[1].entity.0].name,
        "alpha.example"
    );
    assert_eq!(
        insight.entities[insight.entity_summaries[2].entity.0].name,
        "beta.example"
    );
}

#[test]
fn first_party_entity_comes_from_navigation_url() {
    let mut trace = ParsedTrace::default();
    trace.meta = MetaData::default();
    trace.meta.navigations.insert(
        NavigationId("N1".to_string()),
        NavigationBounds {
            bounds: TimeBounds::new(0, 10_000_000),
            frame: FrameId("F1".to_string()),
            url: "https://shop.example.com/checkout".to_string(),
        },
    );
    let ctx = InsightContext {
        bounds: TimeBounds::new(0, 10_000_000),
        frame_id: FrameId("F1".to_string()),
        navigation_id: Some(NavigationId("N1".to_string())),
        simulation: None,
    };
    let mut registry = EntityRegistry::new();
    let insight = generate_insight(&trace, &ctx, &mut registry);

    let first_party = insight.first_party_entity.expect("resolved");
    assert_eq!(insight.entities[first_party.0].name, "example.com");
}

// ===========================================================================
// Contract
// ===========================================================================

#[test]
fn declared_deps_cover_consumed_handlers() {
    assert_eq!(
        deps(),
        &[
            HandlerDependency::Meta,
            HandlerDependency::NetworkRequests,
            HandlerDependency::Renderer,
        ]
    );
}
