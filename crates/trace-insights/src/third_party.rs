//! Attribution of transfer size and main-thread time per organization.
//!
//! Requests in the context's frame and navigation are resolved to entities
//! through the injected [`EntityRegistry`]. Main-thread time is exclusive
//! (self) time: each call-tree node's duration minus its children's, summed
//! per distinct script URL over the nodes inside the context bounds, then
//! rolled up per entity. Attribution is best-effort; URLs the registry
//! cannot resolve are skipped silently.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::entity_registry::{Entity, EntityId, EntityRegistry};
use crate::insight::{HandlerDependency, InsightKind, InsightWarning, RelatedEvent};
use crate::parsed_trace::{InsightContext, ParsedTrace, RendererData};
use crate::timing::TimeBounds;
use crate::trace_event::NetworkRequest;

/// Handlers this insight reads.
pub fn deps() -> &'static [HandlerDependency] {
    &[
        HandlerDependency::Meta,
        HandlerDependency::NetworkRequests,
        HandlerDependency::Renderer,
    ]
}

// ---------------------------------------------------------------------------
// Result records
// ---------------------------------------------------------------------------

/// Per-request attribution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestSummary {
    pub url: String,
    pub entity: Option<EntityId>,
    pub transfer_size_bytes: u64,
    /// Total main-thread self time of this request's URL. Duplicate requests
    /// to one URL each carry the full per-URL figure; sum entity rollups,
    /// not request summaries, when totalling CPU time.
    pub main_thread_time_micros: u64,
}

/// Per-entity rollup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySummary {
    pub entity: EntityId,
    pub transfer_size_bytes: u64,
    pub main_thread_time_micros: u64,
}

/// Immutable result of one third-party attribution computation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThirdPartyInsight {
    pub kind: InsightKind,
    /// Snapshot of the registry arena; `EntityId`s in this result index it.
    pub entities: Vec<Entity>,
    /// One summary per in-scope request, in request order.
    pub requests: Vec<RequestSummary>,
    /// Rollups in descending transfer-size order; ties break by entity name.
    pub entity_summaries: Vec<EntitySummary>,
    /// Entity owning the navigation's own URL, for first- vs third-party
    /// splits downstream.
    pub first_party_entity: Option<EntityId>,
    pub related_events: Vec<RelatedEvent>,
    pub warnings: Vec<InsightWarning>,
}

// ---------------------------------------------------------------------------
// Self-time walk
// ---------------------------------------------------------------------------

/// Exclusive CPU time per script URL over the in-bounds call-tree nodes.
pub fn self_time_by_url(renderer: &RendererData, bounds: &TimeBounds) -> BTreeMap<String, u64> {
    let mut by_url = BTreeMap::new();
    for node in &renderer.main_thread_nodes {
        if !bounds.contains(node) {
            continue;
        }
        let Some(url) = &node.url else {
            continue;
        };
        // Dangling child indices in caller-supplied data contribute zero
        // rather than panicking; attribution stays best-effort.
        let child_micros: u64 = node
            .children
            .iter()
            .filter_map(|&child| renderer.main_thread_nodes.get(child))
            .map(|child| child.timing.dur_micros)
            .sum();
        let self_micros = node.timing.dur_micros.saturating_sub(child_micros);
        *by_url.entry(url.clone()).or_insert(0) += self_micros;
    }
    by_url
}

// ---------------------------------------------------------------------------
// Generator
// ---------------------------------------------------------------------------

/// Compute per-entity attribution for one navigation context. The registry
/// is owned by the orchestrator so placeholder entities persist across
/// navigations within one run.
pub fn generate_insight(
    trace: &ParsedTrace,
    context: &InsightContext,
    registry: &mut EntityRegistry,
) -> ThirdPartyInsight {
    let in_scope: Vec<&NetworkRequest> = trace
        .network
        .by_time
        .iter()
        .filter(|request| request.frame == context.frame_id)
        .filter(|request| match (&request.navigation_id, &context.navigation_id) {
            (Some(request_nav), Some(context_nav)) => request_nav == context_nav,
            _ => context.bounds.contains(*request),
        })
        .collect();

    let self_times = self_time_by_url(&trace.renderer, &context.bounds);

    let requests: Vec<RequestSummary> = in_scope
        .iter()
        .map(|request| RequestSummary {
            url: request.url.clone(),
            entity: registry.resolve_url(&request.url),
            transfer_size_bytes: request.transfer_size_bytes,
            main_thread_time_micros: self_times.get(&request.url).copied().unwrap_or(0),
        })
        .collect();

    // Roll up transfer per request, then main-thread time once per distinct
    // URL so duplicate requests cannot double-count CPU time.
    let mut rollup: BTreeMap<EntityId, EntitySummary> = BTreeMap::new();
    for summary in &requests {
        let Some(entity) = summary.entity else {
            continue;
        };
        rollup
            .entry(entity)
            .or_insert_with(|| EntitySummary {
                entity,
                transfer_size_bytes: 0,
                main_thread_time_micros: 0,
            })
            .transfer_size_bytes += summary.transfer_size_bytes;
    }
    for (url, &micros) in &self_times {
        let Some(entity) = registry.resolve_url(url) else {
            continue;
        };
        rollup
            .entry(entity)
            .or_insert_with(|| EntitySummary {
                entity,
                transfer_size_bytes: 0,
                main_thread_time_micros: 0,
            })
            .main_thread_time_micros += micros;
    }

    let first_party_entity = context
        .navigation_url(&trace.meta)
        .and_then(|nav_url| registry.resolve_url(nav_url));

    let mut entity_summaries: Vec<EntitySummary> = rollup.into_values().collect();
    entity_summaries.sort_by(|a, b| {
        b.transfer_size_bytes
            .cmp(&a.transfer_size_bytes)
            .then_with(|| registry.entity(a.entity).name.cmp(&registry.entity(b.entity).name))
    });

    let related_events = (0..requests.len()).map(RelatedEvent::Request).collect();

    ThirdPartyInsight {
        kind: InsightKind::ThirdParties,
        entities: registry.entities().to_vec(),
        requests,
        entity_summaries,
        first_party_entity,
        related_events,
        warnings: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsed_trace::CallNode;
    use crate::timing::EventTiming;

    // -- Self-time walk --

    fn call_node(ts: u64, dur: u64, url: Option<&str>, children: Vec<usize>) -> CallNode {
        CallNode {
            timing: EventTiming::new(ts, dur),
            url: url.map(str::to_string),
            children,
        }
    }

    #[test]
    fn self_time_excludes_child_durations() {
        let renderer = RendererData {
            main_thread_nodes: vec![
                call_node(100, 1_000, Some("https://a.example/app.js"), vec![1, 2]),
                call_node(200, 300, Some("https://b.example/lib.js"), vec![]),
                call_node(600, 200, None, vec![]),
            ],
        };
        let bounds = TimeBounds::new(0, 10_000);
        let by_url = self_time_by_url(&renderer, &bounds);
        assert_eq!(by_url["https://a.example/app.js"], 500);
        assert_eq!(by_url["https://b.example/lib.js"], 300);
        assert_eq!(by_url.len(), 2);
    }

    #[test]
    fn self_time_skips_out_of_bounds_nodes() {
        let renderer = RendererData {
            main_thread_nodes: vec![call_node(50_000, 100, Some("https://a.example/app.js"), vec![])],
        };
        let bounds = TimeBounds::new(0, 10_000);
        assert!(self_time_by_url(&renderer, &bounds).is_empty());
    }

    #[test]
    fn dangling_child_index_contributes_zero() {
        let renderer = RendererData {
            main_thread_nodes: vec![call_node(
                100,
                1_000,
                Some("https://a.example/app.js"),
                vec![9],
            )],
        };
        let bounds = TimeBounds::new(0, 10_000);
        let by_url = self_time_by_url(&renderer, &bounds);
        assert_eq!(by_url["https://a.example/app.js"], 1_000);
    }

    #[test]
    fn self_time_sums_across_nodes_of_one_url() {
        let renderer = RendererData {
            main_thread_nodes: vec![
                call_node(100, 200, Some("https://a.example/app.js"), vec![]),
                call_node(400, 300, Some("https://a.example/app.js"), vec![]),
            ],
        };
        let bounds = TimeBounds::new(0, 10_000);
        let by_url = self_time_by_url(&renderer, &bounds);
        assert_eq!(by_url["https://a.example/app.js"], 500);
    }
}
