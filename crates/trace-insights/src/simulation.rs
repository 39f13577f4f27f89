//! What-if load simulation for savings estimates.
//!
//! A [`SimulationGraph`] is a DAG over simulated load activity: each node
//! carries an estimated duration and depends on its parents. The estimated
//! time to a target milestone is the longest completion path ending at the
//! target. A what-if run elides a set of deferred nodes (their durations
//! contribute zero) and compares against the unmodified estimate.
//!
//! Arena invariant: a node's parents precede it in the arena, validated at
//! construction so estimation is a single forward pass.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimulationError {
    #[error("node {node} lists parent {parent}, which does not precede it in the arena")]
    ParentOutOfOrder { node: usize, parent: usize },
    #[error("target node {target} is out of range ({node_count} nodes)")]
    TargetOutOfRange { target: usize, node_count: usize },
}

// ---------------------------------------------------------------------------
// SimulationGraph
// ---------------------------------------------------------------------------

/// One unit of simulated load activity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimNode {
    /// Index of the network request this node models, in the trace's
    /// request sequence; `None` for synthetic nodes such as CPU tasks or
    /// the milestone target itself.
    pub request_index: Option<usize>,
    pub duration_micros: u64,
    /// Arena indices of the nodes this one waits on.
    pub parents: Vec<usize>,
}

/// Dependency graph with a designated milestone target node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationGraph {
    nodes: Vec<SimNode>,
    target: usize,
}

impl SimulationGraph {
    pub fn new(nodes: Vec<SimNode>, target: usize) -> Result<Self, SimulationError> {
        if target >= nodes.len() {
            return Err(SimulationError::TargetOutOfRange {
                target,
                node_count: nodes.len(),
            });
        }
        for (idx, node) in nodes.iter().enumerate() {
            if let Some(&parent) = node.parents.iter().find(|&&p| p >= idx) {
                return Err(SimulationError::ParentOutOfOrder { node: idx, parent });
            }
        }
        Ok(Self { nodes, target })
    }

    /// Arena indices of every node modeling the given trace request.
    pub fn nodes_for_request(&self, request_index: usize) -> Vec<usize> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| node.request_index == Some(request_index))
            .map(|(idx, _)| idx)
            .collect()
    }

    /// The given roots plus every node downstream of them.
    pub fn subtree(&self, roots: &[usize]) -> BTreeSet<usize> {
        let mut members: BTreeSet<usize> = roots.iter().copied().collect();
        // Parents precede children, so one forward pass closes the set.
        for (idx, node) in self.nodes.iter().enumerate() {
            if node.parents.iter().any(|p| members.contains(p)) {
                members.insert(idx);
            }
        }
        members
    }

    /// Estimated time to the target milestone with the deferred nodes
    /// contributing zero duration.
    pub fn estimate_micros(&self, deferred: &BTreeSet<usize>) -> u64 {
        let mut completion = vec![0u64; self.nodes.len()];
        for (idx, node) in self.nodes.iter().enumerate() {
            let start = node
                .parents
                .iter()
                .map(|&p| completion[p])
                .max()
                .unwrap_or(0);
            let duration = if deferred.contains(&idx) {
                0
            } else {
                node.duration_micros
            };
            completion[idx] = start.saturating_add(duration);
        }
        completion[self.target]
    }

    /// Estimated time with nothing deferred.
    pub fn baseline_micros(&self) -> u64 {
        self.estimate_micros(&BTreeSet::new())
    }
}

/// What-if model a caller supplies alongside a context when it wants savings
/// estimates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationContext {
    pub graph: SimulationGraph,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(request_index: Option<usize>, duration: u64, parents: Vec<usize>) -> SimNode {
        SimNode {
            request_index,
            duration_micros: duration,
            parents,
        }
    }

    /// document(0) -> {blocking css(1), script(2)} -> fcp target(3)
    fn chain() -> SimulationGraph {
        SimulationGraph::new(
            vec![
                node(Some(0), 100_000, vec![]),
                node(Some(1), 200_000, vec![0]),
                node(Some(2), 50_000, vec![0]),
                node(None, 10_000, vec![1, 2]),
            ],
            3,
        )
        .expect("valid graph")
    }

    // -- Validation --

    #[test]
    fn forward_parent_reference_is_rejected() {
        let err = SimulationGraph::new(vec![node(None, 1, vec![1]), node(None, 1, vec![])], 0)
            .expect_err("parent after child");
        assert_eq!(err, SimulationError::ParentOutOfOrder { node: 0, parent: 1 });
    }

    #[test]
    fn out_of_range_target_is_rejected() {
        let err = SimulationGraph::new(vec![node(None, 1, vec![])], 5).expect_err("bad target");
        assert_eq!(
            err,
            SimulationError::TargetOutOfRange {
                target: 5,
                node_count: 1
            }
        );
    }

    // -- Estimation --

    #[test]
    fn baseline_is_longest_path() {
        // 100_000 + 200_000 + 10_000 through the css branch.
        assert_eq!(chain().baseline_micros(), 310_000);
    }

    #[test]
    fn deferring_the_long_branch_shortens_the_estimate() {
        let graph = chain();
        let deferred: BTreeSet<usize> = [1].into_iter().collect();
        // Longest remaining path: 100_000 + 50_000 + 10_000.
        assert_eq!(graph.estimate_micros(&deferred), 160_000);
    }

    #[test]
    fn subtree_closes_over_descendants() {
        let graph = chain();
        let members = graph.subtree(&[1]);
        // Node 3 depends on 1, so it joins the subtree.
        assert_eq!(members, [1, 3].into_iter().collect());
    }

    #[test]
    fn nodes_for_request_matches_by_index() {
        let graph = chain();
        assert_eq!(graph.nodes_for_request(1), vec![1]);
        assert!(graph.nodes_for_request(9).is_empty());
    }
}
