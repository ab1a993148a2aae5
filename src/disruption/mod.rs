//! Disruption simulation
//!
//! Removes a set of airports from a copy of the base graph and compares
//! connectivity before and after. The base graph is never modified, so any
//! number of simulations may run against it concurrently.

use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

use crate::graph::algorithms::{connected_components, global_efficiency};
use crate::graph::CompressedGraph;

/// Connectivity metrics of one graph
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    #[serde(rename = "nodes")]
    pub node_count: usize,

    #[serde(rename = "edges")]
    pub edge_count: usize,

    #[serde(rename = "largest_component")]
    pub largest_component_size: usize,

    #[serde(rename = "efficiency")]
    pub global_efficiency: f64,
}

impl MetricsSnapshot {
    /// Compute the snapshot of a graph
    pub fn of(graph: &CompressedGraph) -> Self {
        if graph.is_empty() {
            return Self::default();
        }

        let largest = largest_component(graph);

        Self {
            node_count: graph.node_count,
            edge_count: graph.edge_count(),
            largest_component_size: largest.len(),
            global_efficiency: global_efficiency(graph),
        }
    }
}

/// Outcome of removing a set of airports
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisruptionReport {
    pub before: MetricsSnapshot,
    pub after: MetricsSnapshot,
    /// Surviving airports cut off from the largest surviving component
    pub stranded: BTreeSet<String>,
}

/// Largest connected component as node indices.
///
/// Among equally large components the one holding the lexicographically
/// smallest airport code wins, so the choice is stable across runs.
pub fn largest_component(graph: &CompressedGraph) -> Vec<u32> {
    connected_components(graph)
        .into_iter()
        .map(|members| {
            let smallest = members
                .iter()
                .map(|&node| graph.node_id(node as usize))
                .min()
                .map(str::to_string)
                .unwrap_or_default();
            (members, smallest)
        })
        .min_by(|(a, a_key), (b, b_key)| b.len().cmp(&a.len()).then_with(|| a_key.cmp(b_key)))
        .map(|(members, _)| members)
        .unwrap_or_default()
}

/// Simulate the removal of `disrupted` airports from `graph`.
///
/// Codes that are not in the graph are ignored. Stranded airports are the
/// survivors outside the largest surviving component, covering isolated
/// airports as well as smaller fragments.
pub fn simulate<S: AsRef<str>>(graph: &CompressedGraph, disrupted: &HashSet<S>) -> DisruptionReport {
    simulate_from(graph, MetricsSnapshot::of(graph), disrupted)
}

/// [`simulate`] with a precomputed snapshot of the undisrupted `graph`
pub fn simulate_from<S: AsRef<str>>(
    graph: &CompressedGraph,
    before: MetricsSnapshot,
    disrupted: &HashSet<S>,
) -> DisruptionReport {
    let working = graph.without_nodes(disrupted);
    log::debug!(
        "Removed {} of {} requested airports",
        graph.node_count - working.node_count,
        disrupted.len()
    );

    if working.is_empty() {
        return DisruptionReport {
            before,
            after: MetricsSnapshot::default(),
            stranded: BTreeSet::new(),
        };
    }

    let largest = largest_component(&working);
    let mut in_largest = vec![false; working.node_count];
    for &node in &largest {
        in_largest[node as usize] = true;
    }

    let stranded: BTreeSet<String> = (0..working.node_count)
        .filter(|&node| !in_largest[node])
        .map(|node| working.node_id(node).to_string())
        .collect();

    let after = MetricsSnapshot {
        node_count: working.node_count,
        edge_count: working.edge_count(),
        largest_component_size: largest.len(),
        global_efficiency: global_efficiency(&working),
    };

    log::info!(
        "Disruption: largest component {} -> {}, efficiency {:.4} -> {:.4}, {} stranded",
        before.largest_component_size,
        after.largest_component_size,
        before.global_efficiency,
        after.global_efficiency,
        stranded.len()
    );

    DisruptionReport {
        before,
        after,
        stranded,
    }
}
