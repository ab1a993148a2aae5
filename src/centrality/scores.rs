//! Per-node centrality scores

use std::collections::VecDeque;

use rayon::prelude::*;

use crate::graph::algorithms::{accumulate_by_source_with, bfs_distances};
use crate::graph::CompressedGraph;

/// Degree centrality: deg(v) / (n - 1), or 0 for a single node.
///
/// # Complexity
///
/// O(V)
pub fn degree_centrality(graph: &CompressedGraph) -> Vec<f64> {
    let n = graph.node_count;
    if n <= 1 {
        return vec![0.0; n];
    }

    let norm = (n - 1) as f64;
    (0..n).map(|v| graph.degree(v) as f64 / norm).collect()
}

/// Closeness centrality restricted to the reachable set.
///
/// score(v) = reachable(v) / sum of distances to those nodes; nodes that
/// reach nothing score 0.
///
/// # Complexity
///
/// O(V × (V + E))
pub fn closeness_centrality(graph: &CompressedGraph) -> Vec<f64> {
    (0..graph.node_count)
        .into_par_iter()
        .map(|source| {
            let (reachable, total) = bfs_distances(graph, source)
                .into_iter()
                .flatten()
                .filter(|&d| d > 0)
                .fold((0u64, 0u64), |(count, sum), d| (count + 1, sum + d as u64));

            if total > 0 {
                reachable as f64 / total as f64
            } else {
                0.0
            }
        })
        .collect()
}

/// Reusable buffers for one Brandes single-source pass
struct BrandesScratch {
    stack: Vec<usize>,
    queue: VecDeque<usize>,
    predecessors: Vec<Vec<usize>>,
    sigma: Vec<f64>,
    dist: Vec<i64>,
    delta: Vec<f64>,
}

impl BrandesScratch {
    fn new(n: usize) -> Self {
        Self {
            stack: Vec::with_capacity(n),
            queue: VecDeque::with_capacity(n),
            predecessors: vec![Vec::new(); n],
            sigma: vec![0.0; n],
            dist: vec![-1; n],
            delta: vec![0.0; n],
        }
    }

    fn reset(&mut self) {
        self.stack.clear();
        self.queue.clear();
        for preds in &mut self.predecessors {
            preds.clear();
        }
        self.sigma.fill(0.0);
        self.dist.fill(-1);
        self.delta.fill(0.0);
    }
}

/// Shortest-path counting from `source`, adding each node's dependency to `acc`
fn brandes_pass(graph: &CompressedGraph, source: usize, scratch: &mut BrandesScratch, acc: &mut [f64]) {
    scratch.reset();
    scratch.sigma[source] = 1.0;
    scratch.dist[source] = 0;
    scratch.queue.push_back(source);

    while let Some(v) = scratch.queue.pop_front() {
        scratch.stack.push(v);
        let dist_v = scratch.dist[v];

        for &w in graph.neighbors(v) {
            let w = w as usize;
            // First visit?
            if scratch.dist[w] < 0 {
                scratch.dist[w] = dist_v + 1;
                scratch.queue.push_back(w);
            }
            // Shortest path to w via v?
            if scratch.dist[w] == dist_v + 1 {
                scratch.sigma[w] += scratch.sigma[v];
                scratch.predecessors[w].push(v);
            }
        }
    }

    // Accumulation in order of non-increasing distance
    while let Some(w) = scratch.stack.pop() {
        let coeff = (1.0 + scratch.delta[w]) / scratch.sigma[w];
        for i in 0..scratch.predecessors[w].len() {
            let v = scratch.predecessors[w][i];
            scratch.delta[v] += scratch.sigma[v] * coeff;
        }
        if w != source {
            acc[w] += scratch.delta[w];
        }
    }
}

/// Betweenness centrality via Brandes' algorithm, normalized to [0, 1].
///
/// Each unordered pair is visited from both endpoints, so the raw sums are
/// divided by (n - 1)(n - 2), which equals dividing the per-pair sum by the
/// (n - 1)(n - 2) / 2 pairs not involving the node. Graphs with fewer than
/// three nodes score 0 everywhere.
///
/// # Complexity
///
/// O(V × E)
pub fn betweenness_centrality(graph: &CompressedGraph) -> Vec<f64> {
    let n = graph.node_count;
    if n <= 2 {
        return vec![0.0; n];
    }

    let raw = accumulate_by_source_with(
        n,
        n,
        || BrandesScratch::new(n),
        |scratch, source, acc| brandes_pass(graph, source, scratch, acc),
    );

    let norm = 1.0 / ((n - 1) * (n - 2)) as f64;
    raw.into_iter().map(|v| v * norm).collect()
}
