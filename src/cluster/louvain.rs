//! Seeded Louvain modularity optimization
//!
//! Alternates a local-moving phase, where nodes greedily join the
//! neighbouring community with the best modularity gain, with an
//! aggregation phase that collapses every community into a single node.
//! Stops when a level no longer raises modularity by more than the
//! configured threshold.
//!
//! Node visiting order is shuffled with a seeded RNG and candidate
//! communities are scanned in ascending id, so a fixed graph and seed
//! always give the same partition.

use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use thiserror::Error;

use crate::graph::CompressedGraph;

/// Upper bound on local-moving sweeps within one level
const MAX_SWEEPS: usize = 1_000;

/// Tuning knobs for [`louvain`]
#[derive(Debug, Clone, Copy)]
pub struct LouvainParams {
    pub seed: u64,
    pub resolution: f64,
    pub threshold: f64,
}

impl Default for LouvainParams {
    fn default() -> Self {
        Self {
            seed: 42,
            resolution: 1.0,
            threshold: 1e-7,
        }
    }
}

/// Ways the optimization can fail to produce a usable partition
#[derive(Debug, Error, PartialEq)]
pub enum LouvainError {
    #[error("modularity became non-finite at level {0}")]
    NonFiniteModularity(usize),

    #[error("local moving did not settle at level {0}")]
    NoConvergence(usize),
}

/// Weighted undirected graph used between aggregation levels
#[derive(Debug, Clone)]
struct LevelGraph {
    /// Neighbour lists without self-loops, both directions stored
    adjacency: Vec<Vec<(usize, f64)>>,

    /// Internal weight collapsed into each node
    self_loops: Vec<f64>,

    /// Weighted degree, self-loops counted twice
    degrees: Vec<f64>,

    /// Total edge weight m
    total_weight: f64,
}

impl LevelGraph {
    fn from_graph(graph: &CompressedGraph) -> Self {
        let adjacency: Vec<Vec<(usize, f64)>> = (0..graph.node_count)
            .map(|node| {
                graph
                    .neighbors(node)
                    .iter()
                    .map(|&nbr| (nbr as usize, 1.0))
                    .collect()
            })
            .collect();

        Self::assemble(adjacency, vec![0.0; graph.node_count])
    }

    fn assemble(adjacency: Vec<Vec<(usize, f64)>>, self_loops: Vec<f64>) -> Self {
        let degrees: Vec<f64> = adjacency
            .iter()
            .zip(&self_loops)
            .map(|(row, &own)| row.iter().map(|&(_, w)| w).sum::<f64>() + 2.0 * own)
            .collect();
        let total_weight = degrees.iter().sum::<f64>() / 2.0;

        Self {
            adjacency,
            self_loops,
            degrees,
            total_weight,
        }
    }

    fn len(&self) -> usize {
        self.adjacency.len()
    }

    /// Collapse each community into one node
    fn aggregate(&self, node2com: &[usize], com_count: usize) -> Self {
        let mut self_loops = vec![0.0; com_count];
        let mut rows: Vec<BTreeMap<usize, f64>> = vec![BTreeMap::new(); com_count];

        for u in 0..self.len() {
            let cu = node2com[u];
            self_loops[cu] += self.self_loops[u];

            for &(v, w) in &self.adjacency[u] {
                let cv = node2com[v];
                if cu == cv {
                    // Both directions are stored; count internal edges once
                    if u < v {
                        self_loops[cu] += w;
                    }
                } else {
                    *rows[cu].entry(cv).or_insert(0.0) += w;
                }
            }
        }

        let adjacency = rows.into_iter().map(|row| row.into_iter().collect()).collect();
        Self::assemble(adjacency, self_loops)
    }

    /// Modularity of a community assignment of this level's nodes
    fn modularity(&self, node2com: &[usize], com_count: usize, resolution: f64) -> f64 {
        let m = self.total_weight;
        let mut internal = vec![0.0; com_count];
        let mut totals = vec![0.0; com_count];

        for u in 0..self.len() {
            let cu = node2com[u];
            internal[cu] += self.self_loops[u];
            totals[cu] += self.degrees[u];
            for &(v, w) in &self.adjacency[u] {
                if u < v && node2com[v] == cu {
                    internal[cu] += w;
                }
            }
        }

        internal
            .iter()
            .zip(&totals)
            .map(|(&l_c, &d_c)| l_c / m - resolution * (d_c / (2.0 * m)).powi(2))
            .sum()
    }

    /// Local-moving phase. Returns the compacted assignment, the number of
    /// communities and whether any node moved.
    fn one_level(
        &self,
        rng: &mut StdRng,
        resolution: f64,
        level: usize,
    ) -> Result<(Vec<usize>, usize, bool), LouvainError> {
        let n = self.len();
        let m = self.total_weight;
        let mut node2com: Vec<usize> = (0..n).collect();
        let mut totals = self.degrees.clone();

        let mut order: Vec<usize> = (0..n).collect();
        order.shuffle(rng);

        let mut improved = false;
        let mut sweeps = 0;

        loop {
            let mut moves = 0;

            for &u in &order {
                let degree = self.degrees[u];
                let current = node2com[u];

                let mut weights: BTreeMap<usize, f64> = BTreeMap::new();
                for &(v, w) in &self.adjacency[u] {
                    *weights.entry(node2com[v]).or_insert(0.0) += w;
                }

                totals[current] -= degree;
                let own = weights.get(&current).copied().unwrap_or(0.0);
                let remove_cost = -own / m + resolution * totals[current] * degree / (2.0 * m * m);

                let mut best = current;
                let mut best_gain = 0.0;
                for (&com, &w) in &weights {
                    let gain = remove_cost + w / m - resolution * totals[com] * degree / (2.0 * m * m);
                    if gain > best_gain {
                        best_gain = gain;
                        best = com;
                    }
                }

                totals[best] += degree;
                if best != current {
                    node2com[u] = best;
                    moves += 1;
                    improved = true;
                }
            }

            if moves == 0 {
                break;
            }

            sweeps += 1;
            if sweeps >= MAX_SWEEPS {
                return Err(LouvainError::NoConvergence(level));
            }
        }

        let (compact, com_count) = compact_labels(&node2com);
        Ok((compact, com_count, improved))
    }
}

/// Renumber labels 0..k in order of first appearance
fn compact_labels(labels: &[usize]) -> (Vec<usize>, usize) {
    let mut mapping: BTreeMap<usize, usize> = BTreeMap::new();
    let mut next = 0;
    let compact: Vec<usize> = labels
        .iter()
        .map(|&label| {
            *mapping.entry(label).or_insert_with(|| {
                next += 1;
                next - 1
            })
        })
        .collect();
    (compact, next)
}

/// Partition the graph into communities of node indices.
///
/// Communities have ascending members and are ordered by their smallest
/// member. A graph without edges yields one community per node.
pub fn louvain(graph: &CompressedGraph, params: &LouvainParams) -> Result<Vec<Vec<u32>>, LouvainError> {
    let n = graph.node_count;
    if n == 0 {
        return Ok(Vec::new());
    }
    if graph.edge_count() == 0 {
        return Ok((0..n as u32).map(|node| vec![node]).collect());
    }

    let mut rng = StdRng::seed_from_u64(params.seed);
    let mut level_graph = LevelGraph::from_graph(graph);
    let mut members: Vec<Vec<u32>> = (0..n as u32).map(|node| vec![node]).collect();

    let singletons: Vec<usize> = (0..n).collect();
    let mut modularity = level_graph.modularity(&singletons, n, params.resolution);
    let mut level = 0;

    loop {
        let (node2com, com_count, moved) = level_graph.one_level(&mut rng, params.resolution, level)?;
        if !moved {
            break;
        }

        let mut merged: Vec<Vec<u32>> = vec![Vec::new(); com_count];
        for (node, group) in members.into_iter().enumerate() {
            merged[node2com[node]].extend(group);
        }
        members = merged;

        let new_modularity = level_graph.modularity(&node2com, com_count, params.resolution);
        if !new_modularity.is_finite() {
            return Err(LouvainError::NonFiniteModularity(level));
        }

        log::debug!(
            "Louvain level {}: {} communities, modularity {:.6}",
            level,
            com_count,
            new_modularity
        );

        if new_modularity - modularity <= params.threshold {
            break;
        }
        modularity = new_modularity;
        level_graph = level_graph.aggregate(&node2com, com_count);
        level += 1;
    }

    for group in &mut members {
        group.sort_unstable();
    }
    members.sort_by_key(|group| group.first().copied());

    Ok(members)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphBuilder;

    fn graph_from(edges: &[(&str, &str)]) -> CompressedGraph {
        let mut builder = GraphBuilder::default();
        for (a, b) in edges {
            builder.add_edge(a, b);
        }
        builder.build()
    }

    fn two_triangles() -> CompressedGraph {
        graph_from(&[
            ("A", "B"),
            ("B", "C"),
            ("C", "A"),
            ("X", "Y"),
            ("Y", "Z"),
            ("Z", "X"),
        ])
    }

    #[test]
    fn disjoint_triangles_form_two_communities() {
        let communities = louvain(&two_triangles(), &LouvainParams::default()).unwrap();
        assert_eq!(communities, vec![vec![0, 1, 2], vec![3, 4, 5]]);
    }

    #[test]
    fn bridged_cliques_split_at_the_bridge() {
        // Two 4-cliques joined by a single edge D - W
        let mut edges = Vec::new();
        for group in [["A", "B", "C", "D"], ["W", "X", "Y", "Z"]] {
            for i in 0..4 {
                for j in (i + 1)..4 {
                    edges.push((group[i], group[j]));
                }
            }
        }
        edges.push(("D", "W"));
        let graph = graph_from(&edges);

        let communities = louvain(&graph, &LouvainParams::default()).unwrap();

        assert_eq!(communities.len(), 2);
        assert!(communities.iter().all(|c| c.len() == 4));
    }

    #[test]
    fn edgeless_graph_gives_singletons() {
        let graph = CompressedGraph::from_rows(vec!["A".into(), "B".into()], vec![vec![], vec![]]);
        let communities = louvain(&graph, &LouvainParams::default()).unwrap();

        assert_eq!(communities, vec![vec![0], vec![1]]);
    }

    #[test]
    fn empty_graph_gives_nothing() {
        let communities = louvain(&CompressedGraph::default(), &LouvainParams::default()).unwrap();
        assert!(communities.is_empty());
    }

    #[test]
    fn same_seed_same_partition() {
        let mut edges = Vec::new();
        let names: Vec<String> = (0..60).map(|i| format!("N{:02}", i)).collect();
        for i in 0..60 {
            edges.push((names[i].as_str(), names[(i + 1) % 60].as_str()));
            edges.push((names[i].as_str(), names[(i * 11 + 5) % 60].as_str()));
        }
        let graph = graph_from(&edges);

        let params = LouvainParams {
            seed: 7,
            ..LouvainParams::default()
        };
        assert_eq!(louvain(&graph, &params).unwrap(), louvain(&graph, &params).unwrap());
    }

    #[test]
    fn aggregation_preserves_total_weight() {
        let level = LevelGraph::from_graph(&two_triangles());
        let collapsed = level.aggregate(&[0, 0, 0, 1, 1, 1], 2);

        assert_eq!(collapsed.total_weight, level.total_weight);
        assert_eq!(collapsed.self_loops, vec![3.0, 3.0]);
        assert!(collapsed.adjacency.iter().all(Vec::is_empty));
    }

    #[test]
    fn compact_labels_follow_first_appearance() {
        assert_eq!(compact_labels(&[5, 2, 5, 9]), (vec![0, 1, 0, 2], 3));
    }
}
