//! Traversal and connectivity algorithms over the route graph

use std::collections::{HashMap, VecDeque};

use rayon::prelude::*;

use crate::graph::CompressedGraph;

/// Sources handled by one parallel task. Fixed so that partial sums are
/// always combined in the same order regardless of the thread count.
pub(crate) const SOURCE_CHUNK: usize = 64;

/// Run `per_source` for every node and add up what it accumulates.
///
/// Each chunk of sources gets its own accumulator of length `width`;
/// chunk accumulators are then folded in chunk order, so the floating
/// point result is identical to a sequential run over the same chunks.
pub(crate) fn accumulate_by_source<F>(node_count: usize, width: usize, per_source: F) -> Vec<f64>
where
    F: Fn(usize, &mut [f64]) + Sync,
{
    accumulate_by_source_with(node_count, width, || (), |_, source, acc| per_source(source, acc))
}

/// Like [`accumulate_by_source`], with scratch state created once per chunk
pub(crate) fn accumulate_by_source_with<S, I, F>(
    node_count: usize,
    width: usize,
    init: I,
    per_source: F,
) -> Vec<f64>
where
    I: Fn() -> S + Sync,
    F: Fn(&mut S, usize, &mut [f64]) + Sync,
{
    let num_chunks = (node_count + SOURCE_CHUNK - 1) / SOURCE_CHUNK;

    let partials: Vec<Vec<f64>> = (0..num_chunks)
        .into_par_iter()
        .map(|chunk_idx| {
            let start = chunk_idx * SOURCE_CHUNK;
            let end = std::cmp::min(start + SOURCE_CHUNK, node_count);

            let mut state = init();
            let mut acc = vec![0.0; width];
            for source in start..end {
                per_source(&mut state, source, &mut acc);
            }
            acc
        })
        .collect();

    let mut total = vec![0.0; width];
    for partial in partials {
        for (t, p) in total.iter_mut().zip(partial) {
            *t += p;
        }
    }
    total
}

/// Hop distances from `source` to every node; `None` when unreachable
pub fn bfs_distances(graph: &CompressedGraph, source: usize) -> Vec<Option<u32>> {
    let mut dist = vec![None; graph.node_count];
    let mut queue = VecDeque::new();

    dist[source] = Some(0);
    queue.push_back(source);

    while let Some(v) = queue.pop_front() {
        let next = dist[v].map_or(0, |d| d + 1);
        for &w in graph.neighbors(v) {
            let w = w as usize;
            if dist[w].is_none() {
                dist[w] = Some(next);
                queue.push_back(w);
            }
        }
    }

    dist
}

/// Union-Find data structure for connected component analysis
pub struct DisjointSets {
    /// Parent pointers (parent[i] = parent of node i)
    parent: Vec<u32>,

    /// Size of each set, valid at roots (for union by size)
    size: Vec<u32>,
}

impl DisjointSets {
    /// Create a new DisjointSets data structure
    pub fn new(size: usize) -> Self {
        Self {
            parent: (0..size as u32).collect(),
            size: vec![1; size],
        }
    }

    /// Find the root of the set containing x with path compression
    pub fn find(&mut self, x: u32) -> u32 {
        let mut root = x;
        while self.parent[root as usize] != root {
            root = self.parent[root as usize];
        }

        // Path compression: point every visited node at the root
        let mut node = x;
        while self.parent[node as usize] != root {
            let next = self.parent[node as usize];
            self.parent[node as usize] = root;
            node = next;
        }

        root
    }

    /// Union the sets containing x and y
    pub fn union(&mut self, x: u32, y: u32) {
        let root_x = self.find(x);
        let root_y = self.find(y);

        if root_x == root_y {
            return;
        }

        // Attach smaller tree under root of larger tree
        if self.size[root_x as usize] >= self.size[root_y as usize] {
            self.parent[root_y as usize] = root_x;
            self.size[root_x as usize] += self.size[root_y as usize];
        } else {
            self.parent[root_x as usize] = root_y;
            self.size[root_y as usize] += self.size[root_x as usize];
        }
    }

    /// Get the size of the set containing x
    pub fn size(&mut self, x: u32) -> u32 {
        let root = self.find(x);
        self.size[root as usize]
    }
}

/// Connected components as lists of node indices.
///
/// Members are ascending and components are ordered by their smallest member.
pub fn connected_components(graph: &CompressedGraph) -> Vec<Vec<u32>> {
    let mut sets = DisjointSets::new(graph.node_count);

    for (a, b) in graph.edge_pairs() {
        sets.union(a, b);
    }

    let mut slot_of_root: HashMap<u32, usize> = HashMap::new();
    let mut components: Vec<Vec<u32>> = Vec::new();

    for node in 0..graph.node_count as u32 {
        let root = sets.find(node);
        let slot = *slot_of_root.entry(root).or_insert_with(|| {
            components.push(Vec::new());
            components.len() - 1
        });
        components[slot].push(node);
    }

    components
}

/// Global efficiency: mean of 1/d(i, j) over all ordered pairs i != j.
///
/// Unreachable pairs contribute 0; graphs with fewer than two nodes have
/// efficiency 0.
pub fn global_efficiency(graph: &CompressedGraph) -> f64 {
    let n = graph.node_count;
    if n < 2 {
        return 0.0;
    }

    let total = accumulate_by_source(n, 1, |source, acc| {
        for d in bfs_distances(graph, source).into_iter().flatten() {
            if d > 0 {
                acc[0] += 1.0 / d as f64;
            }
        }
    });

    total[0] / (n * (n - 1)) as f64
}
