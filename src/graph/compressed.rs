//! Memory-efficient undirected graph representation

use std::collections::{HashMap, HashSet};

/// Compressed sparse representation of a simple undirected graph.
///
/// Every edge is stored in both endpoint rows, so `edges.len()` is twice
/// the number of undirected edges. Rows are sorted and free of duplicates
/// and self-loops.
#[derive(Debug, Clone, Default)]
pub struct CompressedGraph {
    /// Number of nodes in the graph
    pub node_count: usize,

    /// Offset array: index where each node's neighbours begin
    /// offsets[i] to offsets[i+1] defines the neighbour range for node i
    pub offsets: Vec<u32>,

    /// Neighbour array: concatenated sorted neighbour lists
    pub edges: Vec<u32>,

    /// Mapping from internal node indices to airport codes
    pub node_ids: Vec<String>,

    /// Reverse mapping from airport code to internal index
    index: HashMap<String, u32>,
}

impl CompressedGraph {
    /// Assemble a graph from already sorted, de-duplicated adjacency rows
    pub(crate) fn from_rows(node_ids: Vec<String>, rows: Vec<Vec<u32>>) -> Self {
        let node_count = node_ids.len();
        let edge_slots: usize = rows.iter().map(Vec::len).sum();

        let mut offsets = Vec::with_capacity(node_count + 1);
        let mut edges = Vec::with_capacity(edge_slots);
        offsets.push(0);
        for row in rows {
            edges.extend_from_slice(&row);
            offsets.push(edges.len() as u32);
        }

        let index = node_ids
            .iter()
            .enumerate()
            .map(|(idx, id)| (id.clone(), idx as u32))
            .collect();

        Self {
            node_count,
            offsets,
            edges,
            node_ids,
            index,
        }
    }

    /// Neighbours of a node
    pub fn neighbors(&self, node: usize) -> &[u32] {
        let start = self.offsets[node] as usize;
        let end = self.offsets[node + 1] as usize;
        &self.edges[start..end]
    }

    /// Check if there's an edge between a and b
    pub fn has_edge(&self, a: usize, b: u32) -> bool {
        self.neighbors(a).binary_search(&b).is_ok()
    }

    /// Degree of a node
    pub fn degree(&self, node: usize) -> usize {
        let start = self.offsets[node] as usize;
        let end = self.offsets[node + 1] as usize;
        end - start
    }

    /// Number of undirected edges
    pub fn edge_count(&self) -> usize {
        self.edges.len() / 2
    }

    pub fn is_empty(&self) -> bool {
        self.node_count == 0
    }

    /// Airport code of a node
    pub fn node_id(&self, node: usize) -> &str {
        &self.node_ids[node]
    }

    /// Internal index of an airport code
    pub fn index_of(&self, id: &str) -> Option<u32> {
        self.index.get(id).copied()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Iterate over undirected edges as `(low, high)` index pairs
    pub fn edge_pairs(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        (0..self.node_count).flat_map(move |a| {
            self.neighbors(a)
                .iter()
                .filter(move |&&b| (a as u32) < b)
                .map(move |&b| (a as u32, b))
        })
    }

    /// Build an independent copy of the graph without the given codes.
    ///
    /// Codes that are not part of the graph are ignored. Remaining nodes
    /// keep their relative order; the original graph is left untouched.
    pub fn without_nodes<S: AsRef<str>>(&self, removed: &HashSet<S>) -> CompressedGraph {
        let removed_idx: HashSet<u32> = removed
            .iter()
            .filter_map(|id| self.index_of(id.as_ref()))
            .collect();

        // Create mapping from original to kept indices
        let mut orig_to_kept = vec![u32::MAX; self.node_count];
        let mut kept_ids = Vec::with_capacity(self.node_count - removed_idx.len());
        for node in 0..self.node_count {
            if !removed_idx.contains(&(node as u32)) {
                orig_to_kept[node] = kept_ids.len() as u32;
                kept_ids.push(self.node_ids[node].clone());
            }
        }

        let rows = (0..self.node_count)
            .filter(|node| orig_to_kept[*node] != u32::MAX)
            .map(|node| {
                // Relative order is preserved, so remapped rows stay sorted
                self.neighbors(node)
                    .iter()
                    .map(|&nbr| orig_to_kept[nbr as usize])
                    .filter(|&nbr| nbr != u32::MAX)
                    .collect()
            })
            .collect();

        CompressedGraph::from_rows(kept_ids, rows)
    }
}
