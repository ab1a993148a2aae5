//! Graph construction module

use std::collections::HashMap;

use crate::data::{AirportTable, Route};
use crate::graph::CompressedGraph;

/// Builder for incrementally constructing an undirected CompressedGraph
#[derive(Debug, Default)]
pub struct GraphBuilder {
    /// Mapping from airport codes to node indices
    id_to_index: HashMap<String, u32>,

    /// Node codes in insertion order
    node_ids: Vec<String>,

    /// Adjacency lists for each node (may hold duplicates until build)
    adjacency_lists: Vec<Vec<u32>>,
}

impl GraphBuilder {
    /// Create a new graph builder with the given capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            id_to_index: HashMap::with_capacity(capacity),
            node_ids: Vec::with_capacity(capacity),
            adjacency_lists: Vec::with_capacity(capacity),
        }
    }

    /// Build the route graph.
    ///
    /// A route contributes an edge only when both endpoints resolve in the
    /// airport table and differ from each other. Repeated and reversed
    /// routes collapse into one undirected edge. Nothing here fails:
    /// ineligible routes are skipped.
    pub fn from_routes(airports: &AirportTable, routes: &[Route]) -> CompressedGraph {
        let mut builder = Self::with_capacity(airports.len().min(routes.len() * 2));
        let mut skipped = 0usize;

        for route in routes {
            if !airports.contains(&route.source) || !airports.contains(&route.destination) {
                skipped += 1;
                continue;
            }
            builder.add_edge(&route.source, &route.destination);
        }

        let graph = builder.build();

        log::debug!("Skipped {} routes with unknown endpoints", skipped);
        log::info!(
            "Graph built: {} nodes, {} edges",
            graph.node_count,
            graph.edge_count()
        );

        graph
    }

    /// Get or create a node index for the given code
    pub fn get_or_create_node(&mut self, id: &str) -> u32 {
        if let Some(&idx) = self.id_to_index.get(id) {
            return idx;
        }

        let idx = self.node_ids.len() as u32;
        self.id_to_index.insert(id.to_string(), idx);
        self.node_ids.push(id.to_string());
        self.adjacency_lists.push(Vec::new());

        idx
    }

    /// Add an undirected edge. Self-pairs are dropped without creating a node.
    pub fn add_edge(&mut self, a: &str, b: &str) {
        if a == b {
            return;
        }

        let a_idx = self.get_or_create_node(a);
        let b_idx = self.get_or_create_node(b);

        self.adjacency_lists[a_idx as usize].push(b_idx);
        self.adjacency_lists[b_idx as usize].push(a_idx);
    }

    /// Build the compressed graph
    pub fn build(mut self) -> CompressedGraph {
        for list in &mut self.adjacency_lists {
            // Sorted rows allow binary search; dedup collapses parallel edges
            list.sort_unstable();
            list.dedup();
        }

        CompressedGraph::from_rows(self.node_ids, self.adjacency_lists)
    }
}
