//! Community detection for stable cluster colouring
//!
//! Communities are computed once on the full, undisrupted route graph so
//! that group ids stay fixed while different disruptions are simulated
//! against it.

pub mod louvain;
pub mod metrics;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::graph::CompressedGraph;
use louvain::{louvain, LouvainError, LouvainParams};

/// A group of airports. Its id is its position in discovery order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Community {
    pub id: usize,
    pub members: Vec<String>,
}

impl Community {
    pub fn size(&self) -> usize {
        self.members.len()
    }
}

/// Result of community detection.
///
/// `Degraded` means the optimization failed and every airport was put in
/// one fallback group; it is reported rather than hidden so callers can
/// tell a genuine single community from a failure.
#[derive(Debug, Clone, PartialEq)]
pub enum PartitionOutcome {
    Partitioned(Vec<Community>),
    Degraded(Community),
}

impl PartitionOutcome {
    pub fn communities(&self) -> &[Community] {
        match self {
            Self::Partitioned(communities) => communities,
            Self::Degraded(single) => std::slice::from_ref(single),
        }
    }

    pub fn community_count(&self) -> usize {
        self.communities().len()
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded(_))
    }

    /// Node -> group lookup
    pub fn partition(&self) -> Partition {
        let groups = self
            .communities()
            .iter()
            .flat_map(|community| {
                community
                    .members
                    .iter()
                    .map(move |code| (code.clone(), community.id))
            })
            .collect();

        Partition { groups }
    }
}

/// Total mapping from airport code to group id
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Partition {
    groups: HashMap<String, usize>,
}

impl Partition {
    pub fn group_of(&self, code: &str) -> Option<usize> {
        self.groups.get(code).copied()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Every node in exactly one community
fn is_total_cover(graph: &CompressedGraph, communities: &[Vec<u32>]) -> bool {
    let mut seen = vec![false; graph.node_count];
    for &node in communities.iter().flatten() {
        let Some(slot) = seen.get_mut(node as usize) else {
            return false;
        };
        if *slot {
            return false;
        }
        *slot = true;
    }
    seen.into_iter().all(|hit| hit)
}

/// Partition the graph into communities, falling back to a single group
/// when the optimization fails.
pub fn detect_communities(graph: &CompressedGraph, params: &LouvainParams) -> PartitionOutcome {
    log::info!(
        "Detecting communities on {} nodes (seed {})",
        graph.node_count,
        params.seed
    );

    outcome_from(graph, louvain(graph, params))
}

/// Turn a raw optimization result into an outcome. Errors and results that
/// are not a total cover degrade to one group holding every node.
fn outcome_from(graph: &CompressedGraph, result: Result<Vec<Vec<u32>>, LouvainError>) -> PartitionOutcome {
    let failure = match result {
        Ok(groups) if is_total_cover(graph, &groups) => {
            let communities: Vec<Community> = groups
                .into_iter()
                .enumerate()
                .map(|(id, members)| Community {
                    id,
                    members: members
                        .into_iter()
                        .map(|node| graph.node_id(node as usize).to_string())
                        .collect(),
                })
                .collect();

            log::info!("Detected {} communities", communities.len());
            let mut by_size: Vec<&Community> = communities.iter().collect();
            by_size.sort_by(|a, b| b.size().cmp(&a.size()).then_with(|| a.id.cmp(&b.id)));
            for community in by_size.iter().take(5) {
                log::info!("  Community {}: {} airports", community.id, community.size());
            }

            return PartitionOutcome::Partitioned(communities);
        }
        Ok(_) => "partition does not cover every node exactly once".to_string(),
        Err(err) => err.to_string(),
    };

    log::warn!("Community detection failed: {}", failure);
    log::warn!("Falling back to single group");

    PartitionOutcome::Degraded(Community {
        id: 0,
        members: graph.node_ids.clone(),
    })
}

/// Partition with default resolution and threshold
pub fn partition(graph: &CompressedGraph, seed: u64) -> PartitionOutcome {
    detect_communities(
        graph,
        &LouvainParams {
            seed,
            ..LouvainParams::default()
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphBuilder;
    use std::collections::HashSet;

    fn graph_from(edges: &[(&str, &str)]) -> CompressedGraph {
        let mut builder = GraphBuilder::default();
        for (a, b) in edges {
            builder.add_edge(a, b);
        }
        builder.build()
    }

    #[test]
    fn two_triangles_give_two_groups_of_three() {
        let graph = graph_from(&[
            ("A", "B"),
            ("B", "C"),
            ("C", "A"),
            ("X", "Y"),
            ("Y", "Z"),
            ("Z", "X"),
        ]);
        let outcome = partition(&graph, 42);

        assert!(!outcome.is_degraded());
        assert_eq!(outcome.community_count(), 2);
        assert!(outcome.communities().iter().all(|c| c.size() == 3));

        let groups = outcome.partition();
        assert_eq!(groups.group_of("A"), groups.group_of("C"));
        assert_ne!(groups.group_of("A"), groups.group_of("X"));
    }

    #[test]
    fn partition_is_total_and_repeatable() {
        let graph = graph_from(&[
            ("A", "B"),
            ("B", "C"),
            ("C", "D"),
            ("D", "A"),
            ("D", "E"),
            ("E", "F"),
            ("F", "G"),
            ("G", "E"),
        ]);

        let first = partition(&graph, 42);
        let second = partition(&graph, 42);
        assert_eq!(first, second);

        let mut seen = HashSet::new();
        for community in first.communities() {
            for code in &community.members {
                assert!(seen.insert(code.clone()), "{} appears twice", code);
            }
        }
        assert_eq!(seen.len(), graph.node_count);

        let groups = first.partition();
        for code in &graph.node_ids {
            assert!(groups.group_of(code).is_some());
        }
    }

    #[test]
    fn group_ids_follow_discovery_order() {
        let graph = graph_from(&[("A", "B"), ("X", "Y")]);
        let outcome = partition(&graph, 1);

        for (idx, community) in outcome.communities().iter().enumerate() {
            assert_eq!(community.id, idx);
        }
    }

    #[test]
    fn degraded_outcome_is_one_group() {
        let outcome = PartitionOutcome::Degraded(Community {
            id: 0,
            members: vec!["A".into(), "B".into()],
        });

        assert!(outcome.is_degraded());
        assert_eq!(outcome.community_count(), 1);
        assert_eq!(outcome.partition().group_of("B"), Some(0));
    }

    #[test]
    fn optimization_error_degrades_to_one_group() {
        let graph = graph_from(&[("A", "B"), ("B", "C"), ("X", "Y")]);
        let outcome = outcome_from(&graph, Err(LouvainError::NoConvergence(0)));

        assert!(outcome.is_degraded());
        assert_eq!(outcome.community_count(), 1);
        assert_eq!(outcome.communities()[0].members, graph.node_ids);

        let groups = outcome.partition();
        for code in &graph.node_ids {
            assert_eq!(groups.group_of(code), Some(0));
        }
    }

    #[test]
    fn partial_cover_degrades_to_one_group() {
        let graph = graph_from(&[("A", "B"), ("B", "C")]);

        let missing = outcome_from(&graph, Ok(vec![vec![0, 1]]));
        assert!(missing.is_degraded());
        assert_eq!(missing.community_count(), 1);
        assert_eq!(missing.communities()[0].size(), 3);

        let overlapping = outcome_from(&graph, Ok(vec![vec![0, 1], vec![1, 2]]));
        assert!(overlapping.is_degraded());
    }

    #[test]
    fn full_cover_is_kept() {
        let graph = graph_from(&[("A", "B"), ("B", "C")]);
        let outcome = outcome_from(&graph, Ok(vec![vec![0, 1], vec![2]]));

        assert!(!outcome.is_degraded());
        assert_eq!(outcome.community_count(), 2);
        assert_eq!(outcome.communities()[1].members, vec!["C".to_string()]);
    }

    #[test]
    fn cover_check_rejects_duplicates_and_gaps() {
        let graph = graph_from(&[("A", "B"), ("B", "C")]);

        assert!(is_total_cover(&graph, &[vec![0, 1], vec![2]]));
        assert!(!is_total_cover(&graph, &[vec![0, 1], vec![1, 2]]));
        assert!(!is_total_cover(&graph, &[vec![0, 1]]));
        assert!(!is_total_cover(&graph, &[vec![0, 1, 2, 7]]));
    }

    #[test]
    fn empty_graph_has_no_communities() {
        let outcome = partition(&CompressedGraph::default(), 42);

        assert!(!outcome.is_degraded());
        assert_eq!(outcome.community_count(), 0);
        assert!(outcome.partition().is_empty());
    }
}
