//! Community statistics and metrics

use serde::{Deserialize, Serialize};

use crate::cluster::{Community, Partition, PartitionOutcome};
use crate::graph::CompressedGraph;

/// Summary of one community
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommunityStats {
    pub id: usize,
    pub size: usize,
    pub density: f64,
}

/// Calculate density (actual edges / potential edges) of a community
pub fn calculate_density(graph: &CompressedGraph, community: &Community) -> f64 {
    let n = community.members.len();
    if n <= 1 {
        return 1.0; // By convention, singleton communities have density 1
    }

    let members: Vec<u32> = community
        .members
        .iter()
        .filter_map(|code| graph.index_of(code))
        .collect();
    let member_set: std::collections::HashSet<u32> = members.iter().copied().collect();

    // Each internal edge is seen from both endpoints
    let endpoint_hits: usize = members
        .iter()
        .map(|&node| {
            graph
                .neighbors(node as usize)
                .iter()
                .filter(|&&nbr| member_set.contains(&nbr))
                .count()
        })
        .sum();

    endpoint_hits as f64 / (n * (n - 1)) as f64
}

/// Newman modularity of a partition over the unweighted graph
pub fn modularity(graph: &CompressedGraph, partition: &Partition) -> f64 {
    let m = graph.edge_count() as f64;
    if m == 0.0 {
        return 0.0;
    }

    let group_count = (0..graph.node_count)
        .filter_map(|node| partition.group_of(graph.node_id(node)))
        .max()
        .map_or(0, |max| max + 1);

    let mut internal = vec![0.0; group_count];
    let mut degree_sums = vec![0.0; group_count];

    for node in 0..graph.node_count {
        let Some(group) = partition.group_of(graph.node_id(node)) else {
            continue;
        };
        degree_sums[group] += graph.degree(node) as f64;
        for &nbr in graph.neighbors(node) {
            if (node as u32) < nbr && partition.group_of(graph.node_id(nbr as usize)) == Some(group) {
                internal[group] += 1.0;
            }
        }
    }

    internal
        .iter()
        .zip(&degree_sums)
        .map(|(&l_c, &d_c)| l_c / m - (d_c / (2.0 * m)).powi(2))
        .sum()
}

/// Per-community statistics, largest first
pub fn community_stats(graph: &CompressedGraph, outcome: &PartitionOutcome) -> Vec<CommunityStats> {
    let mut stats: Vec<CommunityStats> = outcome
        .communities()
        .iter()
        .map(|community| CommunityStats {
            id: community.id,
            size: community.size(),
            density: calculate_density(graph, community),
        })
        .collect();

    stats.sort_by(|a, b| b.size.cmp(&a.size).then_with(|| a.id.cmp(&b.id)));
    stats
}
