//! Centrality ranking of airports
//!
//! Scores every node of a static route graph by one of three measures and
//! returns the highest scoring airport codes. Ties are broken by ascending
//! code so rankings are reproducible.

pub mod scores;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AnalyzerError;
use crate::graph::CompressedGraph;

pub use scores::{betweenness_centrality, closeness_centrality, degree_centrality};

/// Supported centrality measures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CentralityMetric {
    /// Share of other nodes directly connected
    Degree,
    /// Inverse mean hop distance to reachable nodes
    Closeness,
    /// Share of shortest paths passing through the node
    #[default]
    Betweenness,
}

impl CentralityMetric {
    pub const ALL: [CentralityMetric; 3] = [Self::Degree, Self::Closeness, Self::Betweenness];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Degree => "degree",
            Self::Closeness => "closeness",
            Self::Betweenness => "betweenness",
        }
    }

    /// Score every node; the result is indexed like the graph's nodes
    pub fn scores(&self, graph: &CompressedGraph) -> Vec<f64> {
        match self {
            Self::Degree => degree_centrality(graph),
            Self::Closeness => closeness_centrality(graph),
            Self::Betweenness => betweenness_centrality(graph),
        }
    }
}

impl fmt::Display for CentralityMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CentralityMetric {
    type Err = AnalyzerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "degree" => Ok(Self::Degree),
            "closeness" => Ok(Self::Closeness),
            "betweenness" => Ok(Self::Betweenness),
            _ => Err(AnalyzerError::UnknownMetric(s.to_string())),
        }
    }
}

/// Relative gap below which two scores count as tied
const TIE_TOLERANCE: f64 = 1e-9;

/// Pair each node code with its score, best first, ties by ascending code.
///
/// Scores that agree up to [`TIE_TOLERANCE`] relative to the leading score
/// of their run are treated as equal, so summation rounding never decides
/// the order of mathematically tied airports.
pub fn ranked_scores(graph: &CompressedGraph, metric: CentralityMetric) -> Vec<(String, f64)> {
    let scores = metric.scores(graph);

    let mut ranked: Vec<(String, f64)> = graph.node_ids.iter().cloned().zip(scores).collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    let mut start = 0;
    while start < ranked.len() {
        let lead = ranked[start].1;
        let end = ranked[start..]
            .iter()
            .position(|(_, score)| lead - score > TIE_TOLERANCE * lead.abs())
            .map_or(ranked.len(), |offset| start + offset);

        ranked[start..end].sort_by(|a, b| a.0.cmp(&b.0));
        start = end;
    }

    ranked
}

/// The `top_n` most central airport codes. An empty graph ranks nothing.
pub fn rank(graph: &CompressedGraph, metric: CentralityMetric, top_n: usize) -> Vec<String> {
    if graph.is_empty() || top_n == 0 {
        return Vec::new();
    }

    log::info!(
        "Ranking {} nodes by {} centrality (top {})",
        graph.node_count,
        metric,
        top_n
    );

    ranked_scores(graph, metric)
        .into_iter()
        .take(top_n)
        .map(|(code, _)| code)
        .collect()
}
