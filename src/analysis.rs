//! Immutable analysis context shared by every request

use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

use crate::centrality::{rank, CentralityMetric};
use crate::cluster::louvain::LouvainParams;
use crate::cluster::{detect_communities, Partition, PartitionOutcome};
use crate::config::Config;
use crate::data::{AirportTable, Route};
use crate::disruption::{simulate_from, MetricsSnapshot};
use crate::error::Result;
use crate::geo::{interpolate, LatLon};
use crate::graph::{CompressedGraph, GraphBuilder};
use crate::viz::{build_features, FeatureSet};

/// Outcome of one disruption analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub before: MetricsSnapshot,
    pub after: MetricsSnapshot,
    pub stranded: BTreeSet<String>,
    /// Every disrupted code, requested or auto-selected, sorted
    pub disrupted_list: Vec<String>,
}

/// Sizes of the loaded state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthSummary {
    pub airports: usize,
    pub routes: usize,
    pub graph_nodes: usize,
    pub graph_edges: usize,
    pub communities: usize,
    pub degraded: bool,
}

/// Loaded tables, base graph and community partition.
///
/// Built once and never mutated afterwards; wrap it in an `Arc` to share it
/// between threads. Every analysis works on its own copy of the graph.
#[derive(Debug, Clone)]
pub struct AnalysisContext {
    airports: AirportTable,
    routes: Vec<Route>,
    graph: CompressedGraph,
    communities: PartitionOutcome,
    partition: Partition,
    /// Metrics of the undisrupted graph
    baseline: MetricsSnapshot,
    config: Config,
}

impl AnalysisContext {
    /// Build the base graph and partition it into communities
    pub fn new(airports: AirportTable, routes: Vec<Route>, config: &Config) -> Result<Self> {
        config.validate()?;

        let graph = GraphBuilder::from_routes(&airports, &routes);
        let communities = detect_communities(
            &graph,
            &LouvainParams {
                seed: config.community_seed,
                resolution: config.community_resolution,
                threshold: config.community_threshold,
            },
        );
        let partition = communities.partition();
        let baseline = MetricsSnapshot::of(&graph);

        Ok(Self {
            airports,
            routes,
            graph,
            communities,
            partition,
            baseline,
            config: config.clone(),
        })
    }

    pub fn graph(&self) -> &CompressedGraph {
        &self.graph
    }

    pub fn airports(&self) -> &AirportTable {
        &self.airports
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn communities(&self) -> &PartitionOutcome {
        &self.communities
    }

    pub fn partition(&self) -> &Partition {
        &self.partition
    }

    pub fn baseline(&self) -> MetricsSnapshot {
        self.baseline
    }

    /// Remove `disrupted` plus the `auto_top_n` most central airports and
    /// compare connectivity before and after.
    pub fn analyze(
        &self,
        disrupted: &HashSet<String>,
        auto_top_n: usize,
        metric: CentralityMetric,
    ) -> AnalysisResult {
        let mut removed: HashSet<String> = disrupted.clone();
        if auto_top_n > 0 {
            let ranked = rank(&self.graph, metric, auto_top_n);
            log::info!("Auto-selected by {}: {}", metric, ranked.join(", "));
            removed.extend(ranked);
        }

        let report = simulate_from(&self.graph, self.baseline, &removed);

        let mut disrupted_list: Vec<String> = removed.into_iter().collect();
        disrupted_list.sort();

        AnalysisResult {
            before: report.before,
            after: report.after,
            stranded: report.stranded,
            disrupted_list,
        }
    }

    /// Render features for the full network with `disrupted` highlighted
    pub fn build_features(&self, disrupted: &HashSet<String>) -> FeatureSet {
        build_features(
            &self.airports,
            &self.routes,
            &self.partition,
            self.communities.community_count(),
            disrupted,
            self.config.gc_steps,
        )
    }

    pub fn interpolate_path(&self, lon1: f64, lat1: f64, lon2: f64, lat2: f64, steps: u32) -> Vec<LatLon> {
        interpolate(lon1, lat1, lon2, lat2, steps)
    }

    pub fn health(&self) -> HealthSummary {
        HealthSummary {
            airports: self.airports.record_count(),
            routes: self.routes.len(),
            graph_nodes: self.graph.node_count,
            graph_edges: self.graph.edge_count(),
            communities: self.communities.community_count(),
            degraded: self.communities.is_degraded(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Airport;

    fn airport(code: &str, lat: f64, lon: f64) -> Airport {
        Airport {
            id: String::new(),
            name: code.to_string(),
            city: String::new(),
            country: String::new(),
            iata: code.to_string(),
            icao: String::new(),
            latitude: lat,
            longitude: lon,
        }
    }

    fn path_context() -> AnalysisContext {
        let mut airports = AirportTable::new();
        for (i, code) in ["A", "B", "C", "D"].iter().enumerate() {
            airports.insert(airport(code, i as f64, i as f64), [*code]);
        }
        let routes = vec![
            Route::new("A", "B", 0),
            Route::new("B", "C", 0),
            Route::new("C", "D", 0),
        ];
        AnalysisContext::new(airports, routes, &Config::default()).unwrap()
    }

    fn codes(items: &[&str]) -> HashSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn analyze_reports_stranded_airports() {
        let ctx = path_context();
        let result = ctx.analyze(&codes(&["B"]), 0, CentralityMetric::Betweenness);

        assert_eq!(result.before.node_count, 4);
        assert_eq!(result.after.edge_count, 1);
        assert_eq!(result.after.largest_component_size, 2);
        assert_eq!(result.stranded.into_iter().collect::<Vec<_>>(), vec!["A"]);
        assert_eq!(result.disrupted_list, vec!["B"]);
    }

    #[test]
    fn auto_top_n_adds_most_central() {
        let ctx = path_context();
        let result = ctx.analyze(&codes(&["A"]), 1, CentralityMetric::Betweenness);

        // B and C tie on betweenness; B sorts first
        assert_eq!(result.disrupted_list, vec!["A", "B"]);
        assert_eq!(result.after.node_count, 2);
    }

    #[test]
    fn empty_disruption_changes_nothing() {
        let ctx = path_context();
        let result = ctx.analyze(&HashSet::new(), 0, CentralityMetric::Degree);

        assert_eq!(result.before, result.after);
        assert!(result.stranded.is_empty());
        assert!(result.disrupted_list.is_empty());
    }

    #[test]
    fn baseline_is_the_undisrupted_snapshot() {
        let ctx = path_context();

        assert_eq!(ctx.baseline(), MetricsSnapshot::of(ctx.graph()));
        for code in ["A", "B"] {
            let result = ctx.analyze(&codes(&[code]), 0, CentralityMetric::Degree);
            assert_eq!(result.before, ctx.baseline());
        }
    }

    #[test]
    fn features_use_the_stored_partition() {
        let ctx = path_context();
        let features = ctx.build_features(&codes(&["C"]));

        assert_eq!(features.community_count, ctx.communities().community_count());
        for airport in &features.airports {
            let expected = ctx.partition().group_of(&airport.code).map(|g| g as i64);
            assert_eq!(Some(airport.group), expected);
            assert_eq!(airport.disrupted, airport.code == "C");
        }
    }

    #[test]
    fn interpolate_path_follows_the_great_circle() {
        let ctx = path_context();

        let straight = ctx.interpolate_path(10.0, 20.0, 30.0, 40.0, 0);
        assert_eq!(straight, vec![LatLon::new(20.0, 10.0), LatLon::new(40.0, 30.0)]);

        let arc = ctx.interpolate_path(0.0, 0.0, 0.0, 90.0, 2);
        assert_eq!(arc.len(), 3);
        assert!((arc[1].lat - 45.0).abs() < 1e-9);
        assert!(arc[1].lon.abs() < 1e-9);

        assert_eq!(ctx.interpolate_path(5.0, 5.0, 5.0, 5.0, 3), vec![LatLon::new(5.0, 5.0)]);
    }

    #[test]
    fn health_reflects_loaded_state() {
        let health = path_context().health();

        assert_eq!(health.airports, 4);
        assert_eq!(health.routes, 3);
        assert_eq!(health.graph_nodes, 4);
        assert_eq!(health.graph_edges, 3);
        assert!(health.communities >= 1);
        assert!(!health.degraded);
    }

    #[test]
    fn invalid_config_is_rejected_before_building() {
        let config = Config {
            community_resolution: -1.0,
            ..Config::default()
        };
        assert!(AnalysisContext::new(AirportTable::new(), Vec::new(), &config).is_err());
    }

    #[test]
    fn context_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<AnalysisContext>();
    }
}
