//! Core library functions for the route resilience analyzer

pub mod analysis;
pub mod centrality;
pub mod cluster;
pub mod config;
pub mod data;
pub mod disruption;
pub mod error;
pub mod geo;
pub mod graph;
pub mod storage;
pub mod viz;

pub use analysis::{AnalysisContext, AnalysisResult, HealthSummary};
pub use centrality::CentralityMetric;
pub use cluster::{Community, Partition, PartitionOutcome};
pub use config::Config;
pub use disruption::{DisruptionReport, MetricsSnapshot};
pub use error::{AnalyzerError, Result};
pub use graph::{CompressedGraph, GraphBuilder};
