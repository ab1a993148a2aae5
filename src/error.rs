//! Error types for the route resilience analyzer

use std::path::PathBuf;
use thiserror::Error;

/// Errors reported by the analyzer library
#[derive(Error, Debug)]
pub enum AnalyzerError {
    /// Centrality metric name outside the supported set
    #[error("Unknown centrality metric: {0} (expected degree, closeness or betweenness)")]
    UnknownMetric(String),

    /// Configuration value out of range
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Required input file is absent
    #[error("Required data file not found: {}", .0.display())]
    MissingData(PathBuf),

    /// CSV reader failure
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Filesystem failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding failure
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, AnalyzerError>;
