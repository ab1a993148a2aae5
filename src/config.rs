//! Configuration management for the route resilience analyzer

use crate::error::{AnalyzerError, Result};

/// Default configuration for the route resilience analyzer
#[derive(Debug, Clone)]
pub struct Config {
    /// Routes with more stops than this are excluded from the graph
    pub max_stops: u32,

    /// Optional cap on the number of accepted routes
    pub max_routes: Option<usize>,

    /// Key airports and routes by numeric airport id instead of IATA/ICAO codes
    pub use_ids: bool,

    /// Seed for community detection tie-breaking
    pub community_seed: u64,

    /// Louvain resolution; above 1 favours smaller communities
    pub community_resolution: f64,

    /// Minimum modularity gain required to aggregate another level
    pub community_threshold: f64,

    /// Great-circle interpolation steps for route geometry (0 = straight lines)
    pub gc_steps: u32,

    /// Worker threads (0 = all available cores)
    pub threads: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_stops: 1,
            max_routes: None,
            use_ids: false,
            community_seed: 42,
            community_resolution: 1.0,
            community_threshold: 1e-7,
            gc_steps: 0,
            threads: 0,
        }
    }
}

impl Config {
    /// Create a new configuration with custom loading values, keeping
    /// community and rendering defaults
    pub fn new(max_stops: u32, max_routes: Option<usize>, use_ids: bool) -> Self {
        Self {
            max_stops,
            max_routes,
            use_ids,
            ..Self::default()
        }
    }

    /// Reject values the algorithms cannot work with
    pub fn validate(&self) -> Result<()> {
        if !self.community_resolution.is_finite() || self.community_resolution <= 0.0 {
            return Err(AnalyzerError::InvalidConfig(format!(
                "community resolution must be a positive number, got {}",
                self.community_resolution
            )));
        }

        if !self.community_threshold.is_finite() || self.community_threshold < 0.0 {
            return Err(AnalyzerError::InvalidConfig(format!(
                "community threshold must be a non-negative number, got {}",
                self.community_threshold
            )));
        }

        if self.max_routes == Some(0) {
            return Err(AnalyzerError::InvalidConfig(
                "max routes must be at least 1 when set".to_string(),
            ));
        }

        Ok(())
    }
}
