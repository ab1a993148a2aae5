//! Results persistence module

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use serde::Serialize;
use serde_json::{json, to_string_pretty, Value};

use crate::analysis::{AnalysisResult, HealthSummary};
use crate::cluster::metrics::CommunityStats;
use crate::error::Result;
use crate::viz::FeatureSet;

/// Community figures included in the run summary
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CommunitySummary {
    pub modularity: f64,
    pub stats: Vec<CommunityStats>,
}

/// Save one run's analysis and rendering output to `output_dir`
pub fn save_results(
    result: &AnalysisResult,
    features: &FeatureSet,
    health: &HealthSummary,
    communities: &CommunitySummary,
    output_dir: impl AsRef<Path>,
) -> Result<()> {
    let output_dir = output_dir.as_ref();
    log::info!("Saving results to {}", output_dir.display());

    fs::create_dir_all(output_dir)?;

    write_json(&output_dir.join("analysis.json"), &serde_json::to_value(result)?)?;
    write_json(&output_dir.join("airports.geojson"), &features.airports_geojson())?;
    write_json(&output_dir.join("routes.geojson"), &features.routes_geojson())?;
    save_summary(result, features, health, communities, output_dir)?;

    log::info!("Results saved successfully");

    Ok(())
}

fn save_summary(
    result: &AnalysisResult,
    features: &FeatureSet,
    health: &HealthSummary,
    communities: &CommunitySummary,
    output_dir: &Path,
) -> Result<()> {
    let largest_before = result.before.largest_component_size;
    let retained = if largest_before == 0 {
        0.0
    } else {
        result.after.largest_component_size as f64 / largest_before as f64
    };

    let summary = json!({
        "health": health,
        "disruption": {
            "disrupted_count": result.disrupted_list.len(),
            "stranded_count": result.stranded.len(),
            "largest_component_retained": retained,
            "efficiency_loss": result.before.global_efficiency - result.after.global_efficiency,
        },
        "communities": {
            "count": features.community_count,
            "modularity": communities.modularity,
            "largest": communities.stats.iter().take(10).collect::<Vec<_>>(),
        },
        "features": {
            "airports": features.airports.len(),
            "routes": features.routes.len(),
            "bridges": features.routes.iter().filter(|r| r.group < 0).count(),
        }
    });

    write_json(&output_dir.join("summary.json"), &summary)
}

fn write_json(path: &Path, value: &Value) -> Result<()> {
    log::debug!("Writing {}", path.display());
    let mut file = File::create(path)?;
    file.write_all(to_string_pretty(value)?.as_bytes())?;
    Ok(())
}
