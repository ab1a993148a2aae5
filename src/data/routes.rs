//! Route list loading

use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::data::{clean, ensure_exists, is_row_error};
use crate::error::Result;

/// A directed route between two airport keys
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Route {
    pub source: String,
    pub destination: String,
    /// Intermediate stops (0 = direct)
    pub stops: u32,
}

impl Route {
    pub fn new(source: impl Into<String>, destination: impl Into<String>, stops: u32) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
            stops,
        }
    }
}

/// Raw route row as found in the CSV file
#[derive(Debug, Deserialize)]
struct RouteRow {
    #[serde(default)]
    src_airport: Option<String>,
    #[serde(default)]
    src_id: Option<String>,
    #[serde(default)]
    dst_airport: Option<String>,
    #[serde(default)]
    dst_id: Option<String>,
    #[serde(default)]
    stops: Option<String>,
}

/// Stop count of a row. Missing or unparseable values count as a direct route.
fn parse_stops(stops: Option<String>) -> u32 {
    clean(stops)
        .and_then(|value| value.parse::<u32>().ok())
        .unwrap_or(0)
}

/// Load eligible routes from a CSV file
pub fn load_routes(path: impl AsRef<Path>, config: &Config) -> Result<Vec<Route>> {
    let path = path.as_ref();
    log::info!("Reading routes file: {}", path.display());
    ensure_exists(path)?;

    let routes = read_routes(File::open(path)?, config)?;

    log::info!("Loaded {} routes", routes.len());

    Ok(routes)
}

/// Parse eligible routes from any CSV source.
///
/// Keeps routes with both endpoints present and at most `max_stops` stops,
/// collapses repeated `(source, destination)` pairs to their first
/// occurrence and stops reading once `max_routes` routes were accepted.
pub fn read_routes<R: Read>(source: R, config: &Config) -> Result<Vec<Route>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(source);

    let mut routes = Vec::new();
    let mut seen: HashSet<(String, String)> = HashSet::new();
    let mut defaulted_stops = 0usize;

    for row in reader.deserialize::<RouteRow>() {
        let row = match row {
            Ok(row) => row,
            Err(err) if is_row_error(&err) => continue,
            Err(err) => return Err(err.into()),
        };

        let (src, dst) = if config.use_ids {
            (clean(row.src_id), clean(row.dst_id))
        } else {
            (clean(row.src_airport), clean(row.dst_airport))
        };

        let (Some(src), Some(dst)) = (src, dst) else {
            continue;
        };

        if clean(row.stops.clone()).map_or(true, |s| s.parse::<u32>().is_err()) {
            defaulted_stops += 1;
        }
        let stops = parse_stops(row.stops);
        if stops > config.max_stops {
            continue;
        }

        if !seen.insert((src.clone(), dst.clone())) {
            continue;
        }
        routes.push(Route::new(src, dst, stops));

        if config.max_routes.is_some_and(|cap| routes.len() >= cap) {
            log::debug!("Route cap of {} reached", routes.len());
            break;
        }
    }

    if defaulted_stops > 0 {
        log::debug!(
            "{} route rows had a missing or unparseable stop count and were treated as direct",
            defaulted_stops
        );
    }

    Ok(routes)
}
