//! Airport table loading

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::data::{clean, ensure_exists, is_row_error};
use crate::error::Result;

/// A single airport record with valid coordinates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Airport {
    /// Numeric identifier from the source table (may be empty)
    pub id: String,
    pub name: String,
    pub city: String,
    pub country: String,
    /// IATA code (may be empty)
    pub iata: String,
    /// ICAO code (may be empty)
    pub icao: String,
    /// Latitude in degrees
    pub latitude: f64,
    /// Longitude in degrees
    pub longitude: f64,
}

/// Airports indexed by every code they can be addressed with.
///
/// Several codes may resolve to the same stored record (an airport is
/// reachable through both its IATA and ICAO code). Codes keep the order in
/// which they were first registered.
#[derive(Debug, Clone, Default)]
pub struct AirportTable {
    /// Stored records
    records: Vec<Airport>,

    /// Codes in registration order
    codes: Vec<String>,

    /// Mapping from code to record index
    index: HashMap<String, usize>,
}

impl AirportTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a record and register it under each of the given codes.
    ///
    /// Empty codes are ignored. A code that was already registered is
    /// repointed to the new record but keeps its original position.
    pub fn insert<I, S>(&mut self, airport: Airport, codes: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let record_idx = self.records.len();
        self.records.push(airport);

        for code in codes {
            let code = code.into();
            if code.is_empty() {
                continue;
            }
            if self.index.insert(code.clone(), record_idx).is_none() {
                self.codes.push(code);
            }
        }
    }

    /// Look up an airport by any of its codes
    pub fn get(&self, code: &str) -> Option<&Airport> {
        self.index.get(code).map(|&idx| &self.records[idx])
    }

    /// Whether a code resolves to an airport
    pub fn contains(&self, code: &str) -> bool {
        self.index.contains_key(code)
    }

    /// Iterate over `(code, airport)` pairs in registration order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Airport)> + '_ {
        self.codes
            .iter()
            .map(move |code| (code.as_str(), &self.records[self.index[code]]))
    }

    /// Number of stored records
    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    /// Number of registered codes
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

/// Raw airport row as found in the CSV file
#[derive(Debug, Deserialize)]
struct AirportRow {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    city: Option<String>,
    #[serde(default)]
    country: Option<String>,
    #[serde(default)]
    iata: Option<String>,
    #[serde(default)]
    icao: Option<String>,
    #[serde(default)]
    latitude: Option<String>,
    #[serde(default)]
    longitude: Option<String>,
}

/// Load airports from a CSV file.
///
/// With `use_ids` the records are keyed by their numeric id; otherwise by
/// both IATA and ICAO code so routes using either scheme resolve.
pub fn load_airports(path: impl AsRef<Path>, use_ids: bool) -> Result<AirportTable> {
    let path = path.as_ref();
    log::info!("Reading airports file: {}", path.display());
    ensure_exists(path)?;

    let table = read_airports(File::open(path)?, use_ids)?;

    log::info!(
        "Loaded {} airports (indexed by {} codes)",
        table.record_count(),
        table.len()
    );

    Ok(table)
}

/// Parse airports from any CSV source, skipping rows without usable coordinates
pub fn read_airports<R: Read>(source: R, use_ids: bool) -> Result<AirportTable> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(source);

    let mut table = AirportTable::new();
    let mut skipped = 0usize;

    for row in reader.deserialize::<AirportRow>() {
        let row = match row {
            Ok(row) => row,
            Err(err) if is_row_error(&err) => {
                skipped += 1;
                continue;
            }
            Err(err) => return Err(err.into()),
        };

        let coords = clean(row.latitude)
            .zip(clean(row.longitude))
            .and_then(|(lat, lon)| Some((lat.parse::<f64>().ok()?, lon.parse::<f64>().ok()?)));

        let Some((latitude, longitude)) = coords.filter(|(lat, lon)| lat.is_finite() && lon.is_finite())
        else {
            skipped += 1;
            continue;
        };

        let airport = Airport {
            id: clean(row.id).unwrap_or_default(),
            name: clean(row.name).unwrap_or_default(),
            city: clean(row.city).unwrap_or_default(),
            country: clean(row.country).unwrap_or_default(),
            iata: clean(row.iata).unwrap_or_default(),
            icao: clean(row.icao).unwrap_or_default(),
            latitude,
            longitude,
        };

        let codes = if use_ids {
            vec![airport.id.clone()]
        } else {
            vec![airport.iata.clone(), airport.icao.clone()]
        };

        table.insert(airport, codes);
    }

    log::debug!("Skipped {} airport rows without usable coordinates", skipped);

    Ok(table)
}
