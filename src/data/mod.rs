//! CSV ingestion of airport and route tables

pub mod airports;
pub mod routes;

pub use airports::{Airport, AirportTable};
pub use routes::Route;

use std::path::Path;

use crate::error::{AnalyzerError, Result};

/// Fail early with a dedicated error when a required input file is absent
pub(crate) fn ensure_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(AnalyzerError::MissingData(path.to_path_buf()));
    }
    Ok(())
}

/// Trimmed, non-empty field value
pub(crate) fn clean(field: Option<String>) -> Option<String> {
    field
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Row-level deserialization failures are skipped; everything else is fatal
pub(crate) fn is_row_error(err: &csv::Error) -> bool {
    matches!(
        err.kind(),
        csv::ErrorKind::Deserialize { .. } | csv::ErrorKind::UnequalLengths { .. }
    )
}
