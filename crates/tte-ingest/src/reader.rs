//! CSV input loading.

use std::path::Path;

use polars::prelude::{CsvReadOptions, DataFrame, PolarsError, SerReader};
use tracing::debug;

use tte_model::{Result, TteError};

/// Read a CSV file into a `DataFrame`.
///
/// The file must carry a header row. A missing or unreadable file surfaces
/// as [`TteError::Input`]; an empty table (headers only) is not an error.
pub fn read_csv_frame(path: &Path) -> Result<DataFrame> {
    if !path.exists() {
        return Err(TteError::Input {
            path: path.to_path_buf(),
            detail: "file not found".to_string(),
        });
    }
    let frame = CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .map_err(|error| input_error(path, &error))?
        .finish()
        .map_err(|error| input_error(path, &error))?;
    debug!(
        path = %path.display(),
        rows = frame.height(),
        columns = frame.width(),
        "loaded csv table"
    );
    Ok(frame)
}

fn input_error(path: &Path, error: &PolarsError) -> TteError {
    TteError::Input {
        path: path.to_path_buf(),
        detail: error.to_string(),
    }
}
