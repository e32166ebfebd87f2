//! CSV output writing.

use std::path::Path;

use polars::prelude::{AnyValue, DataFrame};
use tracing::debug;

use tte_model::{Result, TteError};

use crate::polars_utils::any_to_string;

/// Write a `DataFrame` to a CSV file with a header row.
///
/// Null cells render as empty fields; whole floats drop the `.0` suffix.
pub fn write_csv_frame(frame: &DataFrame, path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)?;
    let mut writer = csv::Writer::from_writer(file);

    let names: Vec<String> = frame
        .get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect();
    writer.write_record(&names).map_err(csv_error)?;

    let columns = frame.get_columns();
    for idx in 0..frame.height() {
        let mut record = Vec::with_capacity(columns.len());
        for column in columns {
            let value = column.get(idx).unwrap_or(AnyValue::Null);
            record.push(any_to_string(value));
        }
        writer.write_record(&record).map_err(csv_error)?;
    }
    writer.flush()?;
    debug!(path = %path.display(), rows = frame.height(), "wrote csv table");
    Ok(())
}

fn csv_error(error: csv::Error) -> TteError {
    TteError::Io(std::io::Error::other(error))
}
