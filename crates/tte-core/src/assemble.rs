//! Final table assembly and summary counts.
//!
//! Column order: the original interval columns (with boundary and continuous
//! values rewritten), then the outcome column, its optional label column,
//! the optional elapsed-time column, and retained event columns.

use std::collections::BTreeMap;

use polars::prelude::{AnyValue, Column, DataFrame};

use tte_ingest::{any_to_f64, any_to_string, is_numeric_dtype};
use tte_model::{IntegrationSummary, Result, TteError};

use crate::schema::ValidatedConfig;
use crate::split::OutputRow;

/// Rows for one subject, paired with its retained-column source row.
#[derive(Debug, Clone)]
pub struct SubjectOutput {
    pub id: String,
    pub rows: Vec<OutputRow>,
    /// Event-table row retained columns are copied from, when the subject
    /// appears there.
    pub event_source_row: Option<usize>,
}

/// Merge all subjects' rows into the output frame and count outcomes.
pub fn assemble(
    intervals: &DataFrame,
    events: &DataFrame,
    validated: &ValidatedConfig,
    subjects: &[SubjectOutput],
) -> Result<(DataFrame, IntegrationSummary)> {
    let config = &validated.config;
    let flat: Vec<(&SubjectOutput, &OutputRow)> = subjects
        .iter()
        .flat_map(|subject| subject.rows.iter().map(move |row| (subject, row)))
        .collect();

    let mut columns: Vec<Column> = Vec::new();
    for source in intervals.get_columns() {
        let name = source.name().as_str();
        if name == config.generate || Some(name) == config.timegen.as_deref() {
            // Validated as replaceable; the fresh column is appended below.
            continue;
        }
        if name == config.startvar {
            let values: Vec<f64> = flat.iter().map(|(_, row)| row.start).collect();
            columns.push(Column::new(source.name().clone(), values));
        } else if name == config.stopvar {
            let values: Vec<f64> = flat.iter().map(|(_, row)| row.stop).collect();
            columns.push(Column::new(source.name().clone(), values));
        } else if config.continuous.iter().any(|column| column == name) {
            let values: Vec<Option<f64>> = flat
                .iter()
                .map(|(_, row)| row.continuous.get(name).copied().flatten())
                .collect();
            columns.push(Column::new(source.name().clone(), values));
        } else {
            columns.push(copy_column(source, &flat));
        }
    }

    let outcomes: Vec<i64> = flat.iter().map(|(_, row)| row.outcome).collect();
    columns.push(Column::new(config.generate.as_str().into(), outcomes));

    if !config.labels.is_empty() {
        let labels: Vec<String> = flat
            .iter()
            .map(|(_, row)| {
                config
                    .labels
                    .get(&row.outcome)
                    .cloned()
                    .unwrap_or_else(|| row.outcome.to_string())
            })
            .collect();
        columns.push(Column::new(config.label_column().as_str().into(), labels));
    }

    if let Some(timegen) = &config.timegen {
        let values: Vec<Option<f64>> = flat.iter().map(|(_, row)| row.elapsed).collect();
        columns.push(Column::new(timegen.as_str().into(), values));
    }

    for keepvar in &config.keepvars {
        columns.push(retained_column(events, keepvar, &flat)?);
    }

    let frame = DataFrame::new(columns).map_err(|error| TteError::Message(error.to_string()))?;
    let summary = summarize(&flat, config.generate.clone(), validated);
    Ok((frame, summary))
}

/// Copy a static interval column, one value per output row.
fn copy_column(source: &Column, flat: &[(&SubjectOutput, &OutputRow)]) -> Column {
    if is_numeric_dtype(source.dtype()) {
        let values: Vec<Option<f64>> = flat
            .iter()
            .map(|(_, row)| any_to_f64(cell(source, row.source_row)))
            .collect();
        Column::new(source.name().clone(), values)
    } else {
        let values: Vec<Option<String>> = flat
            .iter()
            .map(|(_, row)| match cell(source, row.source_row) {
                AnyValue::Null => None,
                other => Some(any_to_string(other)),
            })
            .collect();
        Column::new(source.name().clone(), values)
    }
}

/// Copy a retained event column onto every output row of each subject.
fn retained_column(
    events: &DataFrame,
    name: &str,
    flat: &[(&SubjectOutput, &OutputRow)],
) -> Result<Column> {
    let source = events
        .column(name)
        .map_err(|error| TteError::Message(error.to_string()))?;
    if is_numeric_dtype(source.dtype()) {
        let values: Vec<Option<f64>> = flat
            .iter()
            .map(|(subject, _)| {
                subject
                    .event_source_row
                    .and_then(|row| any_to_f64(cell(source, row)))
            })
            .collect();
        Ok(Column::new(source.name().clone(), values))
    } else {
        let values: Vec<Option<String>> = flat
            .iter()
            .map(|(subject, _)| {
                subject.event_source_row.and_then(|row| {
                    match cell(source, row) {
                        AnyValue::Null => None,
                        other => Some(any_to_string(other)),
                    }
                })
            })
            .collect();
        Ok(Column::new(source.name().clone(), values))
    }
}

fn summarize(
    flat: &[(&SubjectOutput, &OutputRow)],
    outcome_column: String,
    validated: &ValidatedConfig,
) -> IntegrationSummary {
    let mut rows_by_code: BTreeMap<i64, usize> = BTreeMap::new();
    for (_, row) in flat {
        *rows_by_code.entry(row.outcome).or_insert(0) += 1;
    }
    let events = flat.iter().filter(|(_, row)| row.outcome > 0).count();
    IntegrationSummary {
        rows: flat.len(),
        events,
        outcome_column,
        mode: validated.config.mode,
        rows_by_code,
    }
}

fn cell(column: &Column, row: usize) -> AnyValue<'_> {
    column.get(row).unwrap_or(AnyValue::Null)
}
