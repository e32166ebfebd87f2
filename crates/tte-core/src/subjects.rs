//! Typed per-subject extraction from the two input frames.
//!
//! Boundary and event cells are coerced to numeric days here, and every
//! interval is integrity-checked before any downstream stage runs.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use polars::prelude::{AnyValue, Column, DataFrame};
use tracing::debug;

use tte_ingest::{any_to_days, any_to_f64, any_to_string};
use tte_model::{Result, TteError};

use crate::schema::ValidatedConfig;

/// One input interval row, boundaries coerced to numeric days.
#[derive(Debug, Clone)]
pub struct IntervalRecord {
    /// Row index in the source interval frame; static covariates are copied
    /// from here at assembly time.
    pub source_row: usize,
    pub start: f64,
    pub stop: f64,
    /// Current values of the configured continuous covariates.
    pub continuous: BTreeMap<String, Option<f64>>,
}

impl IntervalRecord {
    pub fn duration(&self) -> f64 {
        self.stop - self.start
    }
}

/// A candidate event date tagged with its outcome code.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub date: f64,
    pub code: i64,
}

/// One subject's interval sequence, ordered by start.
#[derive(Debug, Clone)]
pub struct SubjectIntervals {
    pub id: String,
    pub records: Vec<IntervalRecord>,
}

impl SubjectIntervals {
    /// Earliest interval start; the subject's entry into follow-up.
    pub fn entry(&self) -> Option<f64> {
        self.records.first().map(|record| record.start)
    }
}

/// Everything extracted from the event table for one subject.
#[derive(Debug, Clone, Default)]
pub struct SubjectEvents {
    /// Candidate dates pooled across the subject's event rows.
    pub candidates: Vec<Candidate>,
    /// First event row for the subject; retained columns are copied from it.
    pub source_row: usize,
}

/// Extract and integrity-check the interval table.
///
/// Subjects come back in deterministic order: ids that parse as numbers
/// first, in numeric order, then the remaining ids lexically. A missing
/// boundary or a stop at or before its start aborts the run with
/// [`TteError::DataIntegrity`].
pub fn extract_intervals(
    intervals: &DataFrame,
    validated: &ValidatedConfig,
) -> Result<Vec<SubjectIntervals>> {
    let config = &validated.config;
    let id_column = column(intervals, &config.id)?;
    let start_column = column(intervals, &config.startvar)?;
    let stop_column = column(intervals, &config.stopvar)?;
    let continuous_columns: Vec<(&str, &Column)> = config
        .continuous
        .iter()
        .map(|name| Ok((name.as_str(), column(intervals, name)?)))
        .collect::<Result<_>>()?;

    let mut order: Vec<String> = Vec::new();
    let mut by_id: BTreeMap<String, Vec<IntervalRecord>> = BTreeMap::new();

    for row in 0..intervals.height() {
        let id = any_to_string(cell(id_column, row));
        if id.is_empty() {
            return Err(TteError::DataIntegrity {
                subject: format!("interval row {}", row + 1),
                detail: "missing subject identifier".to_string(),
            });
        }
        let start = boundary(start_column, row, &id, &config.startvar)?;
        let stop = boundary(stop_column, row, &id, &config.stopvar)?;
        if stop <= start {
            return Err(TteError::DataIntegrity {
                subject: id,
                detail: format!("interval stop ({stop}) is not after start ({start})"),
            });
        }
        let continuous = continuous_columns
            .iter()
            .map(|(name, column)| ((*name).to_string(), any_to_f64(cell(column, row))))
            .collect();

        if !by_id.contains_key(&id) {
            order.push(id.clone());
        }
        by_id.entry(id).or_default().push(IntervalRecord {
            source_row: row,
            start,
            stop,
            continuous,
        });
    }

    order.sort_by(|a, b| compare_ids(a, b));
    let mut subjects = Vec::with_capacity(order.len());
    for id in order {
        let mut records = by_id.remove(&id).unwrap_or_default();
        records.sort_by(|a, b| {
            compare_f64(a.start, b.start).then_with(|| compare_f64(a.stop, b.stop))
        });
        subjects.push(SubjectIntervals { id, records });
    }
    Ok(subjects)
}

/// Extract candidate dates from the event table, keyed by subject id.
///
/// Single mode tags the primary column with code 1 and the j-th competing
/// column with code j+1. Recurring mode tags every occurrence column with
/// code 1. Unparseable date cells count as missing.
pub fn extract_events(
    events: &DataFrame,
    validated: &ValidatedConfig,
) -> Result<BTreeMap<String, SubjectEvents>> {
    let config = &validated.config;
    let id_column = column(events, &config.id)?;
    let occurrence_columns: Vec<&Column> = validated
        .occurrence_columns
        .iter()
        .map(|name| column(events, name))
        .collect::<Result<_>>()?;
    let compete_columns: Vec<&Column> = validated
        .compete_columns
        .iter()
        .map(|name| column(events, name))
        .collect::<Result<_>>()?;

    let mut by_id: BTreeMap<String, SubjectEvents> = BTreeMap::new();
    for row in 0..events.height() {
        let id = any_to_string(cell(id_column, row));
        if id.is_empty() {
            continue;
        }
        let entry = by_id.entry(id).or_insert_with(|| SubjectEvents {
            candidates: Vec::new(),
            source_row: row,
        });
        for occurrence in &occurrence_columns {
            if let Some(date) = event_date(occurrence, row) {
                entry.candidates.push(Candidate { date, code: 1 });
            }
        }
        for (index, compete) in compete_columns.iter().enumerate() {
            if let Some(date) = event_date(compete, row) {
                entry.candidates.push(Candidate {
                    date,
                    code: index as i64 + 2,
                });
            }
        }
    }
    Ok(by_id)
}

fn event_date(column: &Column, row: usize) -> Option<f64> {
    let value = cell(column, row);
    let date = any_to_days(value.clone());
    if date.is_none() {
        let raw = any_to_string(value);
        if !raw.is_empty() {
            debug!(
                column = column.name().as_str(),
                row,
                value = %raw,
                "unparseable event date treated as missing"
            );
        }
    }
    date
}

fn boundary(column: &Column, row: usize, subject: &str, name: &str) -> Result<f64> {
    any_to_days(cell(column, row)).ok_or_else(|| TteError::DataIntegrity {
        subject: subject.to_string(),
        detail: format!("interval boundary '{name}' is missing or not a date"),
    })
}

fn column<'a>(frame: &'a DataFrame, name: &str) -> Result<&'a Column> {
    frame
        .column(name)
        .map_err(|error| TteError::Message(error.to_string()))
}

fn cell(column: &Column, row: usize) -> AnyValue<'_> {
    column.get(row).unwrap_or(AnyValue::Null)
}

fn compare_f64(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

/// Total order over subject ids: numeric ids first in numeric order, then
/// the rest lexically. Equal numeric values fall back to the lexical form
/// so the order stays antisymmetric ("1" vs "1.0").
fn compare_ids(a: &str, b: &str) -> Ordering {
    match (a.parse::<f64>(), b.parse::<f64>()) {
        (Ok(x), Ok(y)) => x.total_cmp(&y).then_with(|| a.cmp(b)),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}
