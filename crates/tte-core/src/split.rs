//! Interval splitting at resolved event dates.

use std::collections::BTreeMap;

use tte_model::{EventMode, Result};

use crate::prorate::prorate;
use crate::subjects::{Candidate, IntervalRecord, SubjectIntervals};

/// One output row before assembly.
#[derive(Debug, Clone)]
pub struct OutputRow {
    /// Row in the source interval frame that static covariates come from.
    pub source_row: usize,
    pub start: f64,
    pub stop: f64,
    /// 0 = censored, 1 = primary event, 2.. = competing risks.
    pub outcome: i64,
    /// Continuous covariate values after proration.
    pub continuous: BTreeMap<String, Option<f64>>,
    /// Winning date for event-coded rows; feeds elapsed-time output.
    pub event_date: Option<f64>,
    /// Elapsed time from entry, filled in when requested.
    pub elapsed: Option<f64>,
}

/// Apply every occurrence to one subject's interval sequence.
///
/// An occurrence is captured only when it falls strictly inside a segment;
/// a date on any boundary (including boundaries created by earlier splits)
/// or outside all segments is discarded without effect. The outcome code
/// lands on the segment that ends at the event date. Single mode truncates
/// follow-up at the first captured event; recurring mode keeps splitting.
pub fn split_subject(
    subject: &SubjectIntervals,
    occurrences: &[Candidate],
    mode: EventMode,
) -> Result<Vec<OutputRow>> {
    let mut rows: Vec<OutputRow> = subject.records.iter().map(row_from_record).collect();

    for occurrence in occurrences {
        let date = occurrence.date;
        let Some(index) = rows
            .iter()
            .position(|row| row.start < date && date < row.stop)
        else {
            continue;
        };
        let row = rows[index].clone();
        let (head_values, tail_values) = prorate(
            &row.continuous,
            row.stop - row.start,
            date - row.start,
            &subject.id,
        )?;
        let head = OutputRow {
            source_row: row.source_row,
            start: row.start,
            stop: date,
            outcome: occurrence.code,
            continuous: head_values,
            event_date: Some(date),
            elapsed: None,
        };
        let tail = OutputRow {
            source_row: row.source_row,
            start: date,
            stop: row.stop,
            outcome: 0,
            continuous: tail_values,
            event_date: None,
            elapsed: None,
        };
        match mode {
            EventMode::Single => {
                rows.truncate(index);
                rows.push(head);
                break;
            }
            EventMode::Recurring => {
                rows.splice(index..=index, [head, tail]);
            }
        }
    }
    Ok(rows)
}

fn row_from_record(record: &IntervalRecord) -> OutputRow {
    OutputRow {
        source_row: record.source_row,
        start: record.start,
        stop: record.stop,
        outcome: 0,
        continuous: record.continuous.clone(),
        event_date: None,
        elapsed: None,
    }
}
