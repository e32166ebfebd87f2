//! Batch orchestration of the integration stages.

use polars::prelude::DataFrame;
use tracing::{debug, info};

use tte_model::{EventConfig, IntegrationSummary, Result};

use crate::assemble::{SubjectOutput, assemble};
use crate::resolve::resolve;
use crate::schema::{ValidatedConfig, validate_config};
use crate::split::split_subject;
use crate::subjects::{extract_events, extract_intervals};
use crate::timegen::attach_elapsed_time;

/// Integrate event records into the interval table.
///
/// Pure with respect to its inputs: returns a new frame plus summary counts,
/// or fails before any output row exists. An empty event table is not an
/// error; every row comes back censored.
pub fn integrate_events(
    intervals: &DataFrame,
    events: &DataFrame,
    config: &EventConfig,
) -> Result<(DataFrame, IntegrationSummary)> {
    let validated = validate_config(intervals, events, config)?;
    integrate_validated(intervals, events, &validated)
}

/// Run the integration stages for an already-validated configuration.
pub fn integrate_validated(
    intervals: &DataFrame,
    events: &DataFrame,
    validated: &ValidatedConfig,
) -> Result<(DataFrame, IntegrationSummary)> {
    let subjects = extract_intervals(intervals, validated)?;
    let subject_events = extract_events(events, validated)?;
    info!(
        subjects = subjects.len(),
        intervals = intervals.height(),
        event_rows = events.height(),
        mode = validated.config.mode.as_str(),
        "integrating events"
    );

    let mut outputs = Vec::with_capacity(subjects.len());
    for subject in &subjects {
        let events_for_subject = subject_events.get(&subject.id);
        let occurrences = resolve(validated.config.mode, events_for_subject);
        debug!(
            subject = %subject.id,
            occurrences = occurrences.len(),
            "resolved occurrences"
        );
        let mut rows = split_subject(subject, &occurrences, validated.config.mode)?;
        if validated.config.timegen.is_some() {
            if let Some(entry) = subject.entry() {
                attach_elapsed_time(&mut rows, entry, validated.config.timeunit);
            }
        }
        outputs.push(SubjectOutput {
            id: subject.id.clone(),
            rows,
            event_source_row: events_for_subject.map(|events| events.source_row),
        });
    }

    let (frame, summary) = assemble(intervals, events, validated, &outputs)?;
    info!(
        rows = summary.rows,
        events = summary.events,
        "event integration complete"
    );
    Ok((frame, summary))
}
