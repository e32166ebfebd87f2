//! Configuration validation against the loaded table schemas.
//!
//! Every column reference is resolved here, before any row is touched, so a
//! failing run leaves both input tables untouched.

use polars::prelude::DataFrame;
use tracing::warn;

use tte_model::{EventConfig, EventMode, Result, TteError};

/// A configuration whose references have been resolved against both schemas.
#[derive(Debug, Clone)]
pub struct ValidatedConfig {
    pub config: EventConfig,
    /// Event-table columns holding occurrence dates, in resolution order.
    /// Single mode: exactly the primary date column. Recurring mode: the
    /// bare name (when present) followed by numbered family members.
    pub occurrence_columns: Vec<String>,
    /// Competing-risk columns in effect; always empty under recurring mode.
    pub compete_columns: Vec<String>,
}

/// Validate `config` against the interval and event table schemas.
///
/// Pure check: no data is read beyond the column names.
pub fn validate_config(
    intervals: &DataFrame,
    events: &DataFrame,
    config: &EventConfig,
) -> Result<ValidatedConfig> {
    for (name, value) in [
        ("id", &config.id),
        ("date", &config.date),
        ("startvar", &config.startvar),
        ("stopvar", &config.stopvar),
        ("generate", &config.generate),
    ] {
        if value.trim().is_empty() {
            return Err(TteError::MissingOption(name));
        }
    }

    require_column(intervals, "interval", &config.id)?;
    require_column(intervals, "interval", &config.startvar)?;
    require_column(intervals, "interval", &config.stopvar)?;
    require_column(events, "event", &config.id)?;

    let occurrence_columns = match config.mode {
        EventMode::Single => {
            require_column(events, "event", &config.date)?;
            vec![config.date.clone()]
        }
        EventMode::Recurring => {
            let family = occurrence_family(events, &config.date);
            if family.is_empty() {
                return Err(TteError::MissingColumn {
                    table: "event",
                    column: config.date.clone(),
                });
            }
            family
        }
    };

    let compete_columns = match config.mode {
        EventMode::Single => {
            for column in &config.compete {
                require_column(events, "event", column)?;
            }
            config.compete.clone()
        }
        EventMode::Recurring => {
            if !config.compete.is_empty() {
                warn!(
                    columns = ?config.compete,
                    "competing-risk columns are ignored for recurring events"
                );
            }
            Vec::new()
        }
    };

    for column in &config.continuous {
        require_column(intervals, "interval", column)?;
    }

    let label_column = config.label_column();
    let mut output_names: Vec<&str> = vec![config.generate.as_str()];
    if !config.labels.is_empty() {
        output_names.push(label_column.as_str());
    }
    if let Some(timegen) = &config.timegen {
        output_names.push(timegen.as_str());
    }
    for (index, name) in output_names.iter().enumerate() {
        if output_names[..index].contains(name) {
            return Err(TteError::DuplicateOutput {
                column: (*name).to_string(),
            });
        }
    }

    for column in &config.keepvars {
        require_column(events, "event", column)?;
        if has_column(intervals, column) {
            return Err(TteError::ColumnCollision {
                column: column.clone(),
            });
        }
        if output_names.contains(&column.as_str()) {
            return Err(TteError::DuplicateOutput {
                column: column.clone(),
            });
        }
    }

    if !config.replace {
        if has_column(intervals, &config.generate) {
            return Err(TteError::ColumnExists {
                column: config.generate.clone(),
            });
        }
        if let Some(timegen) = &config.timegen {
            if has_column(intervals, timegen) {
                return Err(TteError::ColumnExists {
                    column: timegen.clone(),
                });
            }
        }
    }

    Ok(ValidatedConfig {
        config: config.clone(),
        occurrence_columns,
        compete_columns,
    })
}

fn has_column(frame: &DataFrame, name: &str) -> bool {
    frame
        .get_column_names()
        .iter()
        .any(|column| column.as_str() == name)
}

fn require_column(frame: &DataFrame, table: &'static str, name: &str) -> Result<()> {
    if has_column(frame, name) {
        Ok(())
    } else {
        Err(TteError::MissingColumn {
            table,
            column: name.to_string(),
        })
    }
}

/// Resolve the occurrence column family `<date>`, `<date>1`, `<date>2`, ...
/// present in the event table, bare name first, then ascending suffix.
fn occurrence_family(events: &DataFrame, date: &str) -> Vec<String> {
    let mut bare = None;
    let mut numbered: Vec<(u32, String)> = Vec::new();
    for column in events.get_column_names() {
        let name = column.as_str();
        if name == date {
            bare = Some(name.to_string());
            continue;
        }
        if let Some(suffix) = name.strip_prefix(date) {
            if !suffix.is_empty() && suffix.chars().all(|ch| ch.is_ascii_digit()) {
                if let Ok(index) = suffix.parse::<u32>() {
                    numbered.push((index, name.to_string()));
                }
            }
        }
    }
    numbered.sort_by_key(|(index, _)| *index);
    let mut family: Vec<String> = Vec::new();
    family.extend(bare);
    family.extend(numbered.into_iter().map(|(_, name)| name));
    family
}
