//! Configuration options for event integration runs.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// How event occurrences affect follow-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EventMode {
    /// Terminal outcome: follow-up is truncated at the first event.
    #[default]
    Single,
    /// Repeatable outcome: every occurrence is recorded, nothing is truncated.
    Recurring,
}

impl EventMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::Recurring => "recurring",
        }
    }
}

/// Unit for elapsed-time output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TimeUnit {
    #[default]
    Days,
    Months,
    Years,
}

impl TimeUnit {
    /// Divisor applied to a day count to express it in this unit.
    ///
    /// Months use the mean Gregorian month (30.4375 days) and years the
    /// Julian year (365.25 days).
    pub fn divisor(self) -> f64 {
        match self {
            Self::Days => 1.0,
            Self::Months => 30.4375,
            Self::Years => 365.25,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Days => "days",
            Self::Months => "months",
            Self::Years => "years",
        }
    }
}

/// Immutable configuration for one integration run.
///
/// Column references are resolved against the loaded table schemas before
/// any row is processed; see the validator in `tte-core`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventConfig {
    /// Subject-id column, present in both tables.
    pub id: String,
    /// Primary event date column in the event table. Under recurring mode
    /// this also names the occurrence column family (`date`, `date1`, ...).
    pub date: String,
    /// Interval start boundary column.
    pub startvar: String,
    /// Interval stop boundary column.
    pub stopvar: String,
    pub mode: EventMode,
    /// Competing-risk date columns, in precedence order. Ignored (with a
    /// diagnostic) under recurring mode.
    pub compete: Vec<String>,
    /// Name of the outcome column added to the output.
    pub generate: String,
    /// Event-table columns copied verbatim onto each subject's output rows.
    pub keepvars: Vec<String>,
    /// Cumulative covariates prorated across splits.
    pub continuous: Vec<String>,
    /// Name for the elapsed-time column, when requested.
    pub timegen: Option<String>,
    pub timeunit: TimeUnit,
    /// Display labels keyed by outcome code.
    pub labels: BTreeMap<i64, String>,
    /// Permit replacing existing `generate`/`timegen` columns.
    pub replace: bool,
}

impl EventConfig {
    /// Create a configuration with default boundary names (`start`/`stop`),
    /// outcome name (`_failure`), single mode, and day units.
    pub fn new(id: impl Into<String>, date: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            date: date.into(),
            startvar: "start".to_string(),
            stopvar: "stop".to_string(),
            mode: EventMode::default(),
            compete: Vec::new(),
            generate: "_failure".to_string(),
            keepvars: Vec::new(),
            continuous: Vec::new(),
            timegen: None,
            timeunit: TimeUnit::default(),
            labels: BTreeMap::new(),
            replace: false,
        }
    }

    pub fn with_mode(mut self, mode: EventMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_boundaries(mut self, startvar: impl Into<String>, stopvar: impl Into<String>) -> Self {
        self.startvar = startvar.into();
        self.stopvar = stopvar.into();
        self
    }

    pub fn with_compete(mut self, columns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.compete = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_generate(mut self, name: impl Into<String>) -> Self {
        self.generate = name.into();
        self
    }

    pub fn with_keepvars(mut self, columns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.keepvars = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_continuous(mut self, columns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.continuous = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_timegen(mut self, name: impl Into<String>, unit: TimeUnit) -> Self {
        self.timegen = Some(name.into());
        self.timeunit = unit;
        self
    }

    pub fn with_labels(mut self, labels: BTreeMap<i64, String>) -> Self {
        self.labels = labels;
        self
    }

    pub fn with_replace(mut self, replace: bool) -> Self {
        self.replace = replace;
        self
    }

    /// Name of the companion label column emitted when labels are configured.
    pub fn label_column(&self) -> String {
        format!("{}_label", self.generate)
    }
}
