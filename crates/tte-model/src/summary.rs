//! Summary counts reported after a completed run.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::EventMode;

/// Counts describing the output table of one integration run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntegrationSummary {
    /// Total output rows, split segments included.
    pub rows: usize,
    /// Event occurrences recorded across all subjects.
    pub events: usize,
    /// Name of the outcome column in the output.
    pub outcome_column: String,
    pub mode: EventMode,
    /// Row counts keyed by outcome code (0 = censored).
    pub rows_by_code: BTreeMap<i64, usize>,
}

impl IntegrationSummary {
    /// Rows carrying no outcome.
    pub fn censored_rows(&self) -> usize {
        self.rows_by_code.get(&0).copied().unwrap_or(0)
    }
}
