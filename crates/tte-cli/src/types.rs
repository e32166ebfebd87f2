use std::collections::BTreeMap;
use std::path::PathBuf;

use tte_model::IntegrationSummary;

#[derive(Debug)]
pub struct RunOutcome {
    pub summary: IntegrationSummary,
    /// Labels for the outcome codes, for summary display.
    pub labels: BTreeMap<i64, String>,
    /// Written output path; `None` on a dry run.
    pub output: Option<PathBuf>,
}
