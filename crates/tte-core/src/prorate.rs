//! Proportional adjustment of cumulative covariates across a split.

use std::collections::BTreeMap;

use tte_model::{Result, TteError};

/// Split cumulative covariate values across two sub-intervals.
///
/// The first share is `value * (head / total)` and the second is the exact
/// complement, so both shares always sum to the original value. Missing
/// values stay missing on both sides. A non-positive `total` cannot occur
/// for integrity-checked intervals but is rejected rather than dividing by
/// zero.
pub fn prorate(
    values: &BTreeMap<String, Option<f64>>,
    total: f64,
    head: f64,
    subject: &str,
) -> Result<(BTreeMap<String, Option<f64>>, BTreeMap<String, Option<f64>>)> {
    if total <= 0.0 {
        return Err(TteError::DataIntegrity {
            subject: subject.to_string(),
            detail: "cannot prorate across a zero-length interval".to_string(),
        });
    }
    let fraction = head / total;
    let mut first = BTreeMap::new();
    let mut second = BTreeMap::new();
    for (name, value) in values {
        match value {
            Some(value) => {
                let share = value * fraction;
                first.insert(name.clone(), Some(share));
                second.insert(name.clone(), Some(value - share));
            }
            None => {
                first.insert(name.clone(), None);
                second.insert(name.clone(), None);
            }
        }
    }
    Ok((first, second))
}
