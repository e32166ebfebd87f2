//! Elapsed-time output in the requested unit.

use tte_model::TimeUnit;

use crate::split::OutputRow;

/// Attach elapsed time from the subject's entry to each event-coded row.
///
/// Censored rows keep a missing value; elapsed time is only defined for
/// rows that record an occurrence.
pub fn attach_elapsed_time(rows: &mut [OutputRow], entry: f64, unit: TimeUnit) {
    for row in rows {
        row.elapsed = match row.event_date {
            Some(date) if row.outcome > 0 => Some((date - entry) / unit.divisor()),
            _ => None,
        };
    }
}
