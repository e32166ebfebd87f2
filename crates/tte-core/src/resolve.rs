//! Per-subject event resolution.
//!
//! Single mode picks at most one winning (date, code) pair. On exact date
//! ties the primary outcome outranks every competing risk, and among tied
//! competing risks the one listed first in the configuration wins; codes are
//! assigned in listing order, so the tie-break is simply the lowest code.
//! Recurring mode keeps every distinct occurrence date, all coded 1.

use std::cmp::Ordering;

use tte_model::EventMode;

use crate::subjects::{Candidate, SubjectEvents};

/// Occurrences to integrate for one subject, in date order.
pub fn resolve(mode: EventMode, events: Option<&SubjectEvents>) -> Vec<Candidate> {
    let Some(events) = events else {
        return Vec::new();
    };
    match mode {
        EventMode::Single => resolve_single(&events.candidates).into_iter().collect(),
        EventMode::Recurring => resolve_recurring(&events.candidates),
    }
}

fn resolve_single(candidates: &[Candidate]) -> Option<Candidate> {
    let mut winner: Option<Candidate> = None;
    for candidate in candidates {
        let replace = match winner {
            None => true,
            Some(current) => {
                candidate.date < current.date
                    || (candidate.date == current.date && candidate.code < current.code)
            }
        };
        if replace {
            winner = Some(*candidate);
        }
    }
    winner
}

fn resolve_recurring(candidates: &[Candidate]) -> Vec<Candidate> {
    let mut dates: Vec<f64> = candidates.iter().map(|candidate| candidate.date).collect();
    dates.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    dates.dedup();
    dates
        .into_iter()
        .map(|date| Candidate { date, code: 1 })
        .collect()
}
