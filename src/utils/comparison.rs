//! Utilities to compare custom types
//!
//! These can be used to sort results, e.g. with `sort_by`

use std::cmp::Ordering;

use crate::occurrence::Occurrence;

/// Order occurrences by date, then by start time (untimed ones first)
pub fn compare_occurrences(left: &Occurrence, right: &Occurrence) -> Ordering {
    left.date().cmp(&right.date())
        .then_with(|| left.sort_time().cmp(right.sort_time()))
}

