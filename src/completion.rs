//! Completion state of items and of their individual occurrences
//!
//! A non-recurring item is either done or not. A recurring item is done on a per-occurrence basis:
//! it keeps the set of dates whose occurrence has been marked as done.
//!
//! The functions in this module never write anything: they compute the new persisted fields
//! (a [`CompletionUpdate`]), and writing them is the job of a [`PlannerStore`](crate::traits::PlannerStore).

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use chrono::NaiveDate;

use crate::error::PlannerError;
use crate::item::{Item, ItemBase};
use crate::recurrence::occurs_on;

/// The completion mechanism that is relevant for an item, as selected by its recurrence rule
#[derive(Clone, Debug, PartialEq)]
pub enum Completion<'a> {
    Single(bool),
    PerOccurrence(&'a BTreeSet<NaiveDate>),
}

impl<'a> Completion<'a> {
    pub fn of(item: &'a ItemBase) -> Self {
        if item.recurrence().is_recurring() {
            Completion::PerOccurrence(item.completed_occurrences_dates())
        } else {
            Completion::Single(item.is_completed())
        }
    }
}

/// New values for the completion fields of an item.
///
/// Serialized, this is the partial record that must be written over the stored one,
/// e.g. `{"isCompleted":true}` or `{"completedOccurrencesDates":["2025-03-02"]}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CompletionUpdate {
    #[serde(rename_all = "camelCase")]
    Single { is_completed: bool },
    #[serde(rename_all = "camelCase")]
    PerOccurrence { completed_occurrences_dates: BTreeSet<NaiveDate> },
}

impl CompletionUpdate {
    /// Overwrite the completion fields of `item` with this update
    pub fn apply_to(&self, item: &mut ItemBase) {
        match self {
            CompletionUpdate::Single { is_completed } => item.set_completed(*is_completed),
            CompletionUpdate::PerOccurrence { completed_occurrences_dates } => {
                item.set_completed_occurrences_dates(completed_occurrences_dates.clone())
            },
        }
    }
}


/// Whether the occurrence of `item` on `date` is done.
///
/// `date` is ignored for non-recurring items.
pub fn is_done(item: &ItemBase, date: NaiveDate) -> bool {
    match Completion::of(item) {
        Completion::Single(completed) => completed,
        Completion::PerOccurrence(dates) => dates.contains(&date),
    }
}

/// The completion fields that mark the occurrence of `item` on `date` as done.
///
/// This is idempotent: marking an occurrence that is already done returns the current state.
/// Recurring items can only be marked done on one of their occurrences, otherwise [`PlannerError::NotAnOccurrence`] is returned.
pub fn mark_done(item: &Item, date: NaiveDate) -> Result<CompletionUpdate, PlannerError> {
    let base = item.base();
    match Completion::of(base) {
        Completion::Single(_) => Ok(CompletionUpdate::Single { is_completed: true }),
        Completion::PerOccurrence(dates) => {
            if occurs_on(base, date) == false {
                return Err(PlannerError::NotAnOccurrence { kind: item.kind(), id: item.id().clone(), date });
            }
            let mut dates = dates.clone();
            dates.insert(date);
            Ok(CompletionUpdate::PerOccurrence { completed_occurrences_dates: dates })
        },
    }
}

/// The completion fields that mark the occurrence of `item` on `date` as not done. This is idempotent.
pub fn mark_undone(item: &ItemBase, date: NaiveDate) -> CompletionUpdate {
    match Completion::of(item) {
        Completion::Single(_) => CompletionUpdate::Single { is_completed: false },
        Completion::PerOccurrence(dates) => {
            let mut dates = dates.clone();
            dates.remove(&date);
            CompletionUpdate::PerOccurrence { completed_occurrences_dates: dates }
        },
    }
}

/// The completed dates of `item` that are still occurrences of it.
///
/// Editing the start date, end date or recurrence rule of an item may turn some completed dates into dates the item no longer occurs on.
/// These must be dropped, otherwise they would silently come back if the item is edited again.
pub fn reconcile(item: &ItemBase) -> BTreeSet<NaiveDate> {
    let (kept, dropped): (BTreeSet<NaiveDate>, BTreeSet<NaiveDate>) = item.completed_occurrences_dates()
        .iter()
        .copied()
        .partition(|date| occurs_on(item, *date));

    if dropped.is_empty() == false {
        log::info!("Dropping {} completed date(s) of item {} that are no longer occurrences", dropped.len(), item.id());
    }
    kept
}
