//! Projection of items onto the calendar days of a month

use std::collections::BTreeMap;

use serde::Serialize;
use chrono::NaiveDate;

use crate::completion::is_done;
use crate::config::DEFAULT_SORT_TIME;
use crate::date_grid::YearMonth;
use crate::item::{Item, ItemId, ItemKind};
use crate::recurrence::expand;
use crate::utils::comparison::compare_occurrences;

/// One item, on one concrete day.
///
/// Serialized, the item it comes from is nested under `item`.
/// This only borrows the item it comes from, so that it cannot outlive the collection it was projected from.
/// Occurrences must be projected again whenever this collection changes.
#[derive(Clone, Copy, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Occurrence<'a> {
    original_id: &'a ItemId,
    item: &'a Item,
    date: NaiveDate,
    /// Whether this comes from the expansion of a recurrence rule
    is_occurrence: bool,
    is_completed: bool,
}

impl<'a> Occurrence<'a> {
    pub fn new(item: &'a Item, date: NaiveDate) -> Self {
        let base = item.base();
        Self {
            original_id: base.id(),
            item,
            date,
            is_occurrence: base.recurrence().is_recurring(),
            is_completed: is_done(base, date),
        }
    }

    pub fn item(&self) -> &'a Item         { self.item }
    pub fn original_id(&self) -> &'a ItemId { self.original_id }
    pub fn kind(&self) -> ItemKind         { self.item.kind() }
    pub fn name(&self) -> &'a str          { self.item.name() }
    pub fn date(&self) -> NaiveDate        { self.date }
    pub fn is_occurrence(&self) -> bool    { self.is_occurrence }
    pub fn is_completed(&self) -> bool     { self.is_completed }
    pub fn start_time(&self) -> Option<&'a str> { self.item.base().start_time() }

    /// The start time, or midnight for untimed items
    pub fn sort_time(&self) -> &'a str {
        self.start_time().unwrap_or(DEFAULT_SORT_TIME)
    }
}


/// Every occurrence of `items` in `month`, ordered by date then by start time.
///
/// The sort is stable: occurrences with the same date and start time keep the order of `items`.
pub fn project<'a, I>(items: I, month: YearMonth) -> Vec<Occurrence<'a>>
where
    I: IntoIterator<Item = &'a Item>,
{
    let mut occurrences: Vec<Occurrence<'a>> = items.into_iter()
        .flat_map(|item| {
            expand(item.base(), month)
                .into_iter()
                .map(move |date| Occurrence::new(item, date))
        })
        .collect();

    occurrences.sort_by(compare_occurrences);
    log::debug!("Projected {} occurrence(s) onto {}", occurrences.len(), month);
    occurrences
}

/// The occurrences of `items` on a single day, ordered by start time
pub fn project_day<'a, I>(items: I, date: NaiveDate) -> Vec<Occurrence<'a>>
where
    I: IntoIterator<Item = &'a Item>,
{
    project(items, YearMonth::of(date))
        .into_iter()
        .filter(|occ| occ.date() == date)
        .collect()
}

/// Group occurrences by day. Each group keeps the order of `occurrences`.
pub fn index_by_date<'a>(occurrences: Vec<Occurrence<'a>>) -> BTreeMap<NaiveDate, Vec<Occurrence<'a>>> {
    let mut index: BTreeMap<NaiveDate, Vec<Occurrence<'a>>> = BTreeMap::new();
    for occ in occurrences {
        index.entry(occ.date()).or_default().push(occ);
    }
    index
}
