//! This module ties a store and the calendar computations together

use chrono::NaiveDate;

use crate::completion;
use crate::date_grid::YearMonth;
use crate::error::PlannerError;
use crate::item::{Item, ItemId, ItemKind};
use crate::traits::{PlannerStore, Snapshot};
use crate::view::{build_day_detail, build_month_grid, overdue_tasks, DayDetail, MonthGrid};

/// What a completion request actually did
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MarkOutcome {
    /// The store has been updated
    Changed,
    /// The occurrence was already in the requested state. Nothing has been written.
    Unchanged,
}


/// Answers calendar queries from the current content of a store, and forwards completion changes to it.
///
/// Nothing is cached here: every query starts from the latest collections published by the store.
pub struct Planner<S>
where
    S: PlannerStore,
{
    store: S,
}

impl<S> Planner<S>
where
    S: PlannerStore,
{
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S { &self.store }
    pub fn store_mut(&mut self) -> &mut S { &mut self.store }

    /// A consistent view of the current events and tasks
    pub fn view(&self) -> PlannerView {
        PlannerView {
            events: self.store.get_events(),
            tasks: self.store.get_tasks(),
        }
    }

    pub fn month_grid(&self, month: YearMonth, today: Option<NaiveDate>) -> MonthGrid {
        self.view().month_grid(month, today)
    }

    /// Mark the occurrence of an item on `date` as done, and write it to the store
    pub async fn mark_occurrence_done(&mut self, kind: ItemKind, id: &ItemId, date: NaiveDate) -> Result<MarkOutcome, PlannerError> {
        let snapshot = self.store.snapshot(kind);
        let item = find(&snapshot, kind, id)?;

        if completion::is_done(item.base(), date) {
            log::debug!("{} {} is already done on {}", kind, id, date);
            return Ok(MarkOutcome::Unchanged);
        }
        let update = completion::mark_done(item, date)?;

        self.store.update_completion(kind, id, update).await?;
        Ok(MarkOutcome::Changed)
    }

    /// Mark the occurrence of an item on `date` as not done, and write it to the store
    pub async fn mark_occurrence_undone(&mut self, kind: ItemKind, id: &ItemId, date: NaiveDate) -> Result<MarkOutcome, PlannerError> {
        let snapshot = self.store.snapshot(kind);
        let item = find(&snapshot, kind, id)?;

        if completion::is_done(item.base(), date) == false {
            log::debug!("{} {} is already not done on {}", kind, id, date);
            return Ok(MarkOutcome::Unchanged);
        }
        let update = completion::mark_undone(item.base(), date);

        self.store.update_completion(kind, id, update).await?;
        Ok(MarkOutcome::Changed)
    }
}

fn find<'a>(snapshot: &'a Snapshot, kind: ItemKind, id: &ItemId) -> Result<&'a Item, PlannerError> {
    snapshot.iter()
        .find(|item| item.id() == id)
        .ok_or_else(|| PlannerError::NotFound { kind, id: id.clone() })
}


/// The events and tasks of a store at a given time.
///
/// This does not follow later changes of the store. Get a new view to see them.
#[derive(Clone, Debug)]
pub struct PlannerView {
    events: Snapshot,
    tasks: Snapshot,
}

impl PlannerView {
    pub fn new(events: Snapshot, tasks: Snapshot) -> Self {
        Self { events, tasks }
    }

    pub fn events(&self) -> &[Item] { &self.events }
    pub fn tasks(&self) -> &[Item]  { &self.tasks }

    pub fn month_grid(&self, month: YearMonth, today: Option<NaiveDate>) -> MonthGrid {
        build_month_grid(month, &self.events, &self.tasks, today)
    }

    pub fn day_detail(&self, date: NaiveDate) -> DayDetail<'_> {
        build_day_detail(date, &self.events, &self.tasks)
    }

    pub fn overdue_tasks(&self, today: NaiveDate) -> Vec<&Item> {
        overdue_tasks(&self.tasks, today)
    }
}
