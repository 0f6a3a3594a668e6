//! Data needed to render a month grid and the detail of a day
//!
//! Nothing here is stored: everything is recomputed from the current item collections on each call.

use std::collections::HashSet;

use bitflags::bitflags;
use chrono::NaiveDate;

use crate::date_grid::YearMonth;
use crate::item::Item;
use crate::occurrence::{project, project_day, Occurrence};

bitflags! {
    /// What a day of the grid contains
    pub struct DayMarkers: u8 {
        /// At least one event occurs on this day
        const EVENTS = 1;
        /// At least one task occurs on this day
        const TASKS = 2;
    }
}

/// A cell of a month grid
#[derive(Clone, Debug, PartialEq)]
pub struct DayCell {
    /// `None` for the blank cells that pad the first week
    date: Option<NaiveDate>,
    markers: DayMarkers,
    is_today: bool,
}

impl DayCell {
    fn blank() -> Self {
        Self { date: None, markers: DayMarkers::empty(), is_today: false }
    }

    pub fn date(&self) -> Option<NaiveDate> { self.date }
    pub fn is_blank(&self) -> bool         { self.date.is_none() }
    pub fn markers(&self) -> DayMarkers    { self.markers }
    pub fn has_events(&self) -> bool       { self.markers.contains(DayMarkers::EVENTS) }
    pub fn has_tasks(&self) -> bool        { self.markers.contains(DayMarkers::TASKS) }
    pub fn is_today(&self) -> bool         { self.is_today }
}

/// The cells of a month, row by row, with weeks starting on Sunday
#[derive(Clone, Debug, PartialEq)]
pub struct MonthGrid {
    month: YearMonth,
    cells: Vec<DayCell>,
}

impl MonthGrid {
    pub fn month(&self) -> YearMonth {
        self.month
    }

    /// Leading blank cells, then one cell per day of the month
    pub fn cells(&self) -> &[DayCell] {
        &self.cells
    }

    /// The cells, seven at a time. The last week may be shorter.
    pub fn weeks(&self) -> std::slice::Chunks<'_, DayCell> {
        self.cells.chunks(7)
    }

    pub fn cell(&self, date: NaiveDate) -> Option<&DayCell> {
        self.cells.iter().find(|c| c.date == Some(date))
    }
}

/// Build the grid of `month`.
///
/// The grid starts with as many blank cells as the weekday of the first day (0 for Sunday).
/// `today`, if any, is flagged in the grid.
pub fn build_month_grid(month: YearMonth, events: &[Item], tasks: &[Item], today: Option<NaiveDate>) -> MonthGrid {
    let event_days: HashSet<NaiveDate> = project(events, month).iter().map(|o| o.date()).collect();
    let task_days: HashSet<NaiveDate> = project(tasks, month).iter().map(|o| o.date()).collect();

    let n_blanks = month.first_weekday() as usize;
    let mut cells = Vec::with_capacity(n_blanks + month.n_days() as usize);
    cells.extend(std::iter::repeat_with(DayCell::blank).take(n_blanks));

    for date in month.days() {
        let mut markers = DayMarkers::empty();
        markers.set(DayMarkers::EVENTS, event_days.contains(&date));
        markers.set(DayMarkers::TASKS, task_days.contains(&date));
        cells.push(DayCell {
            date: Some(date),
            markers,
            is_today: today == Some(date),
        });
    }

    MonthGrid { month, cells }
}


/// Everything that happens on one day
#[derive(Clone, Debug)]
pub struct DayDetail<'a> {
    date: NaiveDate,
    events: Vec<Occurrence<'a>>,
    tasks: Vec<Occurrence<'a>>,
}

impl<'a> DayDetail<'a> {
    pub fn date(&self) -> NaiveDate { self.date }
    /// Ordered by start time, untimed events first
    pub fn events(&self) -> &[Occurrence<'a>] { &self.events }
    /// Ordered by start time, untimed tasks first
    pub fn tasks(&self) -> &[Occurrence<'a>] { &self.tasks }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty() && self.tasks.is_empty()
    }
}

/// The event and task occurrences of a single day
pub fn build_day_detail<'a>(date: NaiveDate, events: &'a [Item], tasks: &'a [Item]) -> DayDetail<'a> {
    DayDetail {
        date,
        events: project_day(events, date),
        tasks: project_day(tasks, date),
    }
}


/// Non-recurring tasks that are not done and whose due date is before `today`.
///
/// The due date is the end date if there is a valid one, the start date otherwise. Results are ordered by due date.
pub fn overdue_tasks<'a>(tasks: &'a [Item], today: NaiveDate) -> Vec<&'a Item> {
    let mut overdue: Vec<(NaiveDate, &Item)> = tasks.iter()
        .filter(|task| {
            let base = task.base();
            base.recurrence().is_recurring() == false && base.is_completed() == false
        })
        .filter_map(|task| {
            let base = task.base();
            base.effective_end_date()
                .or_else(|| base.start_date())
                .map(|due| (due, task))
        })
        .filter(|(due, _)| *due < today)
        .collect();

    overdue.sort_by_key(|(due, _)| *due);
    overdue.into_iter().map(|(_, task)| task).collect()
}
