///! Some utility functions

pub mod comparison;

use chrono::Datelike;

use crate::occurrence::Occurrence;
use crate::view::{DayCell, DayDetail, MonthGrid};

/// A debug utility that pretty-prints a month grid.
/// Days with events are marked with `*`, days with tasks with `+`, and today starts with `[`.
pub fn print_month_grid(grid: &MonthGrid) {
    println!("{}", grid.month());
    println!(" Sun  Mon  Tue  Wed  Thu  Fri  Sat");
    for week in grid.weeks() {
        let line: Vec<String> = week.iter().map(format_cell).collect();
        println!("{}", line.join(""));
    }
}

/// Five characters per cell, whatever its markers
fn format_cell(cell: &DayCell) -> String {
    match cell.date() {
        None => "     ".to_string(),
        Some(date) => {
            let today = if cell.is_today() { "[" } else { " " };
            let event = if cell.has_events() { "*" } else { " " };
            let task = if cell.has_tasks() { "+" } else { " " };
            format!("{}{:2}{}{}", today, date.day(), event, task)
        },
    }
}

/// A debug utility that pretty-prints the content of a day
pub fn print_day_detail(detail: &DayDetail) {
    println!("---- {} ----", detail.date());
    println!("Events:");
    for occ in detail.events() {
        print_occurrence(occ);
    }
    println!("Tasks:");
    for occ in detail.tasks() {
        print_occurrence(occ);
    }
}

pub fn print_occurrence(occ: &Occurrence) {
    let completion = if occ.is_completed() { "✓" } else { " " };
    let recurring = if occ.is_occurrence() { "↻" } else { " " };
    let time = occ.start_time().unwrap_or("--:--");
    println!("    {}{} {} {}\t{}", completion, recurring, time, occ.name(), occ.original_id());
}


#[cfg(test)]
mod tests {
    use super::*;

    use chrono::NaiveDate;

    use crate::date_grid::YearMonth;
    use crate::view::build_month_grid;
    use crate::{Event, Item, Task};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_format_cell() {
        let events = vec![Item::Event(Event::new("gig".to_string(), date(2025, 3, 7)))];
        let tasks = vec![
            Item::Task(Task::new("laundry".to_string(), date(2025, 3, 7))),
            Item::Task(Task::new("taxes".to_string(), date(2025, 3, 12))),
        ];
        let grid = build_month_grid(YearMonth::new(2025, 2).unwrap(), &events, &tasks, Some(date(2025, 3, 7)));

        let cells: Vec<String> = grid.cells().iter().map(format_cell).collect();
        assert!(cells.iter().all(|c| c.chars().count() == 5));
        // March 2025 starts on a Saturday
        assert_eq!(cells[0], "     ");
        assert_eq!(cells[6], "  1  ");
        assert_eq!(cells[6 + 6], "[ 7*+");
        assert_eq!(cells[6 + 11], " 12 +");
    }
}
