//! Prints the month grid (and optionally the detail of a day) of a local planner cache
//!
//! Usage: `planner-month [<cache folder> [<owner> [<YYYY-MM> [<YYYY-MM-DD>]]]]`

use std::path::PathBuf;

use month_planner::cache::Cache;
use month_planner::date_grid::{today, YearMonth};
use month_planner::item::parse_date;
use month_planner::utils::{print_day_detail, print_month_grid};
use month_planner::Planner;

const DEFAULT_OWNER: &str = "default";

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let folder = args.get(0).map(PathBuf::from).unwrap_or_else(Cache::default_cache_folder);
    let owner = args.get(1).map(String::as_str).unwrap_or(DEFAULT_OWNER);
    let today = today();

    let month = match args.get(2) {
        None => YearMonth::of(today),
        Some(raw) => match parse_date(&format!("{}-01", raw)) {
            Some(first) => YearMonth::of(first),
            None => {
                log::error!("Invalid month {:?}, expected YYYY-MM", raw);
                std::process::exit(1);
            },
        },
    };
    let day = args.get(3).and_then(|raw| parse_date(raw));

    let cache = match Cache::from_folder(&folder, owner) {
        Ok(cache) => cache,
        Err(err) => {
            log::warn!("Invalid cache file: {}. Using an empty cache", err);
            Cache::new(&folder, owner)
        }
    };
    let planner = Planner::new(cache);
    let view = planner.view();

    print_month_grid(&view.month_grid(month, Some(today)));

    if let Some(day) = day {
        println!();
        print_day_detail(&view.day_detail(day));
    }

    let overdue = view.overdue_tasks(today);
    if overdue.is_empty() == false {
        println!();
        println!("Overdue tasks:");
        for task in overdue {
            println!("    {}\t{}", task.name(), task.id());
        }
    }
}
