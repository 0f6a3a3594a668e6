//! Calendar math on whole days
//!
//! Every date in this crate is a [`NaiveDate`], i.e. a plain Gregorian calendar day that is never shifted by a local timezone.
//! When a "current day" is needed, it is the UTC one (see [`today`]).
//!
//! Months are 0-indexed (January is `0`) throughout this module.

use std::convert::TryFrom;
use std::fmt::{Display, Formatter};

use chrono::{Datelike, NaiveDate, Utc};

/// Whether `year` has a February 29th
pub fn is_leap_year(year: i32) -> bool {
    is_leap(i64::from(year))
}

fn is_leap(year: i64) -> bool {
    (year % 4 == 0 && year % 100 != 0) || (year % 400 == 0)
}

/// Number of days of a (0-indexed) month.
///
/// Months outside of `0..12` carry into the neighbouring years, so `days_in_month(2024, 13)` is the length of February 2025.
pub fn days_in_month(year: i32, month: i32) -> u32 {
    let year = i64::from(year) + i64::from(month.div_euclid(12));
    match month.rem_euclid(12) {
        0 | 2 | 4 | 6 | 7 | 9 | 11 => 31,
        3 | 5 | 8 | 10 => 30,
        _ => {
            if is_leap(year) {
                29
            } else {
                28
            }
        }
    }
}

/// Weekday of the first day of a (0-indexed) month, with 0 for Sunday.
///
/// Returns `None` for months that cannot be represented.
pub fn first_weekday_of_month(year: i32, month: i32) -> Option<u32> {
    YearMonth::new(year, month).map(|ym| ym.first_weekday())
}

/// Add `delta` months to `date`.
///
/// The day of month is kept when it exists in the target month, and clamped to the last day of that month otherwise
/// (Jan 31st + 1 month is Feb 28th or 29th).
pub fn step_month(date: NaiveDate, delta: i32) -> Option<NaiveDate> {
    YearMonth::of(date)
        .offset(i64::from(delta))
        .map(|target| target.clamped_day(date.day()))
}

/// Add `delta` years to `date`, clamping Feb 29th to Feb 28th in non-leap years
pub fn step_year(date: NaiveDate, delta: i32) -> Option<NaiveDate> {
    YearMonth::of(date)
        .offset(i64::from(delta) * 12)
        .map(|target| target.clamped_day(date.day()))
}

/// The current UTC calendar day
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}


/// A month of a given year
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    first: NaiveDate,
    last: NaiveDate,
}

impl YearMonth {
    /// Build a (0-indexed) month. Months outside of `0..12` carry into the neighbouring years.
    ///
    /// Returns `None` when the month is out of the range of representable dates.
    pub fn new(year: i32, month: i32) -> Option<Self> {
        let normalized_year = year.checked_add(month.div_euclid(12))?;
        let month0 = month.rem_euclid(12) as u32;

        let first = NaiveDate::from_ymd_opt(normalized_year, month0 + 1, 1)?;
        let last = NaiveDate::from_ymd_opt(normalized_year, month0 + 1, days_in_month(normalized_year, month0 as i32))?;
        Some(Self { first, last })
    }

    /// The month `date` belongs to
    pub fn of(date: NaiveDate) -> Self {
        let first = date.with_day(1).unwrap_or(date);
        let n_days = days_in_month(date.year(), date.month0() as i32);
        let last = date.with_day(n_days).unwrap_or(date);
        Self { first, last }
    }

    pub fn year(&self) -> i32 {
        self.first.year()
    }

    /// 0-indexed month
    pub fn month0(&self) -> u32 {
        self.first.month0()
    }

    pub fn first_day(&self) -> NaiveDate {
        self.first
    }

    pub fn last_day(&self) -> NaiveDate {
        self.last
    }

    pub fn n_days(&self) -> u32 {
        self.last.day()
    }

    /// Weekday of the first day, with 0 for Sunday
    pub fn first_weekday(&self) -> u32 {
        self.first.weekday().num_days_from_sunday()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.first <= date && date <= self.last
    }

    /// Every day of this month, in order
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let last = self.last;
        self.first.iter_days().take_while(move |d| *d <= last)
    }

    /// The given day of this month, or its last day if this month is too short
    pub fn clamped_day(&self, day: u32) -> NaiveDate {
        let day = day.max(1).min(self.n_days());
        self.first.with_day(day).unwrap_or(self.last)
    }

    /// The month that is `delta` months away from this one
    pub fn offset(&self, delta: i64) -> Option<Self> {
        let total = i64::from(self.year()) * 12 + i64::from(self.month0()) + delta;
        let year = i32::try_from(total.div_euclid(12)).ok()?;
        let month0 = total.rem_euclid(12) as i32;
        Self::new(year, month0)
    }

    pub fn next(&self) -> Option<Self> {
        self.offset(1)
    }

    pub fn prev(&self) -> Option<Self> {
        self.offset(-1)
    }
}

impl Display for YearMonth {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month0() + 1)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_days_in_month() {
        assert_eq!(days_in_month(2024, 1), 29);
        assert_eq!(days_in_month(2023, 1), 28);
        assert_eq!(days_in_month(1900, 1), 28);
        assert_eq!(days_in_month(2000, 1), 29);
        assert_eq!(days_in_month(2025, 0), 31);
        assert_eq!(days_in_month(2025, 3), 30);
        assert_eq!(days_in_month(2025, 11), 31);
        // carries
        assert_eq!(days_in_month(2023, 13), 29);
        assert_eq!(days_in_month(2025, -1), 31);
        // carries past the range of `i32` years
        assert_eq!(days_in_month(i32::MAX, 12), 31);
        assert_eq!(days_in_month(i32::MAX, 13), 29);
        assert_eq!(days_in_month(i32::MIN, -1), 31);
        assert_eq!(days_in_month(i32::MIN, i32::MIN), 31);
    }

    #[test]
    fn test_days_in_month_matches_chrono() {
        for year in 1896..2105 {
            for month in 0..12 {
                let ym = YearMonth::new(year, month).unwrap();
                let next_first = ym.next().unwrap().first_day();
                let expected = next_first.pred_opt().unwrap().day();
                assert_eq!(days_in_month(year, month), expected, "{}", ym);
            }
        }
    }

    #[test]
    fn test_first_weekday() {
        // 2025-01-01 is a Wednesday
        assert_eq!(first_weekday_of_month(2025, 0), Some(3));
        // 2025-02-01 is a Saturday
        assert_eq!(first_weekday_of_month(2025, 1), Some(6));
        // 2024-09-01 is a Sunday
        assert_eq!(first_weekday_of_month(2024, 8), Some(0));
        assert_eq!(first_weekday_of_month(i32::MAX, 0), None);
    }

    #[test]
    fn test_step_month() {
        assert_eq!(step_month(date(2025, 1, 15), 1), Some(date(2025, 2, 15)));
        assert_eq!(step_month(date(2025, 12, 15), 1), Some(date(2026, 1, 15)));
        assert_eq!(step_month(date(2025, 1, 15), -1), Some(date(2024, 12, 15)));
        assert_eq!(step_month(date(2025, 1, 15), 25), Some(date(2027, 2, 15)));

        // clamping
        assert_eq!(step_month(date(2025, 1, 31), 1), Some(date(2025, 2, 28)));
        assert_eq!(step_month(date(2024, 1, 31), 1), Some(date(2024, 2, 29)));
        assert_eq!(step_month(date(2025, 3, 31), 1), Some(date(2025, 4, 30)));
    }

    #[test]
    fn test_step_month_is_reversible_unless_clamped() {
        let d = date(2025, 5, 17);
        for delta in -30..30 {
            assert_eq!(step_month(step_month(d, delta).unwrap(), -delta), Some(d));
        }

        // Jan 31 -> Feb 28 -> Mar 28: the original day is lost by the clamp
        let clamped = step_month(date(2025, 1, 31), 1).unwrap();
        assert_eq!(clamped, date(2025, 2, 28));
        assert_eq!(step_month(clamped, 1), Some(date(2025, 3, 28)));
        assert_eq!(step_month(clamped, -1), Some(date(2025, 1, 28)));
    }

    #[test]
    fn test_step_year() {
        assert_eq!(step_year(date(2025, 6, 1), 1), Some(date(2026, 6, 1)));
        assert_eq!(step_year(date(2025, 6, 1), -3), Some(date(2022, 6, 1)));
        assert_eq!(step_year(date(2024, 2, 29), 1), Some(date(2025, 2, 28)));
        assert_eq!(step_year(date(2024, 2, 29), 4), Some(date(2028, 2, 29)));
        // Clamped, so going back does not restore Feb 29th
        assert_eq!(step_year(date(2025, 2, 28), -1), Some(date(2024, 2, 28)));
    }

    #[test]
    fn test_year_month() {
        let ym = YearMonth::new(2025, 1).unwrap();
        assert_eq!(ym.year(), 2025);
        assert_eq!(ym.month0(), 1);
        assert_eq!(ym.first_day(), date(2025, 2, 1));
        assert_eq!(ym.last_day(), date(2025, 2, 28));
        assert_eq!(ym.days().count(), 28);
        assert_eq!(ym.to_string(), "2025-02");
        assert_eq!(YearMonth::of(date(2025, 2, 14)), ym);
        assert!(ym.contains(date(2025, 2, 28)));
        assert!(!ym.contains(date(2025, 3, 1)));

        assert_eq!(YearMonth::new(2025, 12), YearMonth::new(2026, 0));
        assert_eq!(ym.prev(), YearMonth::new(2025, 0));
        assert_eq!(YearMonth::new(2025, 0).unwrap().prev(), YearMonth::new(2024, 11));
        assert!(YearMonth::new(2025, 0) < YearMonth::new(2025, 1));
        assert_eq!(ym.clamped_day(31), date(2025, 2, 28));
    }
}
