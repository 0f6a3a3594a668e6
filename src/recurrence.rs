//! Expansion of recurrence rules into dated occurrences

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use chrono::{Datelike, Duration, NaiveDate};
use serde_json::Value;

use crate::date_grid::YearMonth;
use crate::item::ItemBase;

/// How a single start date repeats
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Recurrence {
    None,
    Daily,
    /// Every 7 days from the start date
    Weekly,
    /// Same day of month as the start date (or the last day of shorter months)
    Monthly,
    /// Same month and day as the start date (Feb 29th falls on Feb 28th in non-leap years)
    Yearly,
    /// A value this crate does not know about. It is kept as-is so that it survives a round trip through a store,
    /// but such an item never occurs.
    Unrecognized(String),
}

impl Recurrence {
    pub fn is_recurring(&self) -> bool {
        *self != Recurrence::None
    }

    pub fn as_str(&self) -> &str {
        match self {
            Recurrence::None => "none",
            Recurrence::Daily => "daily",
            Recurrence::Weekly => "weekly",
            Recurrence::Monthly => "monthly",
            Recurrence::Yearly => "yearly",
            Recurrence::Unrecognized(raw) => raw,
        }
    }
}

impl Default for Recurrence {
    fn default() -> Self {
        Recurrence::None
    }
}

impl Display for Recurrence {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Recurrence {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "none" => Ok(Recurrence::None),
            "daily" => Ok(Recurrence::Daily),
            "weekly" => Ok(Recurrence::Weekly),
            "monthly" => Ok(Recurrence::Monthly),
            "yearly" => Ok(Recurrence::Yearly),
            _ => Err(format!("unknown recurrence {:?}", s)),
        }
    }
}

/// Used to support serde
impl Serialize for Recurrence {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}
/// Used to support serde
impl<'de> Deserialize<'de> for Recurrence {
    fn deserialize<D>(deserializer: D) -> Result<Recurrence, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = match Option::<Value>::deserialize(deserializer)? {
            None | Some(Value::Null) => return Ok(Recurrence::None),
            Some(Value::String(raw)) => raw,
            Some(other) => {
                log::warn!("Recurrence {} is not a string. Items with this rule will not be displayed", other);
                return Ok(Recurrence::Unrecognized(other.to_string()));
            },
        };
        match raw.parse::<Recurrence>() {
            Ok(rec) => Ok(rec),
            Err(err) => {
                log::warn!("{}. Items with this rule will not be displayed", err);
                Ok(Recurrence::Unrecognized(raw))
            }
        }
    }
}


/// Every date of `month` on which `item` occurs, in ascending order and without duplicates.
///
/// Items without a valid start date (or with an unrecognized rule) never occur.
/// An end date earlier than the start date is ignored, see [`ItemBase::effective_end_date`].
pub fn expand(item: &ItemBase, month: YearMonth) -> Vec<NaiveDate> {
    let start = match item.start_date() {
        Some(start) => start,
        None => {
            log::debug!("Item {} has no valid start date, it has no occurrence", item.id());
            return Vec::new();
        },
    };
    let end = item.effective_end_date();

    let dates = match item.recurrence() {
        Recurrence::None => {
            if month.contains(start) { vec![start] } else { Vec::new() }
        },
        Recurrence::Daily => expand_daily(start, end, month),
        Recurrence::Weekly => expand_weekly(start, end, month),
        Recurrence::Monthly => {
            if month < YearMonth::of(start) {
                Vec::new()
            } else {
                within_end(month.clamped_day(start.day()), end)
            }
        },
        Recurrence::Yearly => {
            if month.month0() != start.month0() || month.year() < start.year() {
                Vec::new()
            } else {
                within_end(month.clamped_day(start.day()), end)
            }
        },
        Recurrence::Unrecognized(raw) => {
            log::debug!("Item {} has an unrecognized recurrence {:?}, it has no occurrence", item.id(), raw);
            Vec::new()
        },
    };

    log::trace!("Item {} occurs {} time(s) in {}", item.id(), dates.len(), month);
    dates
}

/// Whether `item` has an occurrence on `date`
pub fn occurs_on(item: &ItemBase, date: NaiveDate) -> bool {
    expand(item, YearMonth::of(date)).contains(&date)
}

/// The part of `month` that is both after `start` and before `end`
fn bounds(start: NaiveDate, end: Option<NaiveDate>, month: YearMonth) -> Option<(NaiveDate, NaiveDate)> {
    let lo = start.max(month.first_day());
    let hi = match end {
        Some(end) => end.min(month.last_day()),
        None => month.last_day(),
    };
    if lo > hi {
        None
    } else {
        Some((lo, hi))
    }
}

fn expand_daily(start: NaiveDate, end: Option<NaiveDate>, month: YearMonth) -> Vec<NaiveDate> {
    match bounds(start, end, month) {
        None => Vec::new(),
        Some((lo, hi)) => lo.iter_days().take_while(|d| *d <= hi).collect(),
    }
}

fn expand_weekly(start: NaiveDate, end: Option<NaiveDate>, month: YearMonth) -> Vec<NaiveDate> {
    let (lo, hi) = match bounds(start, end, month) {
        None => return Vec::new(),
        Some(b) => b,
    };

    // First multiple of 7 days after `start` that is not before `lo`
    let days_since_start = lo.signed_duration_since(start).num_days();
    let n_weeks = (days_since_start + 6) / 7;
    let mut current = start.checked_add_signed(Duration::days(n_weeks * 7));

    let mut dates = Vec::new();
    while let Some(date) = current {
        if date > hi {
            break;
        }
        dates.push(date);
        current = date.checked_add_signed(Duration::days(7));
    }
    dates
}

fn within_end(date: NaiveDate, end: Option<NaiveDate>) -> Vec<NaiveDate> {
    match end {
        Some(end) if date > end => Vec::new(),
        _ => vec![date],
    }
}
