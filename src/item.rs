//! Planner items (events and tasks)
//!
//! Events and tasks share the same shape: a single canonical start date, an optional recurrence rule and a completion state.
//! This shared part is an [`ItemBase`]; [`Item`] tells them apart.

use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;

use crate::event::Event;
use crate::recurrence::Recurrence;
use crate::task::Task;


#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Item {
    Event(Event),
    Task(Task),
}

/// Returns `task.$property_name` or `event.$property_name`, depending on whether self is a Task or an Event
macro_rules! synthetise_common_getter {
    ($property_name:ident, $return_type:ty) => {
        pub fn $property_name(&self) -> $return_type {
            match self {
                Item::Event(e) => e.$property_name(),
                Item::Task(t) => t.$property_name(),
            }
        }
    }
}

impl Item {
    synthetise_common_getter!(base, &ItemBase);
    synthetise_common_getter!(id, &ItemId);
    synthetise_common_getter!(name, &str);

    pub fn base_mut(&mut self) -> &mut ItemBase {
        match self {
            Item::Event(e) => e.base_mut(),
            Item::Task(t) => t.base_mut(),
        }
    }

    pub fn kind(&self) -> ItemKind {
        match self {
            Item::Event(_) => ItemKind::Event,
            Item::Task(_) => ItemKind::Task,
        }
    }

    pub fn is_event(&self) -> bool {
        self.kind() == ItemKind::Event
    }

    pub fn is_task(&self) -> bool {
        self.kind() == ItemKind::Task
    }

    /// Returns the inner Task, if this item is a task
    pub fn as_task(&self) -> Option<&Task> {
        match self {
            Item::Task(t) => Some(t),
            _ => None,
        }
    }

    /// Returns the inner Event, if this item is an event
    pub fn as_event(&self) -> Option<&Event> {
        match self {
            Item::Event(e) => Some(e),
            _ => None,
        }
    }
}

impl From<Event> for Item {
    fn from(event: Event) -> Self {
        Item::Event(event)
    }
}
impl From<Task> for Item {
    fn from(task: Task) -> Self {
        Item::Task(task)
    }
}


/// Which collection an item belongs to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Event,
    Task,
}

impl Display for ItemKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ItemKind::Event => write!(f, "event"),
            ItemKind::Task => write!(f, "task"),
        }
    }
}


/// An opaque identifier, unique among the items of the same kind and owner.
/// It never changes once the item has been created.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId {
    content: String,
}
impl ItemId {
    /// Generate a random ItemId.
    pub fn random() -> Self {
        let random = uuid::Uuid::new_v4().to_hyphenated().to_string();
        Self { content: random }
    }

    pub fn as_str(&self) -> &str {
        &self.content
    }
}
impl From<String> for ItemId {
    fn from(content: String) -> Self {
        Self { content }
    }
}
impl From<&str> for ItemId {
    fn from(content: &str) -> Self {
        Self { content: content.to_string() }
    }
}
impl FromStr for ItemId {
    type Err = std::convert::Infallible;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}
impl Display for ItemId {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        write!(f, "{}", self.content)
    }
}

/// Used to support serde
impl Serialize for ItemId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.content)
    }
}
/// Used to support serde
impl<'de> Deserialize<'de> for ItemId {
    fn deserialize<D>(deserializer: D) -> Result<ItemId, D::Error>
    where
        D: Deserializer<'de>,
    {
        let content = String::deserialize(deserializer)?;
        Ok(ItemId{ content })
    }
}



/// Fields shared by events and tasks
///
/// Exactly one completion mechanism is meaningful at a time, and `recurrence` selects it:
/// * `is_completed` for non-recurring items
/// * `completed_occurrences_dates` for recurring ones (one date per occurrence marked as done)
///
/// See [`crate::completion`] for the functions that read and update them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemBase {
    id: ItemId,
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    additional_info: String,

    /// A missing or malformed start date is kept as `None`. Such an item has no occurrence at all.
    #[serde(default, deserialize_with = "deserialize_lenient_date")]
    start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    start_time: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lenient_date")]
    end_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    end_time: Option<String>,

    #[serde(default)]
    recurrence: Recurrence,
    #[serde(default)]
    is_completed: bool,
    #[serde(default, deserialize_with = "deserialize_lenient_date_set")]
    completed_occurrences_dates: BTreeSet<NaiveDate>,

    /// Written by the store
    #[serde(default, skip_serializing_if = "Option::is_none")]
    created_at: Option<DateTime<Utc>>,
    /// Written by the store
    #[serde(default, skip_serializing_if = "Option::is_none")]
    updated_at: Option<DateTime<Utc>>,
}

impl ItemBase {
    /// Create a non-recurring, uncompleted item with a random ID
    pub fn new(name: String, start_date: NaiveDate) -> Self {
        Self {
            id: ItemId::random(),
            name,
            description: String::new(),
            additional_info: String::new(),
            start_date: Some(start_date),
            start_time: None,
            end_date: None,
            end_time: None,
            recurrence: Recurrence::None,
            is_completed: false,
            completed_occurrences_dates: BTreeSet::new(),
            created_at: None,
            updated_at: None,
        }
    }

    pub fn id(&self) -> &ItemId                  { &self.id }
    pub fn name(&self) -> &str                   { &self.name }
    pub fn description(&self) -> &str            { &self.description }
    pub fn additional_info(&self) -> &str        { &self.additional_info }
    pub fn start_date(&self) -> Option<NaiveDate> { self.start_date }
    pub fn start_time(&self) -> Option<&str>     { self.start_time.as_deref() }
    pub fn end_date(&self) -> Option<NaiveDate>  { self.end_date }
    pub fn end_time(&self) -> Option<&str>       { self.end_time.as_deref() }
    pub fn recurrence(&self) -> &Recurrence      { &self.recurrence }
    pub fn is_completed(&self) -> bool           { self.is_completed }
    pub fn completed_occurrences_dates(&self) -> &BTreeSet<NaiveDate> { &self.completed_occurrences_dates }
    pub fn created_at(&self) -> Option<&DateTime<Utc>> { self.created_at.as_ref() }
    pub fn updated_at(&self) -> Option<&DateTime<Utc>> { self.updated_at.as_ref() }

    /// The end date, unless it is before the start date.
    /// An inverted range is treated as open-ended.
    pub fn effective_end_date(&self) -> Option<NaiveDate> {
        match (self.start_date, self.end_date) {
            (Some(start), Some(end)) if end < start => {
                log::debug!("Item {} ends ({}) before it starts ({}), ignoring its end date", self.id, end, start);
                None
            },
            (_, end) => end,
        }
    }

    pub fn set_name(&mut self, new_name: String) {
        self.name = new_name;
    }
    pub fn set_description(&mut self, description: String) {
        self.description = description;
    }
    pub fn set_additional_info(&mut self, additional_info: String) {
        self.additional_info = additional_info;
    }
    pub fn set_start_date(&mut self, start_date: Option<NaiveDate>) {
        self.start_date = start_date;
    }
    pub fn set_start_time(&mut self, start_time: Option<String>) {
        self.start_time = start_time;
    }
    pub fn set_end_date(&mut self, end_date: Option<NaiveDate>) {
        self.end_date = end_date;
    }
    pub fn set_end_time(&mut self, end_time: Option<String>) {
        self.end_time = end_time;
    }
    pub fn set_recurrence(&mut self, recurrence: Recurrence) {
        self.recurrence = recurrence;
    }

    pub(crate) fn set_completed(&mut self, completed: bool) {
        self.is_completed = completed;
    }
    pub(crate) fn set_completed_occurrences_dates(&mut self, dates: BTreeSet<NaiveDate>) {
        self.completed_occurrences_dates = dates;
    }
    pub(crate) fn set_created_at(&mut self, timepoint: DateTime<Utc>) {
        self.created_at = Some(timepoint);
    }
    pub(crate) fn set_updated_at(&mut self, timepoint: DateTime<Utc>) {
        self.updated_at = Some(timepoint);
    }
}


/// Parse a boundary date (`YYYY-MM-DD`).
///
/// Full RFC 3339 timestamps are accepted too, and are reduced to their UTC calendar date.
/// Returns `None` (and logs a warning) for anything else.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    match DateTime::parse_from_rfc3339(raw) {
        Ok(dt) => Some(dt.with_timezone(&Utc).date_naive()),
        Err(err) => {
            log::warn!("Ignoring malformed date {:?}: {}", raw, err);
            None
        },
    }
}

fn deserialize_lenient_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Value> = Option::deserialize(deserializer)?;
    Ok(match raw {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => parse_date(&s),
        Some(other) => {
            log::warn!("Ignoring date {} that is not a string", other);
            None
        },
    })
}

fn deserialize_lenient_date_set<'de, D>(deserializer: D) -> Result<BTreeSet<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Value> = Option::deserialize(deserializer)?;
    let entries = match raw {
        None | Some(Value::Null) => return Ok(BTreeSet::new()),
        Some(Value::Array(entries)) => entries,
        Some(other) => {
            log::warn!("Ignoring completed dates {} that are not a list", other);
            return Ok(BTreeSet::new());
        },
    };

    Ok(entries.iter()
        .filter_map(|entry| match entry {
            Value::String(s) => parse_date(s),
            other => {
                log::warn!("Ignoring completed date {} that is not a string", other);
                None
            },
        })
        .collect()
    )
}
