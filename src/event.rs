//! Calendar events

use serde::{Deserialize, Serialize};
use chrono::NaiveDate;

use crate::item::{ItemBase, ItemId};

/// A calendar event
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Event {
    #[serde(flatten)]
    base: ItemBase,
}

impl Event {
    /// Create a brand new Event that is not in a store yet.
    /// This will pick a new (random) ID.
    pub fn new(name: String, start_date: NaiveDate) -> Self {
        Self { base: ItemBase::new(name, start_date) }
    }

    pub fn base(&self) -> &ItemBase { &self.base }
    pub fn base_mut(&mut self) -> &mut ItemBase { &mut self.base }

    pub fn id(&self) -> &ItemId { self.base.id() }
    pub fn name(&self) -> &str  { self.base.name() }
}
