//! To-do tasks

use serde::{Deserialize, Serialize};
use chrono::NaiveDate;

use crate::item::{ItemBase, ItemId};

/// A to-do task
///
/// Apart from its category, a task is scheduled and completed exactly like an [`Event`](crate::Event).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Task {
    #[serde(flatten)]
    base: ItemBase,

    /// Free-form category
    #[serde(rename = "type", default = "crate::config::default_task_type")]
    task_type: String,
}

impl Task {
    /// Create a brand new Task that is not in a store yet.
    /// This will pick a new (random) ID, and the default category (see [`crate::config::DEFAULT_TASK_TYPE`]).
    pub fn new(name: String, start_date: NaiveDate) -> Self {
        Self {
            base: ItemBase::new(name, start_date),
            task_type: crate::config::default_task_type(),
        }
    }

    pub fn base(&self) -> &ItemBase { &self.base }
    pub fn base_mut(&mut self) -> &mut ItemBase { &mut self.base }

    pub fn id(&self) -> &ItemId     { self.base.id() }
    pub fn name(&self) -> &str      { self.base.name() }
    pub fn task_type(&self) -> &str { &self.task_type }

    pub fn set_task_type(&mut self, task_type: String) {
        self.task_type = task_type;
    }
}
