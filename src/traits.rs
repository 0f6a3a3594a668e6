//! Boundary between this crate and the store that persists items

use std::sync::Arc;

use async_trait::async_trait;

use crate::completion::CompletionUpdate;
use crate::error::PlannerError;
use crate::item::{Item, ItemId, ItemKind};

/// The complete collection of items of one kind, as last published by a store
pub type Snapshot = Arc<Vec<Item>>;
/// Receives a new [`Snapshot`] every time the store content changes
pub type SnapshotReceiver = tokio::sync::watch::Receiver<Snapshot>;

/// A place where events and tasks of one owner are stored.
///
/// Every change in a collection is published as a complete replacement of that collection, never as a patch.
#[async_trait]
pub trait PlannerStore {
    /// Returns the latest published collection of the given kind.
    /// This does not trigger any I/O.
    fn snapshot(&self, kind: ItemKind) -> Snapshot;

    fn get_events(&self) -> Snapshot {
        self.snapshot(ItemKind::Event)
    }

    fn get_tasks(&self) -> Snapshot {
        self.snapshot(ItemKind::Task)
    }

    /// Get notified of every new version of a collection
    fn subscribe(&self, kind: ItemKind) -> SnapshotReceiver;

    /// Store a new item, and return its ID
    async fn add_item(&mut self, item: Item) -> Result<ItemId, PlannerError>;
    /// Replace a stored item by the one with the same ID and kind
    async fn update_item(&mut self, item: Item) -> Result<(), PlannerError>;
    async fn delete_item(&mut self, kind: ItemKind, id: &ItemId) -> Result<(), PlannerError>;

    /// Write the completion fields of a stored item.
    /// This is idempotent as long as `update` is.
    async fn update_completion(&mut self, kind: ItemKind, id: &ItemId, update: CompletionUpdate) -> Result<(), PlannerError>;
}
