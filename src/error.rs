//! Errors returned by this crate

use chrono::NaiveDate;
use thiserror::Error;

use crate::item::{ItemId, ItemKind};

#[derive(Debug, Error)]
pub enum PlannerError {
    /// The caller referred to an entity that is not in the current collection
    #[error("no {kind} with id {id}")]
    NotFound { kind: ItemKind, id: ItemId },

    /// Completion was requested for a date the entity does not occur on
    #[error("{date} is not an occurrence of {kind} {id}")]
    NotAnOccurrence { kind: ItemKind, id: ItemId, date: NaiveDate },

    #[error("{kind} {id} already exists")]
    AlreadyExists { kind: ItemKind, id: ItemId },

    #[error("I/O error in the local store: {0}")]
    Io(#[from] std::io::Error),

    #[error("unable to (de)serialize store data: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Any other failure reported by a store. These are passed through untouched.
    #[error("store failure: {0}")]
    Store(String),
}
