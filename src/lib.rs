//! This crate computes what a personal planner displays: which events and tasks occur on which days.
//!
//! Events and tasks ([`Item`]s) are stored with a single start date and an optional [recurrence rule](recurrence::Recurrence).
//! The [`recurrence`] module expands them into concrete dates, the [`occurrence`] module projects whole collections onto a month,
//! and the [`view`] module turns these projections into a month grid and per-day lists. \
//! Recurring items are completed occurrence by occurrence, see the [`completion`] module.
//!
//! Items live in a [`PlannerStore`](traits::PlannerStore). This crate provides a local, file-backed one in the [`cache`] module. \
//! A [`Planner`] combines a store and these computations, and forwards completion changes to the store.

pub mod traits;
pub mod error;
pub use error::PlannerError;

pub mod item;
pub use item::{Item, ItemId, ItemKind};
mod task;
pub use task::Task;
mod event;
pub use event::Event;

pub mod date_grid;
pub use date_grid::YearMonth;
pub mod recurrence;
pub mod occurrence;
pub use occurrence::Occurrence;
pub mod completion;
pub mod view;

pub mod planner;
pub use planner::Planner;
pub mod cache;

pub mod config;
pub mod utils;
pub mod mock_behaviour;
