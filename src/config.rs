//! Support for library configuration options

use std::sync::{Arc, Mutex};
use once_cell::sync::Lazy;

/// Category given to tasks that do not carry one (e.g. tasks created before categories existed).
/// Feel free to override it when initing this library.
pub static DEFAULT_TASK_TYPE: Lazy<Arc<Mutex<String>>> = Lazy::new(|| Arc::new(Mutex::new("Other".to_string())));

/// Sort key used for items that have no start time.
/// Untimed items are listed first in a day, together with items starting at midnight.
pub const DEFAULT_SORT_TIME: &str = "00:00";

/// Extension of the files the [`Cache`](crate::cache::Cache) writes into its folder
pub const CACHE_FILE_EXTENSION: &str = "json";

/// Returns the current value of [`DEFAULT_TASK_TYPE`]
pub fn default_task_type() -> String {
    match DEFAULT_TASK_TYPE.lock() {
        Ok(t) => t.clone(),
        Err(poisoned) => poisoned.into_inner().clone(),
    }
}
