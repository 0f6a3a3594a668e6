//! This module provides a local store for planner items, backed by a JSON file

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
#[cfg(any(test, feature = "mock_store_failures"))]
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::watch;

use crate::completion::{self, CompletionUpdate};
use crate::config::CACHE_FILE_EXTENSION;
use crate::error::PlannerError;
use crate::item::{Item, ItemId, ItemKind};
use crate::traits::{PlannerStore, Snapshot, SnapshotReceiver};
#[cfg(any(test, feature = "mock_store_failures"))]
use crate::mock_behaviour::MockBehaviour;


/// A store that keeps the items of one owner in memory, and saves them into a local file after every change
pub struct Cache {
    backing_folder: PathBuf,
    owner: String,
    data: CachedData,

    events_sender: watch::Sender<Snapshot>,
    tasks_sender: watch::Sender<Snapshot>,

    #[cfg(any(test, feature = "mock_store_failures"))]
    mock_behaviour: Option<Arc<Mutex<MockBehaviour>>>,
}

#[derive(Clone, Default, Debug, PartialEq, Serialize, Deserialize)]
struct CachedData {
    #[serde(default)]
    events: Vec<Item>,
    #[serde(default)]
    tasks: Vec<Item>,
}

impl Cache {
    /// The folder used when none is specified
    pub fn default_cache_folder() -> PathBuf {
        let home = std::env::var_os("HOME").map(PathBuf::from).unwrap_or_default();
        home.join(".config").join("month-planner")
    }

    /// Path of the file that stores the items of `owner` in `folder`
    pub fn cache_file(folder: &Path, owner: &str) -> PathBuf {
        let file_name = format!("{}.{}", sanitize_filename::sanitize(owner), CACHE_FILE_EXTENSION);
        folder.join(file_name)
    }

    /// Initialize a cache from the content of a valid backing file if it exists.
    /// Returns an error otherwise
    pub fn from_folder(folder: &Path, owner: &str) -> Result<Self, PlannerError> {
        let path = Self::cache_file(folder, owner);
        let file = std::fs::File::open(&path)?;
        let mut data: CachedData = serde_json::from_reader(std::io::BufReader::new(file))?;
        drop_misplaced_items(&mut data);
        log::debug!("Loaded {} event(s) and {} task(s) from {:?}", data.events.len(), data.tasks.len(), path);

        Ok(Self::with_data(folder, owner, data))
    }

    /// Initialize an empty cache
    pub fn new(folder: &Path, owner: &str) -> Self {
        Self::with_data(folder, owner, CachedData::default())
    }

    fn with_data(folder: &Path, owner: &str, data: CachedData) -> Self {
        let (events_sender, _) = watch::channel(Arc::new(data.events.clone()));
        let (tasks_sender, _) = watch::channel(Arc::new(data.tasks.clone()));
        Self {
            backing_folder: PathBuf::from(folder),
            owner: owner.to_string(),
            data,
            events_sender,
            tasks_sender,
            #[cfg(any(test, feature = "mock_store_failures"))]
            mock_behaviour: None,
        }
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Make this cache fail some writes. Only useful in tests.
    #[cfg(any(test, feature = "mock_store_failures"))]
    pub fn set_mock_behaviour(&mut self, mock_behaviour: Option<Arc<Mutex<MockBehaviour>>>) {
        self.mock_behaviour = mock_behaviour;
    }

    #[cfg(any(test, feature = "mock_store_failures"))]
    fn check_mock<F>(&self, check: F) -> Result<(), PlannerError>
    where
        F: FnOnce(&mut MockBehaviour) -> Result<(), PlannerError>,
    {
        match &self.mock_behaviour {
            None => Ok(()),
            Some(behaviour) => {
                let mut behaviour = behaviour.lock()
                    .map_err(|_| PlannerError::Store("mock behaviour is poisoned".to_string()))?;
                check(&mut behaviour)
            },
        }
    }

    /// Store the current Cache to its backing file.
    ///
    /// The content is first written next to it, then moved over it, so that the backing file is either the previous one or the new one.
    pub fn save_to_folder(&self) -> Result<(), PlannerError> {
        std::fs::create_dir_all(&self.backing_folder)?;
        let path = Self::cache_file(&self.backing_folder, &self.owner);
        let staging = staging_file(&path);

        if let Err(err) = self.write_to(&staging) {
            let _ = std::fs::remove_file(&staging);
            return Err(err);
        }
        std::fs::rename(&staging, &path)?;
        log::trace!("Saved {:?}", path);
        Ok(())
    }

    fn write_to(&self, path: &Path) -> Result<(), PlannerError> {
        let mut writer = std::io::BufWriter::new(std::fs::File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, &self.data)?;
        writer.flush()?;
        writer.get_ref().sync_all()?;
        Ok(())
    }

    fn collection(&self, kind: ItemKind) -> &Vec<Item> {
        match kind {
            ItemKind::Event => &self.data.events,
            ItemKind::Task => &self.data.tasks,
        }
    }

    fn collection_mut(&mut self, kind: ItemKind) -> &mut Vec<Item> {
        match kind {
            ItemKind::Event => &mut self.data.events,
            ItemKind::Task => &mut self.data.tasks,
        }
    }

    fn sender(&self, kind: ItemKind) -> &watch::Sender<Snapshot> {
        match kind {
            ItemKind::Event => &self.events_sender,
            ItemKind::Task => &self.tasks_sender,
        }
    }

    /// Push the whole collection to the subscribers
    fn publish(&self, kind: ItemKind) {
        let snapshot = Arc::new(self.collection(kind).clone());
        log::debug!("Publishing {} {}(s)", snapshot.len(), kind);
        self.sender(kind).send_replace(snapshot);
    }

    /// Apply `change` to a collection, then save and publish it.
    /// In case either the change or the save fails, the collection is left untouched.
    fn commit<T, F>(&mut self, kind: ItemKind, change: F) -> Result<T, PlannerError>
    where
        F: FnOnce(&mut Vec<Item>) -> Result<T, PlannerError>,
    {
        let previous = self.collection(kind).clone();

        let result = change(self.collection_mut(kind))
            .and_then(|value| self.save_to_folder().map(|_| value));

        match result {
            Ok(value) => {
                self.publish(kind);
                Ok(value)
            },
            Err(err) => {
                *self.collection_mut(kind) = previous;
                Err(err)
            },
        }
    }
}

/// Where the next version of `path` is written before replacing it
fn staging_file(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Items in the wrong collection are not trusted
fn drop_misplaced_items(data: &mut CachedData) {
    data.events.retain(|item| {
        if item.is_event() == false {
            log::warn!("Ignoring {} {} found among events", item.kind(), item.id());
        }
        item.is_event()
    });
    data.tasks.retain(|item| {
        if item.is_task() == false {
            log::warn!("Ignoring {} {} found among tasks", item.kind(), item.id());
        }
        item.is_task()
    });
}


#[async_trait]
impl PlannerStore for Cache {
    fn snapshot(&self, kind: ItemKind) -> Snapshot {
        self.sender(kind).borrow().clone()
    }

    fn subscribe(&self, kind: ItemKind) -> SnapshotReceiver {
        self.sender(kind).subscribe()
    }

    async fn add_item(&mut self, mut item: Item) -> Result<ItemId, PlannerError> {
        #[cfg(any(test, feature = "mock_store_failures"))]
        self.check_mock(MockBehaviour::can_add_item)?;

        let kind = item.kind();
        let id = item.id().clone();
        if self.collection(kind).iter().any(|i| i.id() == &id) {
            return Err(PlannerError::AlreadyExists { kind, id });
        }

        let now = Utc::now();
        item.base_mut().set_created_at(now);
        item.base_mut().set_updated_at(now);

        self.commit(kind, |items| {
            items.push(item);
            Ok(())
        })?;
        log::info!("Added {} {}", kind, id);
        Ok(id)
    }

    async fn update_item(&mut self, mut item: Item) -> Result<(), PlannerError> {
        #[cfg(any(test, feature = "mock_store_failures"))]
        self.check_mock(MockBehaviour::can_update_item)?;

        let kind = item.kind();
        let id = item.id().clone();
        let created_at = match self.collection(kind).iter().find(|i| i.id() == &id) {
            None => return Err(PlannerError::NotFound { kind, id }),
            Some(previous) => previous.base().created_at().cloned(),
        };

        if let Some(created_at) = created_at {
            item.base_mut().set_created_at(created_at);
        }
        item.base_mut().set_updated_at(Utc::now());
        let still_valid = completion::reconcile(item.base());
        item.base_mut().set_completed_occurrences_dates(still_valid);

        self.commit(kind, |items| {
            match items.iter_mut().find(|i| i.id() == &id) {
                None => Err(PlannerError::NotFound { kind, id: id.clone() }),
                Some(slot) => {
                    *slot = item;
                    Ok(())
                },
            }
        })?;
        log::info!("Updated {} {}", kind, id);
        Ok(())
    }

    async fn delete_item(&mut self, kind: ItemKind, id: &ItemId) -> Result<(), PlannerError> {
        #[cfg(any(test, feature = "mock_store_failures"))]
        self.check_mock(MockBehaviour::can_delete_item)?;

        self.commit(kind, |items| {
            let n_before = items.len();
            items.retain(|i| i.id() != id);
            if items.len() == n_before {
                Err(PlannerError::NotFound { kind, id: id.clone() })
            } else {
                Ok(())
            }
        })?;
        log::info!("Deleted {} {}", kind, id);
        Ok(())
    }

    async fn update_completion(&mut self, kind: ItemKind, id: &ItemId, update: CompletionUpdate) -> Result<(), PlannerError> {
        #[cfg(any(test, feature = "mock_store_failures"))]
        self.check_mock(MockBehaviour::can_update_completion)?;

        self.commit(kind, |items| {
            let item = items.iter_mut()
                .find(|i| i.id() == id)
                .ok_or_else(|| PlannerError::NotFound { kind, id: id.clone() })?;
            update.apply_to(item.base_mut());
            item.base_mut().set_updated_at(Utc::now());
            Ok(())
        })?;
        log::info!("Updated completion of {} {}", kind, id);
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    use chrono::NaiveDate;

    use crate::recurrence::Recurrence;
    use crate::{Event, Task};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn test_folder() -> PathBuf {
        std::env::temp_dir().join(format!("month-planner-cache-{}", uuid::Uuid::new_v4()))
    }

    #[test]
    fn test_cache_file_name_is_sanitized() {
        let path = Cache::cache_file(Path::new("/tmp/cache"), "john/../doe");
        assert_eq!(path.parent(), Some(Path::new("/tmp/cache")));
        assert!(path.file_name().unwrap().to_str().unwrap().ends_with(".json"));
        assert!(!path.file_name().unwrap().to_str().unwrap().contains('/'));
    }

    #[tokio::test]
    async fn serde_cache() {
        let _ = env_logger::builder().is_test(true).try_init();
        let folder = test_folder();

        let mut cache = Cache::new(&folder, "alice");
        let mut task = Task::new("Buy bread".to_string(), date(2025, 3, 1));
        task.base_mut().set_recurrence(Recurrence::Weekly);
        task.set_task_type("Groceries".to_string());
        cache.add_item(Item::Task(task)).await.unwrap();
        cache.add_item(Item::Event(Event::new("Concert".to_string(), date(2025, 3, 8)))).await.unwrap();

        let retrieved_cache = Cache::from_folder(&folder, "alice").unwrap();
        assert_eq!(cache.data, retrieved_cache.data);
        assert_eq!(retrieved_cache.get_tasks().len(), 1);
        assert_eq!(retrieved_cache.get_events().len(), 1);

        assert!(Cache::from_folder(&folder, "bob").is_err());
        let _ = std::fs::remove_dir_all(&folder);
    }

    #[tokio::test]
    async fn test_writes_publish_full_collections() {
        let folder = test_folder();
        let mut cache = Cache::new(&folder, "alice");
        let mut receiver = cache.subscribe(ItemKind::Task);
        assert!(receiver.borrow().is_empty());

        let id = cache.add_item(Item::Task(Task::new("a".to_string(), date(2025, 3, 1)))).await.unwrap();
        cache.add_item(Item::Task(Task::new("b".to_string(), date(2025, 3, 2)))).await.unwrap();
        assert!(receiver.has_changed().unwrap());
        assert_eq!(receiver.borrow_and_update().len(), 2);

        cache.delete_item(ItemKind::Task, &id).await.unwrap();
        let names: Vec<String> = receiver.borrow_and_update().iter().map(|i| i.name().to_string()).collect();
        assert_eq!(names, vec!["b".to_string()]);

        // Events are untouched
        assert!(cache.get_events().is_empty());
        let _ = std::fs::remove_dir_all(&folder);
    }

    #[tokio::test]
    async fn test_not_found() {
        let folder = test_folder();
        let mut cache = Cache::new(&folder, "alice");
        let task = Item::Task(Task::new("a".to_string(), date(2025, 3, 1)));
        let id = task.id().clone();

        let update = CompletionUpdate::Single { is_completed: true };
        assert!(matches!(
            cache.update_completion(ItemKind::Task, &id, update).await,
            Err(PlannerError::NotFound { .. })
        ));
        assert!(matches!(cache.update_item(task.clone()).await, Err(PlannerError::NotFound { .. })));
        assert!(matches!(cache.delete_item(ItemKind::Task, &id).await, Err(PlannerError::NotFound { .. })));

        cache.add_item(task.clone()).await.unwrap();
        assert!(matches!(cache.add_item(task).await, Err(PlannerError::AlreadyExists { .. })));
        // Looked up in the task collection only
        assert!(matches!(cache.delete_item(ItemKind::Event, &id).await, Err(PlannerError::NotFound { .. })));
        let _ = std::fs::remove_dir_all(&folder);
    }

    #[tokio::test]
    async fn test_update_reconciles_completed_dates() {
        let folder = test_folder();
        let mut cache = Cache::new(&folder, "alice");
        let mut task = Task::new("stretch".to_string(), date(2025, 3, 1));
        task.base_mut().set_recurrence(Recurrence::Daily);
        let mut item = Item::Task(task);
        let id = cache.add_item(item.clone()).await.unwrap();

        let dates = vec![date(2025, 3, 1), date(2025, 3, 5)].into_iter().collect();
        let update = CompletionUpdate::PerOccurrence { completed_occurrences_dates: dates };
        cache.update_completion(ItemKind::Task, &id, update.clone()).await.unwrap();
        update.apply_to(item.base_mut());

        item.base_mut().set_start_date(Some(date(2025, 3, 3)));
        cache.update_item(item).await.unwrap();

        let tasks = cache.get_tasks();
        assert_eq!(tasks[0].base().completed_occurrences_dates().iter().cloned().collect::<Vec<_>>(), vec![date(2025, 3, 5)]);
        assert!(tasks[0].base().created_at().is_some());
        let _ = std::fs::remove_dir_all(&folder);
    }

    #[tokio::test]
    async fn test_failed_write_leaves_store_untouched() {
        let folder = test_folder();
        let mut cache = Cache::new(&folder, "alice");
        let id = cache.add_item(Item::Task(Task::new("a".to_string(), date(2025, 3, 1)))).await.unwrap();
        let receiver = cache.subscribe(ItemKind::Task);

        cache.set_mock_behaviour(Some(Arc::new(Mutex::new(MockBehaviour::fail_now(1)))));
        let update = CompletionUpdate::Single { is_completed: true };
        assert!(matches!(
            cache.update_completion(ItemKind::Task, &id, update.clone()).await,
            Err(PlannerError::Store(_))
        ));
        assert!(!receiver.has_changed().unwrap());
        assert!(!cache.get_tasks()[0].base().is_completed());

        // The store does not retry by itself, but the caller can
        cache.update_completion(ItemKind::Task, &id, update).await.unwrap();
        assert!(cache.get_tasks()[0].base().is_completed());
        let _ = std::fs::remove_dir_all(&folder);
    }

    #[tokio::test]
    async fn test_failed_save_keeps_the_backing_file() {
        let folder = test_folder();
        let mut cache = Cache::new(&folder, "alice");
        let id = cache.add_item(Item::Task(Task::new("a".to_string(), date(2025, 3, 1)))).await.unwrap();
        let path = Cache::cache_file(&folder, "alice");
        let saved = std::fs::read_to_string(&path).unwrap();

        // Nothing can be written where a folder already is
        let staging = staging_file(&path);
        std::fs::create_dir_all(&staging).unwrap();

        let update = CompletionUpdate::Single { is_completed: true };
        assert!(matches!(
            cache.update_completion(ItemKind::Task, &id, update).await,
            Err(PlannerError::Io(_))
        ));
        assert!(!cache.get_tasks()[0].base().is_completed());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), saved);

        let reloaded = Cache::from_folder(&folder, "alice").unwrap();
        assert_eq!(reloaded.data, cache.data);

        std::fs::remove_dir_all(&staging).unwrap();
        cache.delete_item(ItemKind::Task, &id).await.unwrap();
        assert!(!staging.exists());
        assert!(Cache::from_folder(&folder, "alice").unwrap().get_tasks().is_empty());
        let _ = std::fs::remove_dir_all(&folder);
    }
}
