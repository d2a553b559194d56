//! Task use-case service.
//!
//! # Invariants
//! - New tasks start with `done = false`.
//! - `toggle_done` is the only mutation of an existing task.

use crate::model::record::{RecordId, ValidationError};
use crate::model::task::{parse_due_date, Task};
use crate::repo::kv_repo::KvRepository;
use crate::service::selection::ExpandedSelection;
use crate::store::PersistentListStore;
use chrono::NaiveDate;
use log::info;
use std::sync::Arc;

/// Slot key of the tasks collection.
pub const TASKS_KEY: &str = "tasks";

/// Tasks screen backend.
pub struct TaskService {
    store: PersistentListStore<Task>,
    expanded: ExpandedSelection,
}

impl TaskService {
    /// Opens the tasks collection from `repo`.
    pub fn open(repo: Arc<dyn KvRepository>) -> Self {
        Self::from_store(PersistentListStore::open(repo, TASKS_KEY))
    }

    pub fn from_store(store: PersistentListStore<Task>) -> Self {
        Self {
            store,
            expanded: ExpandedSelection::new(),
        }
    }

    /// Creates a task due on `due`.
    ///
    /// # Errors
    /// - `EmptyTitle` for a blank title; nothing is stored.
    pub fn create_task(
        &mut self,
        title: &str,
        description: &str,
        due: NaiveDate,
    ) -> Result<RecordId, ValidationError> {
        let task = Task::new(title, description, due)?;
        let id = task.id.clone();
        self.store.add(task);
        info!("event=task_create module=service status=ok id={id}");
        Ok(id)
    }

    /// Same as `create_task`, with the due date given as `YYYY-MM-DD` text.
    pub fn create_task_from_text(
        &mut self,
        title: &str,
        description: &str,
        due: &str,
    ) -> Result<RecordId, ValidationError> {
        let due = parse_due_date(due)?;
        self.create_task(title, description, due)
    }

    /// Flips `done` on a task. Returns the new value, or `None` on a miss.
    pub fn toggle_done(&mut self, id: &str) -> Option<bool> {
        self.store.update_field(id, Task::toggled);
        self.store.get(id).map(|task| task.done)
    }

    /// Deletes a task. Returns whether it existed.
    pub fn delete_task(&mut self, id: &str) -> bool {
        let existed = self.store.get(id).is_some();
        self.store.remove(id);
        self.expanded.forget(id);
        existed
    }

    pub fn tasks(&self) -> &[Task] {
        self.store.state()
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.store.get(id)
    }

    /// Number of tasks not yet done.
    pub fn open_count(&self) -> usize {
        self.tasks().iter().filter(|task| !task.done).count()
    }

    /// Expands or collapses a task on screen.
    ///
    /// Ids that are not in the list leave the selection unchanged and yield
    /// `None`.
    pub fn toggle_expanded(&mut self, id: &str) -> Option<&RecordId> {
        if self.store.get(id).is_none() {
            return None;
        }
        self.expanded.toggle(id)
    }

    pub fn expanded(&self) -> &ExpandedSelection {
        &self.expanded
    }

    pub fn store(&self) -> &PersistentListStore<Task> {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut PersistentListStore<Task> {
        &mut self.store
    }
}
