//! Note use-case service.
//!
//! # Invariants
//! - Notes are append-only apart from deletion; there is no edit path.
//! - `created_at` is stamped once, at creation.

use crate::model::note::Note;
use crate::model::record::{RecordId, ValidationError};
use crate::repo::kv_repo::KvRepository;
use crate::service::selection::ExpandedSelection;
use crate::store::PersistentListStore;
use chrono::{DateTime, Local};
use log::info;
use std::sync::Arc;

/// Slot key of the notes collection.
pub const NOTES_KEY: &str = "notes";

/// Notes screen backend.
pub struct NoteService {
    store: PersistentListStore<Note>,
    expanded: ExpandedSelection,
}

impl NoteService {
    /// Opens the notes collection from `repo`.
    pub fn open(repo: Arc<dyn KvRepository>) -> Self {
        Self::from_store(PersistentListStore::open(repo, NOTES_KEY))
    }

    pub fn from_store(store: PersistentListStore<Note>) -> Self {
        Self {
            store,
            expanded: ExpandedSelection::new(),
        }
    }

    /// Creates a note stamped with the current local time.
    pub fn create_note(
        &mut self,
        title: &str,
        description: &str,
    ) -> Result<RecordId, ValidationError> {
        self.create_note_at(title, description, Local::now())
    }

    /// Creates a note stamped with `at`.
    ///
    /// # Errors
    /// - `EmptyTitle` / `EmptyDescription` for blank input; nothing is stored.
    pub fn create_note_at(
        &mut self,
        title: &str,
        description: &str,
        at: DateTime<Local>,
    ) -> Result<RecordId, ValidationError> {
        let note = Note::new(title, description, at)?;
        let id = note.id.clone();
        self.store.add(note);
        info!("event=note_create module=service status=ok id={id}");
        Ok(id)
    }

    /// Deletes a note. Returns whether it existed.
    pub fn delete_note(&mut self, id: &str) -> bool {
        let existed = self.store.get(id).is_some();
        self.store.remove(id);
        self.expanded.forget(id);
        existed
    }

    pub fn notes(&self) -> &[Note] {
        self.store.state()
    }

    pub fn get(&self, id: &str) -> Option<&Note> {
        self.store.get(id)
    }

    /// Expands or collapses a note on screen.
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

    pub fn store(&self) -> &PersistentListStore<Note> {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut PersistentListStore<Note> {
        &mut self.store
    }
}
