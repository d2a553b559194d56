//! Both collections opened over one durable backend.

use crate::config::CoreConfig;
use crate::repo::kv_repo::{KvRepository, RepoResult, SqliteKvRepository};
use crate::service::note_service::NoteService;
use crate::service::task_service::TaskService;
use crate::store::StoreResult;
use std::sync::Arc;

/// The Notes and Tasks backends of one app process.
///
/// The two stores share the backend but use distinct slots and never touch
/// each other's records.
pub struct Collections {
    pub notes: NoteService,
    pub tasks: TaskService,
}

impl Collections {
    pub fn open(repo: Arc<dyn KvRepository>) -> Self {
        Self {
            notes: NoteService::open(Arc::clone(&repo)),
            tasks: TaskService::open(repo),
        }
    }

    /// Opens the SQLite database named by `config`.
    pub fn open_with_config(config: &CoreConfig) -> RepoResult<Self> {
        let repo = SqliteKvRepository::open(&config.db_path)?;
        Ok(Self::open(Arc::new(repo)))
    }

    /// Waits for pending writes of both collections.
    pub fn flush(&self) -> StoreResult<()> {
        self.notes.store().flush()?;
        self.tasks.store().flush()
    }
}
