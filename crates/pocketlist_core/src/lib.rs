//! Core logic for PocketList.
//! This crate owns the Notes and Tasks collections and their durable mirror.

pub mod collections;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod store;

pub use collections::Collections;
pub use config::CoreConfig;
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::note::Note;
pub use model::record::{Record, RecordId, ValidationError};
pub use model::task::{parse_due_date, Task};
pub use repo::kv_repo::{KvRepository, RepoError, RepoResult, SqliteKvRepository};
pub use repo::memory_kv::MemoryKvRepository;
pub use service::note_service::{NoteService, NOTES_KEY};
pub use service::selection::ExpandedSelection;
pub use service::task_service::{TaskService, TASKS_KEY};
pub use store::{load_collection, PersistHandle, PersistentListStore, StoreError, SubscriptionId};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
