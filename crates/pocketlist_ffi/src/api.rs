//! FFI use-case API for the Notes and Tasks screens.
//!
//! # Responsibility
//! - Expose list snapshots and mutations to Dart via FRB.
//! - Own the process-wide `Collections`, opened lazily on first use.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - Failures are reported in response envelopes, never thrown.

use log::error;
use pocketlist_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    Collections, CoreConfig, Note, Task,
};
use std::sync::Mutex;

static COLLECTIONS: Mutex<Option<Collections>> = Mutex::new(None);

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// # FFI contract
/// - `level`: `trace|debug|info|warn|error`, case-insensitive.
/// - `log_dir`: absolute directory for rolling log files.
/// - Idempotent for the same input; returns empty string on success and an
///   error message otherwise.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// One row of the Notes screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteItem {
    pub id: String,
    pub title: String,
    pub description: String,
    pub created_at: String,
}

/// One row of the Tasks screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskItem {
    pub id: String,
    pub title: String,
    pub description: String,
    pub date: String,
    pub done: bool,
}

/// Notes snapshot envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteListResponse {
    /// Notes in insertion order (empty on failure).
    pub items: Vec<NoteItem>,
    /// Empty on success; diagnostic text otherwise.
    pub message: String,
}

/// Tasks snapshot envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskListResponse {
    /// Tasks in insertion order (empty on failure).
    pub items: Vec<TaskItem>,
    /// Empty on success; diagnostic text otherwise.
    pub message: String,
}

/// Generic action response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionResponse {
    /// Whether the operation took effect.
    pub ok: bool,
    /// Id of the record the action applied to, when known.
    pub record_id: Option<String>,
    /// Human-readable message for diagnostics/UI.
    pub message: String,
}

impl ActionResponse {
    fn success(message: impl Into<String>, record_id: impl Into<String>) -> Self {
        Self {
            ok: true,
            record_id: Some(record_id.into()),
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            record_id: None,
            message: message.into(),
        }
    }
}

/// Returns the current notes snapshot.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_list() -> NoteListResponse {
    match with_collections(|collections| {
        collections.notes.notes().iter().map(to_note_item).collect()
    }) {
        Ok(items) => NoteListResponse {
            items,
            message: String::new(),
        },
        Err(err) => NoteListResponse {
            items: Vec::new(),
            message: format!("notes_list failed: {err}"),
        },
    }
}

/// Creates a note stamped with the current local time.
///
/// # FFI contract
/// - Blank title or description is rejected with `ok = false`.
/// - Returns the new record id on success.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_create(title: String, description: String) -> ActionResponse {
    match with_collections(|collections| collections.notes.create_note(&title, &description)) {
        Ok(Ok(id)) => ActionResponse::success("Note created.", id.as_str()),
        Ok(Err(err)) => ActionResponse::failure(format!("notes_create rejected: {err}")),
        Err(err) => ActionResponse::failure(format!("notes_create failed: {err}")),
    }
}

/// Deletes a note by id. Unknown ids report `ok = false`.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_delete(id: String) -> ActionResponse {
    match with_collections(|collections| collections.notes.delete_note(&id)) {
        Ok(true) => ActionResponse::success("Note deleted.", id),
        Ok(false) => ActionResponse::failure(format!("note not found: {id}")),
        Err(err) => ActionResponse::failure(format!("notes_delete failed: {err}")),
    }
}

/// Returns the current tasks snapshot.
#[flutter_rust_bridge::frb(sync)]
pub fn tasks_list() -> TaskListResponse {
    match with_collections(|collections| {
        collections.tasks.tasks().iter().map(to_task_item).collect()
    }) {
        Ok(items) => TaskListResponse {
            items,
            message: String::new(),
        },
        Err(err) => TaskListResponse {
            items: Vec::new(),
            message: format!("tasks_list failed: {err}"),
        },
    }
}

/// Creates a task due on `due_date` (`YYYY-MM-DD`).
///
/// # FFI contract
/// - Blank title or malformed date is rejected with `ok = false`.
/// - `description` may be empty.
#[flutter_rust_bridge::frb(sync)]
pub fn tasks_create(title: String, description: String, due_date: String) -> ActionResponse {
    match with_collections(|collections| {
        collections
            .tasks
            .create_task_from_text(&title, &description, &due_date)
    }) {
        Ok(Ok(id)) => ActionResponse::success("Task created.", id.as_str()),
        Ok(Err(err)) => ActionResponse::failure(format!("tasks_create rejected: {err}")),
        Err(err) => ActionResponse::failure(format!("tasks_create failed: {err}")),
    }
}

/// Flips the done flag of a task.
#[flutter_rust_bridge::frb(sync)]
pub fn tasks_toggle_done(id: String) -> ActionResponse {
    match with_collections(|collections| collections.tasks.toggle_done(&id)) {
        Ok(Some(true)) => ActionResponse::success("Task done.", id),
        Ok(Some(false)) => ActionResponse::success("Task reopened.", id),
        Ok(None) => ActionResponse::failure(format!("task not found: {id}")),
        Err(err) => ActionResponse::failure(format!("tasks_toggle_done failed: {err}")),
    }
}

/// Deletes a task by id. Unknown ids report `ok = false`.
#[flutter_rust_bridge::frb(sync)]
pub fn tasks_delete(id: String) -> ActionResponse {
    match with_collections(|collections| collections.tasks.delete_task(&id)) {
        Ok(true) => ActionResponse::success("Task deleted.", id),
        Ok(false) => ActionResponse::failure(format!("task not found: {id}")),
        Err(err) => ActionResponse::failure(format!("tasks_delete failed: {err}")),
    }
}

/// Waits for pending writes of both collections.
///
/// Intended for the app's pause/detach lifecycle hook. Returns empty string
/// on success and an error message otherwise.
#[flutter_rust_bridge::frb(sync)]
pub fn flush_all() -> String {
    match with_collections(|collections| collections.flush()) {
        Ok(Ok(())) => String::new(),
        Ok(Err(err)) => format!("flush_all failed: {err}"),
        Err(err) => format!("flush_all failed: {err}"),
    }
}

fn with_collections<R>(f: impl FnOnce(&mut Collections) -> R) -> Result<R, String> {
    let mut guard = COLLECTIONS
        .lock()
        .map_err(|_| "collections lock poisoned".to_string())?;

    if guard.is_none() {
        let config = CoreConfig::from_env();
        let opened = Collections::open_with_config(&config).map_err(|err| {
            error!(
                "event=collections_open module=ffi status=error db_path={} error={err}",
                config.db_path.display()
            );
            format!("collections open failed: {err}")
        })?;
        *guard = Some(opened);
    }

    match guard.as_mut() {
        Some(collections) => Ok(f(collections)),
        None => Err("collections unavailable".to_string()),
    }
}

fn to_note_item(note: &Note) -> NoteItem {
    NoteItem {
        id: note.id.to_string(),
        title: note.title.clone(),
        description: note.description.clone(),
        created_at: note.created_at.clone(),
    }
}

fn to_task_item(task: &Task) -> TaskItem {
    TaskItem {
        id: task.id.to_string(),
        title: task.title.clone(),
        description: task.description.clone(),
        date: task.date.clone(),
        done: task.done,
    }
}
