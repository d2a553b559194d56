//! Ordered record lists mirrored into durable slots.
//!
//! # Responsibility
//! - Own the authoritative in-memory sequence of one collection.
//! - Mirror every mutation to the collection's slot in the background.
//! - Keep storage failures away from callers (log, keep memory state).
//!
//! # Invariants
//! - A slot is loaded exactly once, when its store is opened, and adopting
//!   the loaded state never schedules a write.
//! - Every mutating call schedules exactly one full-collection write.
//! - Writes of one store are applied in the order they were scheduled.

use crate::repo::kv_repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

pub mod list_store;
mod writer;

pub use list_store::{load_collection, PersistentListStore, SubscriptionId};
pub use writer::PersistHandle;

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence failures. Never returned by mutating calls; only observable
/// through logs, `PersistHandle` and `flush`.
#[derive(Debug)]
pub enum StoreError {
    /// Slot could not be read at load time.
    StorageRead(RepoError),
    /// Slot payload is not a JSON array.
    Decode(serde_json::Error),
    /// Collection could not be serialized.
    Encode(serde_json::Error),
    /// Slot could not be written. Shared so `flush` can report it again.
    StorageWrite(Arc<RepoError>),
    /// Background writer is no longer running.
    WriterStopped,
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StorageRead(err) => write!(f, "failed to read slot: {err}"),
            Self::Decode(err) => write!(f, "failed to decode slot payload: {err}"),
            Self::Encode(err) => write!(f, "failed to encode collection: {err}"),
            Self::StorageWrite(err) => write!(f, "failed to write slot: {err}"),
            Self::WriterStopped => write!(f, "persistence writer stopped"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::StorageRead(err) => Some(err),
            Self::StorageWrite(err) => Some(err.as_ref()),
            Self::Decode(err) | Self::Encode(err) => Some(err),
            Self::WriterStopped => None,
        }
    }
}
