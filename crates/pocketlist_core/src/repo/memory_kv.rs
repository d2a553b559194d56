//! In-memory slots for tests and throwaway sessions.

use crate::repo::kv_repo::{KvRepository, RepoError, RepoResult};
use std::collections::HashMap;
use std::sync::Mutex;

/// `HashMap`-backed slots; contents vanish with the value.
#[derive(Debug, Default)]
pub struct MemoryKvRepository {
    slots: Mutex<HashMap<String, String>>,
}

impl MemoryKvRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a repository pre-seeded with `(key, value)` pairs.
    pub fn with_slots<K, V>(slots: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let slots = slots
            .into_iter()
            .map(|(key, value)| (key.into(), value.into()))
            .collect();
        Self {
            slots: Mutex::new(slots),
        }
    }
}

impl KvRepository for MemoryKvRepository {
    fn get(&self, key: &str) -> RepoResult<Option<String>> {
        let slots = self.slots.lock().map_err(|_| RepoError::LockPoisoned)?;
        Ok(slots.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> RepoResult<()> {
        let mut slots = self.slots.lock().map_err(|_| RepoError::LockPoisoned)?;
        slots.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
