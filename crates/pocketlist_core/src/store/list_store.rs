//! `PersistentListStore`: one collection, one slot.

use crate::model::record::Record;
use crate::repo::kv_repo::KvRepository;
use crate::store::writer::{PersistHandle, PersistWriter};
use crate::store::{StoreError, StoreResult};
use log::{debug, error, info, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;

/// Handle returned by `PersistentListStore::subscribe`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener<T> = Box<dyn Fn(&[T]) + Send>;

/// Ordered in-memory records of one type, mirrored to a durable slot.
///
/// The store is the only writer of its slot. Mutations update memory
/// immediately and queue a write of the whole collection; callers never have
/// to wait for that write.
pub struct PersistentListStore<T> {
    key: String,
    items: Vec<T>,
    revision: u64,
    listeners: Vec<(SubscriptionId, Listener<T>)>,
    next_subscription: u64,
    writer: PersistWriter,
}

impl<T> PersistentListStore<T>
where
    T: Record + Serialize + DeserializeOwned,
{
    /// Opens the collection stored under `key`.
    ///
    /// Loads the slot once. A missing, unreadable, or malformed slot yields an
    /// empty collection. Adopting the loaded state does not write it back.
    pub fn open(repo: Arc<dyn KvRepository>, key: impl Into<String>) -> Self {
        let key = key.into();
        let items = load_collection(repo.as_ref(), &key);
        let writer = PersistWriter::spawn(&key, repo);
        Self {
            key,
            items,
            revision: 0,
            listeners: Vec::new(),
            next_subscription: 0,
            writer,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Current snapshot, in insertion order.
    pub fn state(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.items.iter().find(|item| item.id().as_str() == id)
    }

    /// Number of mutating calls since the store was opened.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Appends `record` and schedules a write.
    ///
    /// A record whose id is already present is not appended; the write is
    /// still scheduled.
    pub fn add(&mut self, record: T) -> &[T] {
        self.add_tracked(record);
        &self.items
    }

    pub fn add_tracked(&mut self, record: T) -> PersistHandle {
        if self.get(record.id().as_str()).is_some() {
            warn!(
                "event=list_add module=store status=skipped key={} reason=duplicate_id id={}",
                self.key,
                record.id()
            );
        } else {
            self.items.push(record);
        }
        self.commit()
    }

    /// Removes the record with `id`, if any, and schedules a write.
    pub fn remove(&mut self, id: &str) -> &[T] {
        self.remove_tracked(id);
        &self.items
    }

    pub fn remove_tracked(&mut self, id: &str) -> PersistHandle {
        match self.position(id) {
            Some(index) => {
                self.items.remove(index);
            }
            None => debug!(
                "event=list_remove module=store status=miss key={} id={id}",
                self.key
            ),
        }
        self.commit()
    }

    /// Replaces the record with `id` by `mutator(record)` and schedules a write.
    ///
    /// Misses leave the sequence unchanged. A mutator result carrying a
    /// different id is discarded.
    pub fn update_field(&mut self, id: &str, mutator: impl FnOnce(T) -> T) -> &[T]
    where
        T: Clone,
    {
        self.update_field_tracked(id, mutator);
        &self.items
    }

    pub fn update_field_tracked(&mut self, id: &str, mutator: impl FnOnce(T) -> T) -> PersistHandle
    where
        T: Clone,
    {
        match self.position(id) {
            Some(index) => {
                let updated = mutator(self.items[index].clone());
                if updated.id() == self.items[index].id() {
                    self.items[index] = updated;
                } else {
                    warn!(
                        "event=list_update module=store status=rejected key={} reason=id_changed id={id}",
                        self.key
                    );
                }
            }
            None => debug!(
                "event=list_update module=store status=miss key={} id={id}",
                self.key
            ),
        }
        self.commit()
    }

    /// Schedules a write of the full current collection.
    ///
    /// Mutating calls do this on their own; calling it directly is only
    /// useful to rewrite a slot after an earlier write failed.
    pub fn persist(&self) -> PersistHandle {
        match serde_json::to_string(&self.items) {
            Ok(payload) => self.writer.submit(payload),
            Err(err) => {
                error!(
                    "event=list_persist module=store status=error key={} error_code=encode_failed error={err}",
                    self.key
                );
                PersistHandle::resolved(Err(StoreError::Encode(err)))
            }
        }
    }

    /// Blocks until every write scheduled so far has been applied.
    ///
    /// # Errors
    /// - `StorageWrite` when the latest applied write failed, so the slot
    ///   does not hold the current state. A later successful write clears it.
    /// - `WriterStopped` when the background writer is gone.
    pub fn flush(&self) -> StoreResult<()> {
        self.writer.flush()
    }

    /// Registers `listener`, called with the new state after every mutating
    /// call.
    pub fn subscribe(&mut self, listener: impl Fn(&[T]) + Send + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns whether `id` was registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(registered, _)| *registered != id);
        self.listeners.len() != before
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.items.iter().position(|item| item.id().as_str() == id)
    }

    fn commit(&mut self) -> PersistHandle {
        self.revision += 1;
        let handle = self.persist();
        for (_, listener) in &self.listeners {
            listener(&self.items);
        }
        handle
    }
}

/// Reads the collection stored under `key`.
///
/// Never fails: absence, read errors and payloads that are not a JSON array
/// all yield an empty collection, with failures logged at `warn`. Array
/// elements that do not decode as `T` are skipped one by one; the rest load.
pub fn load_collection<T: DeserializeOwned>(repo: &dyn KvRepository, key: &str) -> Vec<T> {
    match try_load_collection(repo, key) {
        Ok(Some(items)) => {
            info!(
                "event=list_load module=store status=ok key={key} count={}",
                items.len()
            );
            items
        }
        Ok(None) => {
            info!("event=list_load module=store status=empty key={key}");
            Vec::new()
        }
        Err(err) => {
            let error_code = match err {
                StoreError::Decode(_) => "decode_failed",
                _ => "storage_read_failed",
            };
            warn!(
                "event=list_load module=store status=error key={key} error_code={error_code} fallback=empty error={err}"
            );
            Vec::new()
        }
    }
}

fn try_load_collection<T: DeserializeOwned>(
    repo: &dyn KvRepository,
    key: &str,
) -> StoreResult<Option<Vec<T>>> {
    let Some(payload) = repo.get(key).map_err(StoreError::StorageRead)? else {
        return Ok(None);
    };
    let values: Vec<serde_json::Value> =
        serde_json::from_str(&payload).map_err(StoreError::Decode)?;

    let mut items = Vec::with_capacity(values.len());
    for (index, value) in values.into_iter().enumerate() {
        match serde_json::from_value(value) {
            Ok(item) => items.push(item),
            Err(err) => warn!(
                "event=list_load module=store status=error key={key} error_code=record_decode_failed index={index} fallback=skip error={err}"
            ),
        }
    }
    Ok(Some(items))
}
