use chrono::NaiveDate;
use pocketlist_core::{
    KvRepository, MemoryKvRepository, PersistentListStore, RecordId, RepoError, RepoResult,
    StoreError, Task, TASKS_KEY,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Memory slots that remember every write and can be told to fail.
#[derive(Default)]
struct RecordingRepo {
    inner: MemoryKvRepository,
    writes: Mutex<Vec<(String, String)>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl RecordingRepo {
    fn writes(&self) -> Vec<(String, String)> {
        self.writes.lock().unwrap().clone()
    }
}

impl KvRepository for RecordingRepo {
    fn get(&self, key: &str) -> RepoResult<Option<String>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(RepoError::LockPoisoned);
        }
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> RepoResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(RepoError::LockPoisoned);
        }
        self.writes
            .lock()
            .unwrap()
            .push((key.to_string(), value.to_string()));
        self.inner.set(key, value)
    }
}

fn task(title: &str) -> Task {
    Task::new(title, "", NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()).unwrap()
}

fn open(repo: &Arc<RecordingRepo>) -> PersistentListStore<Task> {
    PersistentListStore::open(repo.clone(), TASKS_KEY)
}

fn decode(payload: &str) -> Vec<Task> {
    serde_json::from_str(payload).unwrap()
}

#[test]
fn persisted_sequence_survives_restart_in_order() {
    let repo = Arc::new(RecordingRepo::default());
    let expected: Vec<Task> = ["a", "b", "c", "d"].into_iter().map(task).collect();

    let mut store = open(&repo);
    for item in expected.clone() {
        store.add(item);
    }
    drop(store);

    let reopened = open(&repo);
    assert_eq!(reopened.state(), expected.as_slice());
}

#[test]
fn add_then_reload_keeps_insertion_order() {
    let repo = Arc::new(RecordingRepo::default());
    let r1 = task("first");
    let r2 = task("second");

    let mut store = open(&repo);
    store.add(r1.clone());
    store.add(r2.clone());
    store.flush().unwrap();
    drop(store);

    assert_eq!(open(&repo).state(), &[r1, r2]);
}

#[test]
fn removing_unknown_id_is_a_no_op_that_still_writes() {
    let repo = Arc::new(RecordingRepo::default());
    let r1 = task("keep");

    let mut store = open(&repo);
    store.add(r1.clone());
    let state = store.remove("nonexistent-id").to_vec();
    assert_eq!(state, vec![r1.clone()]);
    store.flush().unwrap();

    let writes = repo.writes();
    assert_eq!(writes.len(), 2);
    let (key, payload) = writes.last().unwrap();
    assert_eq!(key, TASKS_KEY);
    assert_eq!(decode(payload), vec![r1]);
}

#[test]
fn update_on_unknown_id_leaves_sequence_unchanged() {
    let repo = Arc::new(RecordingRepo::default());
    let r1 = task("keep");

    let mut store = open(&repo);
    store.add(r1.clone());
    let state = store.update_field("nonexistent-id", Task::toggled);
    assert_eq!(state, &[r1]);
}

#[test]
fn toggling_done_twice_restores_original_state() {
    let repo = Arc::new(RecordingRepo::default());
    let r1 = task("flip");
    let id = r1.id.as_str().to_string();

    let mut store = open(&repo);
    store.add(r1.clone());
    assert!(store.update_field(&id, Task::toggled)[0].done);
    assert!(!store.update_field(&id, Task::toggled)[0].done);
    assert_eq!(store.get(&id), Some(&r1));
}

#[test]
fn removing_existing_record_persists_the_shorter_list() {
    let repo = Arc::new(RecordingRepo::default());
    let r1 = task("one");
    let r2 = task("two");

    let mut store = open(&repo);
    store.add(r1.clone());
    store.add(r2.clone());
    store.remove_tracked(r1.id.as_str()).wait().unwrap();

    let (_, payload) = repo.writes().pop().unwrap();
    assert_eq!(decode(&payload), vec![r2]);
}

#[test]
fn corrupt_slot_loads_as_empty_without_error() {
    let repo = Arc::new(RecordingRepo::default());
    repo.inner.set(TASKS_KEY, "{not json").unwrap();

    let store = open(&repo);
    assert!(store.is_empty());
    assert!(repo.writes().is_empty());
}

#[test]
fn wrong_shape_slot_loads_as_empty() {
    let repo = Arc::new(RecordingRepo::default());
    repo.inner.set(TASKS_KEY, r#"{"id":"1"}"#).unwrap();

    assert!(open(&repo).is_empty());
}

#[test]
fn undecodable_records_are_skipped_and_the_rest_load() {
    let repo = Arc::new(RecordingRepo::default());
    let kept = vec![task("a"), task("b")];
    let mut payload = serde_json::to_value(&kept).unwrap();
    payload
        .as_array_mut()
        .unwrap()
        .insert(1, serde_json::json!({"id": "3", "title": "c"}));
    repo.inner.set(TASKS_KEY, &payload.to_string()).unwrap();

    let mut store = open(&repo);
    assert_eq!(store.state(), kept.as_slice());
    assert!(repo.writes().is_empty());

    let added = task("d");
    store.add(added.clone());
    store.flush().unwrap();
    drop(store);

    let reopened = open(&repo);
    assert_eq!(reopened.state(), &[kept[0].clone(), kept[1].clone(), added]);
}

#[test]
fn unreadable_slot_loads_as_empty() {
    let repo = Arc::new(RecordingRepo::default());
    repo.fail_reads.store(true, Ordering::SeqCst);

    assert!(open(&repo).is_empty());
}

#[test]
fn opening_a_store_does_not_write_back_loaded_state() {
    let repo = Arc::new(RecordingRepo::default());
    let payload = serde_json::to_string(&vec![task("stored")]).unwrap();
    repo.inner.set(TASKS_KEY, &payload).unwrap();

    let store = open(&repo);
    store.flush().unwrap();
    assert_eq!(store.len(), 1);
    assert!(repo.writes().is_empty());
}

#[test]
fn failed_write_keeps_memory_and_next_mutation_heals_the_slot() {
    let repo = Arc::new(RecordingRepo::default());
    let r1 = task("lost write");
    let r2 = task("healing write");

    let mut store = open(&repo);
    repo.fail_writes.store(true, Ordering::SeqCst);
    let outcome = store.add_tracked(r1.clone()).wait();
    assert!(matches!(outcome, Err(StoreError::StorageWrite(_))));
    assert_eq!(store.state(), &[r1.clone()]);

    repo.fail_writes.store(false, Ordering::SeqCst);
    store.add_tracked(r2.clone()).wait().unwrap();
    drop(store);

    assert_eq!(open(&repo).state(), &[r1, r2]);
}

#[test]
fn flush_reports_a_stale_slot_until_a_write_succeeds() {
    let repo = Arc::new(RecordingRepo::default());
    let mut store = open(&repo);

    repo.fail_writes.store(true, Ordering::SeqCst);
    store.add(task("unsaved"));
    assert!(matches!(store.flush(), Err(StoreError::StorageWrite(_))));
    assert_eq!(store.len(), 1);

    repo.fail_writes.store(false, Ordering::SeqCst);
    store.add(task("saved"));
    store.flush().unwrap();
    assert_eq!(decode(&repo.writes()[0].1).len(), 2);
}

#[test]
fn records_created_back_to_back_get_distinct_ids() {
    let first = task("same instant");
    let second = task("same instant");
    assert_ne!(first.id, second.id);
}

#[test]
fn legacy_payload_with_timestamp_ids_loads() {
    let repo = Arc::new(RecordingRepo::default());
    repo.inner
        .set(
            TASKS_KEY,
            r#"[{"id":"1700000000000","title":"old","description":"d","date":"11/14/2023","done":true}]"#,
        )
        .unwrap();

    let store = open(&repo);
    let loaded = store.get("1700000000000").unwrap();
    assert_eq!(loaded.id, RecordId::from("1700000000000"));
    assert!(loaded.done);
    assert_eq!(loaded.date, "11/14/2023");
}
