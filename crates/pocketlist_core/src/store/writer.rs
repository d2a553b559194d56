//! Background slot writer.
//!
//! One thread per store drains a FIFO channel of full-collection payloads.
//! When the thread cannot be spawned, writes run inline on the caller.

use crate::repo::kv_repo::{KvRepository, RepoError};
use crate::store::{StoreError, StoreResult};
use log::{debug, error, warn};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Instant;

enum Command {
    Write {
        payload: String,
        reply: Sender<StoreResult<()>>,
    },
    Flush(Sender<StoreResult<()>>),
}

/// Failure of the most recent write; cleared by the next successful one.
#[derive(Default)]
struct LastFailure(Option<Arc<RepoError>>);

impl LastFailure {
    fn record(&mut self, outcome: &StoreResult<()>) {
        match outcome {
            Ok(()) => self.0 = None,
            Err(StoreError::StorageWrite(err)) => self.0 = Some(Arc::clone(err)),
            Err(_) => {}
        }
    }

    fn as_result(&self) -> StoreResult<()> {
        match &self.0 {
            Some(err) => Err(StoreError::StorageWrite(Arc::clone(err))),
            None => Ok(()),
        }
    }
}

struct Worker {
    commands: Sender<Command>,
    thread: JoinHandle<()>,
}

pub(crate) struct PersistWriter {
    key: String,
    repo: Arc<dyn KvRepository>,
    worker: Option<Worker>,
    /// Only used when writes run inline.
    inline_failure: Mutex<LastFailure>,
}

impl PersistWriter {
    pub(crate) fn spawn(key: &str, repo: Arc<dyn KvRepository>) -> Self {
        let (commands, inbox) = mpsc::channel();
        let thread_key = key.to_string();
        let thread_repo = Arc::clone(&repo);
        let spawned = std::thread::Builder::new()
            .name(format!("pocketlist-persist-{key}"))
            .spawn(move || run(&thread_key, thread_repo.as_ref(), inbox));

        let worker = match spawned {
            Ok(thread) => Some(Worker { commands, thread }),
            Err(err) => {
                warn!(
                    "event=writer_spawn module=store status=error key={key} fallback=inline error={err}"
                );
                None
            }
        };

        Self {
            key: key.to_string(),
            repo,
            worker,
            inline_failure: Mutex::new(LastFailure::default()),
        }
    }

    /// Queues `payload` as the next value of the slot.
    pub(crate) fn submit(&self, payload: String) -> PersistHandle {
        let Some(worker) = &self.worker else {
            let outcome = write_slot(&self.key, self.repo.as_ref(), &payload);
            self.lock_inline_failure().record(&outcome);
            return PersistHandle::resolved(outcome);
        };

        let (reply, receiver) = mpsc::channel();
        if worker
            .commands
            .send(Command::Write { payload, reply })
            .is_err()
        {
            error!(
                "event=list_persist module=store status=error key={} error_code=writer_stopped",
                self.key
            );
            return PersistHandle::resolved(Err(StoreError::WriterStopped));
        }
        PersistHandle::pending(receiver)
    }

    /// Blocks until every previously submitted write has been applied.
    ///
    /// Fails when the latest applied write failed, i.e. the slot is stale.
    pub(crate) fn flush(&self) -> StoreResult<()> {
        let Some(worker) = &self.worker else {
            return self.lock_inline_failure().as_result();
        };

        let (ack, acked) = mpsc::channel();
        worker
            .commands
            .send(Command::Flush(ack))
            .map_err(|_| StoreError::WriterStopped)?;
        acked.recv().unwrap_or(Err(StoreError::WriterStopped))
    }

    fn lock_inline_failure(&self) -> std::sync::MutexGuard<'_, LastFailure> {
        self.inline_failure
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Drop for PersistWriter {
    fn drop(&mut self) {
        if let Some(Worker { commands, thread }) = self.worker.take() {
            // Closing the channel lets the thread drain queued writes and exit.
            drop(commands);
            if thread.join().is_err() {
                error!(
                    "event=writer_join module=store status=error key={} error_code=writer_panicked",
                    self.key
                );
            }
        }
    }
}

fn run(key: &str, repo: &dyn KvRepository, inbox: Receiver<Command>) {
    let mut last_failure = LastFailure::default();
    for command in inbox {
        match command {
            Command::Write { payload, reply } => {
                let outcome = write_slot(key, repo, &payload);
                last_failure.record(&outcome);
                // Nobody waiting on the handle is fine.
                let _ = reply.send(outcome);
            }
            Command::Flush(ack) => {
                let _ = ack.send(last_failure.as_result());
            }
        }
    }
    debug!("event=writer_exit module=store status=ok key={key}");
}

fn write_slot(key: &str, repo: &dyn KvRepository, payload: &str) -> StoreResult<()> {
    let started_at = Instant::now();
    match repo.set(key, payload) {
        Ok(()) => {
            debug!(
                "event=list_persist module=store status=ok key={key} bytes={} duration_ms={}",
                payload.len(),
                started_at.elapsed().as_millis()
            );
            Ok(())
        }
        Err(err) => {
            error!(
                "event=list_persist module=store status=error key={key} error_code=storage_write_failed duration_ms={} error={err}",
                started_at.elapsed().as_millis()
            );
            Err(StoreError::StorageWrite(Arc::new(err)))
        }
    }
}

/// Outcome of one scheduled slot write.
///
/// Dropping a handle does not cancel the write.
#[derive(Debug)]
pub struct PersistHandle {
    receiver: Receiver<StoreResult<()>>,
    outcome: Option<StoreResult<()>>,
}

impl PersistHandle {
    fn pending(receiver: Receiver<StoreResult<()>>) -> Self {
        Self {
            receiver,
            outcome: None,
        }
    }

    pub(crate) fn resolved(outcome: StoreResult<()>) -> Self {
        let (_, receiver) = mpsc::channel();
        Self {
            receiver,
            outcome: Some(outcome),
        }
    }

    /// Returns the outcome if the write has finished, without blocking.
    pub fn try_outcome(&mut self) -> Option<&StoreResult<()>> {
        if self.outcome.is_none() {
            match self.receiver.try_recv() {
                Ok(outcome) => self.outcome = Some(outcome),
                Err(TryRecvError::Empty) => return None,
                Err(TryRecvError::Disconnected) => {
                    self.outcome = Some(Err(StoreError::WriterStopped));
                }
            }
        }
        self.outcome.as_ref()
    }

    /// Blocks until the write has finished.
    pub fn wait(mut self) -> StoreResult<()> {
        match self.outcome.take() {
            Some(outcome) => outcome,
            None => self
                .receiver
                .recv()
                .unwrap_or(Err(StoreError::WriterStopped)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{PersistHandle, PersistWriter};
    use crate::repo::kv_repo::{KvRepository, RepoError, RepoResult};
    use crate::repo::memory_kv::MemoryKvRepository;
    use crate::store::StoreError;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    #[derive(Default)]
    struct FlakyRepo {
        inner: MemoryKvRepository,
        failing: AtomicBool,
    }

    impl KvRepository for FlakyRepo {
        fn get(&self, key: &str) -> RepoResult<Option<String>> {
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> RepoResult<()> {
            if self.failing.load(Ordering::SeqCst) {
                return Err(RepoError::LockPoisoned);
            }
            self.inner.set(key, value)
        }
    }

    #[test]
    fn writes_are_applied_in_submission_order() {
        let repo = Arc::new(MemoryKvRepository::new());
        let writer = PersistWriter::spawn("notes", repo.clone());

        let handles: Vec<PersistHandle> = (0..50)
            .map(|n| writer.submit(format!("[{n}]")))
            .collect();
        writer.flush().unwrap();

        for handle in handles {
            handle.wait().unwrap();
        }
        assert_eq!(repo.get("notes").unwrap().as_deref(), Some("[49]"));
    }

    #[test]
    fn dropping_the_writer_drains_pending_writes() {
        let repo = Arc::new(MemoryKvRepository::new());
        let writer = PersistWriter::spawn("tasks", repo.clone());
        let _ = writer.submit("[\"last\"]".to_string());
        drop(writer);

        assert_eq!(repo.get("tasks").unwrap().as_deref(), Some("[\"last\"]"));
    }

    #[test]
    fn resolved_handle_reports_without_blocking() {
        let mut handle = PersistHandle::resolved(Err(StoreError::WriterStopped));
        assert!(matches!(
            handle.try_outcome(),
            Some(Err(StoreError::WriterStopped))
        ));
        assert!(matches!(handle.wait(), Err(StoreError::WriterStopped)));
    }

    #[test]
    fn flush_reports_the_latest_failed_write_until_a_write_succeeds() {
        let repo = Arc::new(FlakyRepo::default());
        let writer = PersistWriter::spawn("notes", repo.clone());

        repo.failing.store(true, Ordering::SeqCst);
        let _ = writer.submit("[1]".to_string());
        assert!(matches!(writer.flush(), Err(StoreError::StorageWrite(_))));
        // Still stale on a second flush with nothing queued.
        assert!(matches!(writer.flush(), Err(StoreError::StorageWrite(_))));
        assert_eq!(repo.get("notes").unwrap(), None);

        repo.failing.store(false, Ordering::SeqCst);
        let _ = writer.submit("[2]".to_string());
        writer.flush().unwrap();
        assert_eq!(repo.get("notes").unwrap().as_deref(), Some("[2]"));
    }
}
