//! Live Worker Set
//!
//! The collection of currently known workers shared between a discovery listener
//! (which inserts) and a driver (which snapshots and evicts).

use super::types::WorkerAddr;

use tokio::sync::watch;

/// Ordered set of worker addresses. Insertion order is kept so that round-robin
/// assignment over a snapshot is deterministic.
#[derive(Debug)]
pub struct WorkerSet {
    workers: watch::Sender<Vec<WorkerAddr>>,
}

impl WorkerSet {
    pub fn new() -> Self {
        let (workers, _) = watch::channel(Vec::new());
        Self { workers }
    }

    pub fn from_workers(initial: impl IntoIterator<Item = WorkerAddr>) -> Self {
        let set = Self::new();
        for worker in initial {
            set.insert(worker);
        }
        set
    }

    /// Adds a worker. Returns `false` when it was already known.
    pub fn insert(&self, worker: WorkerAddr) -> bool {
        self.workers.send_if_modified(|workers| {
            if workers.contains(&worker) {
                return false;
            }
            workers.push(worker);
            true
        })
    }

    /// Evicts a worker. Returns `false` when it was not in the set.
    pub fn remove(&self, worker: &WorkerAddr) -> bool {
        self.workers.send_if_modified(|workers| {
            match workers.iter().position(|w| w == worker) {
                Some(idx) => {
                    workers.remove(idx);
                    true
                }
                None => false,
            }
        })
    }

    pub fn snapshot(&self) -> Vec<WorkerAddr> {
        self.workers.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.workers.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.workers.borrow().is_empty()
    }

    /// Waits until at least one worker is known.
    pub async fn wait_ready(&self) {
        let mut rx = self.workers.subscribe();
        // The sender lives in `self`, so the channel cannot close while we wait.
        let _ = rx.wait_for(|workers| !workers.is_empty()).await;
    }
}

impl Default for WorkerSet {
    fn default() -> Self {
        Self::new()
    }
}
