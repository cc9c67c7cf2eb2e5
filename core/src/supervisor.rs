//! Lifecycle owner of one worker.
//!
//! A supervisor lives for the whole process and owns exactly one live
//! [`Worker`] plus the OS thread driving it. Recovery is crash-only: a
//! restart builds a fresh worker with a fresh queue and abandons whatever the
//! dead one held. Nothing is retried.

use std::sync::{Arc, Mutex};
use std::thread;

use anyhow::Context;
use tracing::{error, info, warn};

use sweepr_common::probe::ProbeHandler;

use crate::queue::TaskQueue;
use crate::worker::Worker;

struct WorkerCell {
    queue: Arc<TaskQueue>,
    thread: thread::JoinHandle<()>,
}

pub struct WorkerSupervisor {
    id: usize,
    concurrency: usize,
    handler: Arc<dyn ProbeHandler>,
    cell: Mutex<Option<WorkerCell>>,
}

impl WorkerSupervisor {
    pub fn new(id: usize, concurrency: usize, handler: Arc<dyn ProbeHandler>) -> Self {
        Self {
            id,
            concurrency,
            handler,
            cell: Mutex::new(None),
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Launches a fresh worker on a fresh thread, replacing any previous one.
    ///
    /// The worker gets its own current-thread runtime so its consumer loops
    /// schedule cooperatively without touching the caller's runtime.
    pub fn start(&self) -> anyhow::Result<()> {
        let worker = Worker::new(self.id, self.concurrency, Arc::clone(&self.handler));
        let queue = worker.queue();

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .with_context(|| format!("building runtime for worker-{}", self.id))?;

        let thread = thread::Builder::new()
            .name(format!("worker-{}", self.id))
            .spawn(move || runtime.block_on(worker.run()))
            .with_context(|| format!("spawning thread for worker-{}", self.id))?;

        *self.cell.lock().expect("supervisor cell poisoned") = Some(WorkerCell { queue, thread });
        info!(
            "[supervisor] worker-{} started (concurrency {})",
            self.id, self.concurrency
        );
        Ok(())
    }

    /// Whether the current worker's thread is still running.
    pub fn is_alive(&self) -> bool {
        self.cell
            .lock()
            .expect("supervisor cell poisoned")
            .as_ref()
            .is_some_and(|cell| !cell.thread.is_finished())
    }

    /// Unconditionally replaces the worker, discarding the dead one's queue.
    pub fn restart(&self) {
        warn!("[supervisor] restarting worker-{}", self.id);
        if let Err(e) = self.start() {
            error!("[supervisor] failed to restart worker-{}: {e:#}", self.id);
        }
    }

    /// Handle to the *current* worker's queue. Panics if the supervisor was
    /// never started.
    pub fn queue(&self) -> Arc<TaskQueue> {
        self.cell
            .lock()
            .expect("supervisor cell poisoned")
            .as_ref()
            .map(|cell| Arc::clone(&cell.queue))
            .expect("supervisor queried before start()")
    }
}
