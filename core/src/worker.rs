//! Bounded-concurrency consumer loops over one task queue.

use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, info};

use sweepr_common::probe::ProbeHandler;

use crate::queue::{QueueItem, TaskQueue};

/// Consumes one queue with exactly `concurrency` concurrent probe slots.
///
/// A worker runs until it has consumed one [`QueueItem::Shutdown`] per
/// consumer loop. It is discarded, never reused, when its supervisor
/// replaces it.
pub struct Worker {
    id: usize,
    concurrency: usize,
    queue: Arc<TaskQueue>,
    handler: Arc<dyn ProbeHandler>,
}

impl Worker {
    pub fn new(id: usize, concurrency: usize, handler: Arc<dyn ProbeHandler>) -> Self {
        Self {
            id,
            concurrency,
            queue: Arc::new(TaskQueue::new()),
            handler,
        }
    }

    pub fn queue(&self) -> Arc<TaskQueue> {
        Arc::clone(&self.queue)
    }

    /// Runs the worker for its full lifetime.
    ///
    /// Launches exactly `concurrency` consumer loops sharing a gate of the
    /// same capacity. The gate exists on top of the loop count because a
    /// handler invocation may fan out internally; a permit is held for the
    /// whole invocation, bounding total concurrent invocations.
    pub async fn run(self) {
        info!(
            "[worker-{}] consuming with {} probe slots",
            self.id, self.concurrency
        );

        let concurrency = self.concurrency;
        let gate = Arc::new(Semaphore::new(concurrency));
        let worker = Arc::new(self);

        let mut loops = JoinSet::new();
        for _ in 0..concurrency {
            loops.spawn(Arc::clone(&worker).consume(Arc::clone(&gate)));
        }

        while let Some(joined) = loops.join_next().await {
            if let Err(e) = joined {
                error!("[worker-{}] consumer loop aborted: {e}", worker.id);
            }
        }

        debug!("[worker-{}] all consumer loops finished", worker.id);
    }

    async fn consume(self: Arc<Self>, gate: Arc<Semaphore>) {
        loop {
            match self.queue.pop().await {
                QueueItem::Shutdown => {
                    self.queue.task_done();
                    break;
                }
                QueueItem::Task(target) => {
                    let _slot = gate.acquire().await.expect("concurrency gate closed");
                    if let Err(e) = self.handler.handle(target).await {
                        error!("[worker-{}] probe of {target} failed: {e:#}", self.id);
                    }
                    self.queue.task_done();
                }
            }
        }
    }
}
