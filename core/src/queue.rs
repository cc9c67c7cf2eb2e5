//! Per-worker task queue.
//!
//! An unbounded FIFO shared by one producer (the dispatcher) and a worker's
//! consumer loops. Beyond enqueue/dequeue it tracks acknowledgments: every
//! pushed item must be `task_done`-acknowledged exactly once, and
//! [`TaskQueue::wait_idle`] is the drain barrier that resolves when the
//! count of unacknowledged items reaches zero.

use std::collections::VecDeque;
use std::net::IpAddr;
use std::sync::Mutex;

use tokio::sync::{Semaphore, watch};

/// A unit of work delivered to one consumer slot.
///
/// `Shutdown` is the stop sentinel: it is matched by tag, carries no payload,
/// and terminates exactly one consumer loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueItem {
    Task(IpAddr),
    Shutdown,
}

pub struct TaskQueue {
    items: Mutex<VecDeque<QueueItem>>,
    /// One permit per queued item; `pop` suspends on it without blocking the
    /// thread, so sibling consumer loops keep running.
    ready: Semaphore,
    /// Count of pushed-but-unacknowledged items, observable by waiters.
    pending: watch::Sender<usize>,
}

impl TaskQueue {
    pub fn new() -> Self {
        let (pending, _) = watch::channel(0);
        Self {
            items: Mutex::new(VecDeque::new()),
            ready: Semaphore::new(0),
            pending,
        }
    }

    /// Enqueues one item. Never blocks.
    ///
    /// The pending count rises before the item becomes visible, so a
    /// consumer can never acknowledge an item the barrier has not counted.
    pub fn push(&self, item: QueueItem) {
        self.pending.send_modify(|n| *n += 1);
        self.items
            .lock()
            .expect("task queue poisoned")
            .push_back(item);
        self.ready.add_permits(1);
    }

    /// Dequeues the next item in FIFO order, suspending until one arrives.
    pub async fn pop(&self) -> QueueItem {
        let permit = self
            .ready
            .acquire()
            .await
            .expect("task queue semaphore closed");
        permit.forget();
        self.items
            .lock()
            .expect("task queue poisoned")
            .pop_front()
            .expect("queue permit issued without a queued item")
    }

    /// Acknowledges completion of one previously popped item.
    pub fn task_done(&self) {
        self.pending.send_modify(|n| {
            *n = n
                .checked_sub(1)
                .expect("task_done called without a matching push");
        });
    }

    /// Drain barrier: resolves once every item ever pushed has been
    /// acknowledged.
    pub async fn wait_idle(&self) {
        let mut rx = self.pending.subscribe();
        while *rx.borrow_and_update() != 0 {
            if rx.changed().await.is_err() {
                break;
            }
        }
    }

    pub fn len(&self) -> usize {
        self.items.lock().expect("task queue poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for TaskQueue {
    fn default() -> Self {
        Self::new()
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
