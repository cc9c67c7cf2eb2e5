//! Round-robin dispatch and the drain-then-stop shutdown protocol.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, info};

use sweepr_common::network::sample::TargetGroup;

use crate::queue::{QueueItem, TaskQueue};
use crate::supervisor::WorkerSupervisor;

/// Feeds every enumerated target to the pool, drains it, then shuts it down.
///
/// Targets are assigned by a 1-based running counter across all groups:
/// target `i` goes to `supervisors[i % W]`. Once every queue has drained its
/// backlog, each queue receives exactly `concurrency` shutdown sentinels and
/// the watchdog is signalled to stop. Sentinels are never enqueued before the
/// drain barrier, so they cannot race outstanding work.
///
/// Returns the number of targets dispatched.
pub async fn dispatch(
    groups: &[TargetGroup],
    supervisors: &[WorkerSupervisor],
    watchdog_stop: &AtomicBool,
) -> usize {
    assert!(
        !supervisors.is_empty(),
        "dispatch requires at least one worker"
    );

    let mut index: usize = 1;
    for group in groups {
        debug!(
            "dispatching group '{}' ({} targets)",
            group.label,
            group.targets.len()
        );
        for &target in &group.targets {
            supervisors[index % supervisors.len()]
                .queue()
                .push(QueueItem::Task(target));
            index += 1;
        }
    }

    let dispatched = index - 1;
    info!("{dispatched} targets enqueued, waiting for the pool to drain");
    for supervisor in supervisors {
        supervisor.queue().wait_idle().await;
    }

    // Capture the live queues once: every sentinel batch and the final wait
    // must address the same worker generation.
    let queues: Vec<Arc<TaskQueue>> = supervisors.iter().map(|s| s.queue()).collect();
    for (supervisor, queue) in supervisors.iter().zip(&queues) {
        for _ in 0..supervisor.concurrency() {
            queue.push(QueueItem::Shutdown);
        }
    }
    watchdog_stop.store(true, Ordering::Relaxed);

    for queue in &queues {
        queue.wait_idle().await;
    }
    info!("all workers drained and stopped");

    dispatched
}
