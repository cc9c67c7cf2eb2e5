//! Supervision, dispatch and shutdown behavior of the worker pool.

use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

use sweepr_common::network::sample::TargetGroup;
use sweepr_core::dispatch;
use sweepr_core::queue::QueueItem;
use sweepr_core::supervisor::WorkerSupervisor;
use sweepr_core::watchdog::Watchdog;

use crate::support::{AlwaysFailingProbe, RecordingProbe, target};

fn group(targets: Vec<std::net::IpAddr>) -> TargetGroup {
    TargetGroup {
        label: "pool-test".to_string(),
        targets,
        sampleable: true,
    }
}

async fn wait_until(mut condition: impl FnMut() -> bool, deadline: Duration) -> bool {
    let started = std::time::Instant::now();
    while started.elapsed() < deadline {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    condition()
}

#[tokio::test]
async fn round_robin_assignment_is_one_based() {
    let probe = Arc::new(RecordingProbe::new());
    let supervisors: Vec<WorkerSupervisor> = (1..=3)
        .map(|id| WorkerSupervisor::new(id, 2, probe.clone()))
        .collect();
    for supervisor in &supervisors {
        supervisor.start().unwrap();
    }

    let groups = vec![group((1..=6).map(target).collect())];
    let stop = AtomicBool::new(false);
    let dispatched = dispatch::dispatch(&groups, &supervisors, &stop).await;
    assert_eq!(dispatched, 6);

    // Running index i starts at 1; target i lands on supervisors[i % 3],
    // whose ids are 1..=3 in order.
    let by_worker = |name: &str| {
        let mut seen = probe.targets_seen_by(name);
        seen.sort();
        seen
    };
    assert_eq!(by_worker("worker-2"), vec![target(1), target(4)]);
    assert_eq!(by_worker("worker-3"), vec![target(2), target(5)]);
    assert_eq!(by_worker("worker-1"), vec![target(3), target(6)]);
}

#[tokio::test]
async fn dispatch_returns_only_after_every_probe_completes() {
    let probe = Arc::new(RecordingProbe::with_delay(Duration::from_millis(30)));
    let supervisors: Vec<WorkerSupervisor> = (1..=2)
        .map(|id| WorkerSupervisor::new(id, 3, probe.clone()))
        .collect();
    for supervisor in &supervisors {
        supervisor.start().unwrap();
    }

    let groups = vec![group((1..=12).map(target).collect())];
    let stop = AtomicBool::new(false);
    let dispatched = dispatch::dispatch(&groups, &supervisors, &stop).await;

    assert_eq!(dispatched, 12);
    assert_eq!(probe.seen.lock().unwrap().len(), 12);
    assert!(stop.load(std::sync::atomic::Ordering::Relaxed));
}

#[tokio::test]
async fn per_target_failures_do_not_stall_the_run() {
    let probe = Arc::new(AlwaysFailingProbe);
    let supervisors: Vec<WorkerSupervisor> = (1..=2)
        .map(|id| WorkerSupervisor::new(id, 2, probe.clone()))
        .collect();
    for supervisor in &supervisors {
        supervisor.start().unwrap();
    }

    let groups = vec![group((1..=8).map(target).collect())];
    let stop = AtomicBool::new(false);
    let dispatched = dispatch::dispatch(&groups, &supervisors, &stop).await;

    // Every failure was swallowed and acknowledged, so the drain-then-stop
    // protocol ran to completion.
    assert_eq!(dispatched, 8);
}

#[tokio::test]
async fn watchdog_replaces_a_dead_worker_and_abandons_its_queue() {
    let probe = Arc::new(RecordingProbe::new());
    let supervisors = Arc::new(vec![WorkerSupervisor::new(1, 2, probe.clone())]);
    let supervisor = &supervisors[0];
    supervisor.start().unwrap();
    let first_queue = supervisor.queue();

    // Kill the worker by feeding it its full sentinel allotment, then park
    // two targets behind the sentinels. The loops exit before reaching them.
    first_queue.push(QueueItem::Shutdown);
    first_queue.push(QueueItem::Shutdown);
    first_queue.push(QueueItem::Task(target(1)));
    first_queue.push(QueueItem::Task(target(2)));

    assert!(
        wait_until(|| !supervisor.is_alive(), Duration::from_secs(5)).await,
        "worker never exited"
    );

    let stop = Arc::new(AtomicBool::new(false));
    let watchdog = Watchdog::new(Arc::clone(&supervisors), Arc::clone(&stop))
        .with_poll_interval(Duration::from_millis(50))
        .spawn()
        .unwrap();

    assert!(
        wait_until(|| supervisors[0].is_alive(), Duration::from_secs(5)).await,
        "watchdog never restarted the worker"
    );

    // Same supervisor id and concurrency, but a brand new queue: the
    // abandoned targets are never retried.
    let second_queue = supervisors[0].queue();
    assert!(!Arc::ptr_eq(&first_queue, &second_queue));
    assert!(second_queue.is_empty());
    assert_eq!(first_queue.len(), 2);
    assert!(probe.seen.lock().unwrap().is_empty());

    stop.store(true, std::sync::atomic::Ordering::Relaxed);
    watchdog.join().unwrap();
}
