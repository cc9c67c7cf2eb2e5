//! End-to-end: spec-file content through enumeration, sampling, dispatch and
//! the full drain-then-stop shutdown.

use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use sweepr_common::network::sample;
use sweepr_core::dispatch;
use sweepr_core::supervisor::WorkerSupervisor;

use crate::support::{RecordingProbe, target};

#[tokio::test]
async fn five_target_scenario_probes_every_target_once() {
    let input = "10.0.0.1\n\n10.0.0.0/30\n10.0.0.5-10.0.0.6\n";

    let groups = sample::apply_sampling(sample::parse_groups(input), 100);
    let total: usize = groups.iter().map(|g| g.targets.len()).sum();
    assert_eq!(total, 5, "1 single + 2 usable /30 hosts + 2 range addresses");

    let probe = Arc::new(RecordingProbe::new());
    let supervisors: Vec<WorkerSupervisor> = (1..=2)
        .map(|id| WorkerSupervisor::new(id, 4, probe.clone()))
        .collect();
    for supervisor in &supervisors {
        supervisor.start().unwrap();
    }

    let stop = AtomicBool::new(false);
    let dispatched = dispatch::dispatch(&groups, &supervisors, &stop).await;
    assert_eq!(dispatched, 5);

    // 10.0.0.1 appears twice: once as the single line, once as a usable
    // host of the /30. Each enqueued target is probed exactly once.
    let mut counts: HashMap<IpAddr, usize> = HashMap::new();
    for (_, probed) in probe.seen.lock().unwrap().iter() {
        *counts.entry(*probed).or_default() += 1;
    }
    assert_eq!(counts.get(&target(1)), Some(&2));
    assert_eq!(counts.get(&target(2)), Some(&1));
    assert_eq!(counts.get(&target(5)), Some(&1));
    assert_eq!(counts.get(&target(6)), Some(&1));
    assert_eq!(counts.values().sum::<usize>(), 5);
}

#[tokio::test]
async fn sampled_ranges_shrink_before_dispatch() {
    let input = "10.0.1.0/28\n10.0.0.99\n";

    let groups = sample::apply_sampling(sample::parse_groups(input), 50);

    // The /28 has 14 usable hosts, sampled down to 7; the single host is
    // immune to sampling.
    assert_eq!(groups[0].targets.len(), 7);
    assert_eq!(groups[0].label, "10.0.1.0/28 (sample 50%)");
    assert_eq!(groups[1].targets.len(), 1);
    assert_eq!(groups[1].label, "10.0.0.99");

    let probe = Arc::new(RecordingProbe::new());
    let supervisors: Vec<WorkerSupervisor> = (1..=3)
        .map(|id| WorkerSupervisor::new(id, 2, probe.clone()))
        .collect();
    for supervisor in &supervisors {
        supervisor.start().unwrap();
    }

    let stop = AtomicBool::new(false);
    let dispatched = dispatch::dispatch(&groups, &supervisors, &stop).await;
    assert_eq!(dispatched, 8);
    assert_eq!(probe.seen.lock().unwrap().len(), 8);
}
