mod commands;
mod terminal;

use std::fs;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use anyhow::{Context, ensure};
use tracing::{info, warn};

use commands::CommandLine;
use sweepr_common::network::sample::{self, DEFAULT_SAMPLE_PERCENT};
use sweepr_common::probe::ProbeHandler;
use sweepr_common::utils::timing::RunTimer;
use sweepr_core::dispatch;
use sweepr_core::supervisor::WorkerSupervisor;
use sweepr_core::watchdog::Watchdog;
use sweepr_probes::reachability::ReachabilityProbe;
use terminal::{logging, prompt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CommandLine::parse_args();
    logging::init(&cli.log_file);

    ensure!(cli.workers >= 1, "at least one worker is required");
    ensure!(cli.concurrency >= 1, "concurrency must be at least 1");

    let mut timer = RunTimer::new();
    timer.start();

    // A missing spec file is fatal: there is nothing to probe.
    let input = fs::read_to_string(&cli.file)
        .with_context(|| format!("reading address spec file {}", cli.file.display()))?;

    let groups = sample::parse_groups(&input);
    if groups.is_empty() {
        warn!("no usable address specs in {}", cli.file.display());
        return Ok(());
    }

    let percent = if groups.iter().any(|group| group.sampleable) {
        prompt::ask_sample_percent()
    } else {
        info!("address list holds only single hosts, sampling skipped");
        DEFAULT_SAMPLE_PERCENT
    };
    let groups = sample::apply_sampling(groups, percent);

    let total: usize = groups.iter().map(|group| group.targets.len()).sum();
    info!(
        "probing {total} targets across {} workers ({} probes each)",
        cli.workers, cli.concurrency
    );

    let handler: Arc<dyn ProbeHandler> =
        Arc::new(ReachabilityProbe::open(&cli.ping_results, &cli.connect_results)?);

    let supervisors: Vec<WorkerSupervisor> = (1..=cli.workers)
        .map(|id| WorkerSupervisor::new(id, cli.concurrency, Arc::clone(&handler)))
        .collect();
    for supervisor in &supervisors {
        supervisor.start()?;
    }
    let supervisors = Arc::new(supervisors);

    let stop = Arc::new(AtomicBool::new(false));
    let watchdog = Watchdog::new(Arc::clone(&supervisors), Arc::clone(&stop)).spawn()?;

    let dispatched = dispatch::dispatch(&groups, &supervisors, &stop).await;

    if watchdog.join().is_err() {
        warn!("watchdog thread exited abnormally");
    }

    timer.stop();
    info!(
        "finished: {dispatched} probes dispatched in {}",
        timer.report()
    );
    Ok(())
}
