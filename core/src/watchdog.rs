//! Liveness poller for the supervisor pool.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use anyhow::Context;
use tracing::debug;

use crate::supervisor::WorkerSupervisor;

pub const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Restarts any dead supervisor's worker until the stop flag is raised.
///
/// Purely liveness-driven: it knows nothing about queue depth or progress
/// and applies no restart rate limiting.
pub struct Watchdog {
    supervisors: Arc<Vec<WorkerSupervisor>>,
    stop: Arc<AtomicBool>,
    poll_interval: Duration,
}

impl Watchdog {
    pub fn new(supervisors: Arc<Vec<WorkerSupervisor>>, stop: Arc<AtomicBool>) -> Self {
        Self {
            supervisors,
            stop,
            poll_interval: POLL_INTERVAL,
        }
    }

    /// Shortened intervals are only interesting to tests.
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn spawn(self) -> anyhow::Result<thread::JoinHandle<()>> {
        thread::Builder::new()
            .name("watchdog".to_string())
            .spawn(move || self.run())
            .context("spawning watchdog thread")
    }

    fn run(self) {
        while !self.stop.load(Ordering::Relaxed) {
            for supervisor in self.supervisors.iter() {
                if !supervisor.is_alive() {
                    supervisor.restart();
                }
            }
            thread::sleep(self.poll_interval);
        }
        debug!("[watchdog] stop flag observed, exiting");
    }
}
