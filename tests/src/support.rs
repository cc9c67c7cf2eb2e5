//! Probe stubs shared by the integration tests.

use std::net::{IpAddr, Ipv4Addr};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use sweepr_common::probe::ProbeHandler;

pub fn target(d: u8) -> IpAddr {
    IpAddr::V4(Ipv4Addr::new(10, 0, 0, d))
}

/// Records every handled target together with the serving worker thread.
pub struct RecordingProbe {
    pub seen: Mutex<Vec<(String, IpAddr)>>,
    pub delay: Duration,
}

impl RecordingProbe {
    pub fn new() -> Self {
        Self::with_delay(Duration::ZERO)
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self {
            seen: Mutex::new(Vec::new()),
            delay,
        }
    }

    pub fn targets_seen_by(&self, thread: &str) -> Vec<IpAddr> {
        self.seen
            .lock()
            .unwrap()
            .iter()
            .filter(|(name, _)| name == thread)
            .map(|(_, target)| *target)
            .collect()
    }
}

#[async_trait]
impl ProbeHandler for RecordingProbe {
    async fn handle(&self, target: IpAddr) -> anyhow::Result<()> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let thread = std::thread::current()
            .name()
            .unwrap_or("unnamed")
            .to_string();
        self.seen.lock().unwrap().push((thread, target));
        Ok(())
    }
}

/// Fails every probe.
pub struct AlwaysFailingProbe;

#[async_trait]
impl ProbeHandler for AlwaysFailingProbe {
    async fn handle(&self, target: IpAddr) -> anyhow::Result<()> {
        anyhow::bail!("no route to {target}")
    }
}
