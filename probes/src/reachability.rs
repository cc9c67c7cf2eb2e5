//! The reference probe: an ICMP ping and a fixed-port TCP connect sweep,
//! run concurrently against each target.

use std::net::{IpAddr, SocketAddr};
use std::path::Path;
use std::process::Stdio;
use std::time::{Duration, Instant};

use anyhow::Context;
use async_trait::async_trait;
use rand::Rng;
use tokio::net::TcpStream;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::info;

use sweepr_common::probe::ProbeHandler;

use crate::sink::ResultSink;

const PROBE_PORTS: [u16; 6] = [13, 22, 23, 80, 443, 3389];
const CONNECT_TIMEOUT: Duration = Duration::from_secs(1);
const PING_DEADLINE_SECS: u32 = 5;
/// Spreads probe start times so a freshly filled pool does not burst.
const MAX_START_JITTER_MS: u64 = 1_000;

pub struct ReachabilityProbe {
    ping_sink: ResultSink,
    connect_sink: ResultSink,
}

impl ReachabilityProbe {
    /// Opens both result artifacts up front so a bad path fails the run
    /// before any worker starts.
    pub fn open(ping_results: &Path, connect_results: &Path) -> anyhow::Result<Self> {
        Ok(Self {
            ping_sink: ResultSink::open(ping_results)?,
            connect_sink: ResultSink::open(connect_results)?,
        })
    }

    async fn icmp_probe(&self, target: IpAddr) -> anyhow::Result<()> {
        start_jitter().await;

        let status = Command::new("ping")
            .arg("-c")
            .arg("2")
            .arg("-w")
            .arg(PING_DEADLINE_SECS.to_string())
            .arg(target.to_string())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .context("running ping")?;

        if status.success() {
            self.ping_sink
                .record(&target.to_string())
                .context("recording ping result")?;
            info!("reachable via icmp: {target}");
        }
        Ok(())
    }

    async fn connect_sweep(&self, target: IpAddr) -> anyhow::Result<()> {
        start_jitter().await;

        for port in PROBE_PORTS {
            let socket_addr = SocketAddr::new(target, port);
            match timeout(CONNECT_TIMEOUT, TcpStream::connect(socket_addr)).await {
                Ok(Ok(_stream)) => {
                    self.connect_sink
                        .record(&format!("{target}:{port}"))
                        .context("recording connect result")?;
                    info!("accepted connection: {target}:{port}");
                }
                Ok(Err(_)) | Err(_) => {}
            }
        }
        Ok(())
    }
}

#[async_trait]
impl ProbeHandler for ReachabilityProbe {
    async fn handle(&self, target: IpAddr) -> anyhow::Result<()> {
        let started = Instant::now();

        let (icmp, connect) = tokio::join!(self.icmp_probe(target), self.connect_sweep(target));
        icmp?;
        connect?;

        info!(
            "probe of {target} finished in {:.2}s",
            started.elapsed().as_secs_f64()
        );
        Ok(())
    }
}

async fn start_jitter() {
    // ThreadRng is not Send, so it must not live across the await.
    let delay = { rand::rng().random_range(0..MAX_START_JITTER_MS) };
    tokio::time::sleep(Duration::from_millis(delay)).await;
}
