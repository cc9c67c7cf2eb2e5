//! The capability boundary between the worker pool and whatever actually
//! probes a target.
//!
//! High-level modules depend on this abstraction rather than on a concrete
//! probe, so the pool can drive any probing strategy (and tests can drive
//! the pool with recording stubs).

use std::net::IpAddr;

use async_trait::async_trait;

/// Probes one target. Failure is reported through the error result; the
/// consumer loop logs it and moves on, so implementations never need to
/// swallow their own errors.
#[async_trait]
pub trait ProbeHandler: Send + Sync {
    async fn handle(&self, target: IpAddr) -> anyhow::Result<()>;
}
