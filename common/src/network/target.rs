//! # Address Spec Model
//!
//! Defines the possible inputs for a probe run.
//!
//! This module handles parsing one line of an address-spec file, which can be:
//! * A single IP address (host).
//! * A CIDR block (e.g., `192.168.1.0/24`), expanded to its usable hosts.
//! * An inclusive IPv4 range (e.g., `10.0.0.1-10.0.0.50`).

use std::net::{IpAddr, Ipv4Addr};
use std::str::FromStr;

use ipnetwork::Ipv4Network;
use thiserror::Error;

use crate::network::range::Ipv4Range;

/// Widest range a single spec line may enumerate. Anything wider is rejected
/// outright to bound memory, never silently truncated.
pub const MAX_RANGE_SPAN: u32 = 65_536;

/// One parsed line of the address-spec file.
#[derive(Clone, Debug)]
pub enum TargetSpec {
    /// A single specific host.
    Host { target_addr: IpAddr },
    /// A CIDR block, expanded to usable hosts.
    Cidr { network: Ipv4Network },
    /// An inclusive range of IPv4 addresses.
    Range { ipv4_range: Ipv4Range },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TargetSpecError {
    #[error("invalid address '{0}'")]
    InvalidAddress(String),
    #[error("invalid CIDR block '{0}'")]
    InvalidCidr(String),
    #[error("invalid range '{0}'")]
    InvalidRange(String),
    #[error("range end {end} precedes start {start}")]
    RangeInverted { start: Ipv4Addr, end: Ipv4Addr },
    #[error("range {start}-{end} spans more than {} addresses", MAX_RANGE_SPAN)]
    RangeTooWide { start: Ipv4Addr, end: Ipv4Addr },
}

impl FromStr for TargetSpec {
    type Err = TargetSpecError;

    /// Parses a string into a `TargetSpec`.
    ///
    /// Supported formats:
    /// * **CIDR**: "Network/Prefix" (e.g., "192.168.1.0/24").
    /// * **Range**: "Start-End", both full IPv4 literals.
    /// * **Host**: a single IPv4/IPv6 address (e.g., "192.168.1.5").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        if s.contains('/') {
            return parse_cidr(s);
        }

        if s.contains('-') {
            return parse_range(s);
        }

        parse_host(s)
    }
}

impl TargetSpec {
    /// True for specs that came from a single-address line. These groups are
    /// never sampled.
    pub fn is_single(&self) -> bool {
        matches!(self, TargetSpec::Host { .. })
    }

    /// Expands the spec into concrete probe targets.
    ///
    /// A CIDR block of exactly one address maps to that address; larger
    /// blocks drop their network and broadcast addresses. The result may be
    /// empty (a /31 has no usable hosts) — callers treat that as a rejected
    /// line.
    pub fn expand(&self) -> Vec<IpAddr> {
        match self {
            TargetSpec::Host { target_addr } => vec![*target_addr],
            TargetSpec::Cidr { network } => expand_cidr(network),
            TargetSpec::Range { ipv4_range } => ipv4_range.to_iter().collect(),
        }
    }
}

fn expand_cidr(network: &Ipv4Network) -> Vec<IpAddr> {
    if network.size() == 1 {
        return vec![IpAddr::V4(network.network())];
    }

    let net_addr = network.network();
    let broadcast = network.broadcast();
    network
        .iter()
        .filter(|ip| *ip != net_addr && *ip != broadcast)
        .map(IpAddr::V4)
        .collect()
}

/// Parses a single IP address.
fn parse_host(s: &str) -> Result<TargetSpec, TargetSpecError> {
    s.parse::<IpAddr>()
        .map(|target_addr| TargetSpec::Host { target_addr })
        .map_err(|_| TargetSpecError::InvalidAddress(s.to_string()))
}

/// Parses CIDR notation like "192.168.1.0/24".
fn parse_cidr(s: &str) -> Result<TargetSpec, TargetSpecError> {
    let Some((ip_str, prefix_str)) = s.split_once('/') else {
        return Err(TargetSpecError::InvalidCidr(s.to_string()));
    };

    let ipv4_addr = ip_str
        .parse::<Ipv4Addr>()
        .map_err(|_| TargetSpecError::InvalidCidr(s.to_string()))?;

    let prefix = prefix_str
        .parse::<u8>()
        .map_err(|_| TargetSpecError::InvalidCidr(s.to_string()))?;

    let network = Ipv4Network::new(ipv4_addr, prefix)
        .map_err(|_| TargetSpecError::InvalidCidr(s.to_string()))?;

    Ok(TargetSpec::Cidr { network })
}

/// Parses a range string like "10.0.0.1-10.0.0.50".
fn parse_range(s: &str) -> Result<TargetSpec, TargetSpecError> {
    let Some((start_str, end_str)) = s.split_once('-') else {
        return Err(TargetSpecError::InvalidRange(s.to_string()));
    };

    let start = start_str
        .trim()
        .parse::<Ipv4Addr>()
        .map_err(|_| TargetSpecError::InvalidRange(s.to_string()))?;

    let end = end_str
        .trim()
        .parse::<Ipv4Addr>()
        .map_err(|_| TargetSpecError::InvalidRange(s.to_string()))?;

    if u32::from(end) < u32::from(start) {
        return Err(TargetSpecError::RangeInverted { start, end });
    }

    let ipv4_range = Ipv4Range::new(start, end);
    if ipv4_range.span() > MAX_RANGE_SPAN {
        return Err(TargetSpecError::RangeTooWide { start, end });
    }

    Ok(TargetSpec::Range { ipv4_range })
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
