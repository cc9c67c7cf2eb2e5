use std::path::PathBuf;

use clap::Parser;

#[derive(Parser)]
#[command(name = "sweepr")]
#[command(about = "Distributes reachability probes over a supervised worker pool.")]
pub struct CommandLine {
    /// Address spec file: one single address, CIDR block, or A-B range per line
    #[arg(short, long, default_value = "targets.txt")]
    pub file: PathBuf,

    /// Number of worker execution units
    #[arg(short, long, default_value_t = 100)]
    pub workers: usize,

    /// Concurrent probes per worker
    #[arg(short, long, default_value_t = 30)]
    pub concurrency: usize,

    /// File receiving addresses that answered a ping
    #[arg(long, default_value = "reachable.txt")]
    pub ping_results: PathBuf,

    /// File receiving address:port pairs that accepted a connection
    #[arg(long, default_value = "open_ports.txt")]
    pub connect_results: PathBuf,

    /// Persistent log file (log lines also go to stdout)
    #[arg(long, default_value = "sweepr.log")]
    pub log_file: PathBuf,
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
