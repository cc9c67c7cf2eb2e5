use std::io::{self, Write};

use sweepr_common::network::sample::DEFAULT_SAMPLE_PERCENT;

/// Asks the operator what percent of each range to probe.
///
/// Empty or unusable answers fall back to the default; numeric answers are
/// clamped into [0, 100].
pub fn ask_sample_percent() -> u8 {
    print!("Percent of each address range to probe (0-100) [{DEFAULT_SAMPLE_PERCENT}]: ");
    if io::stdout().flush().is_err() {
        return DEFAULT_SAMPLE_PERCENT;
    }

    let mut line = String::new();
    match io::stdin().read_line(&mut line) {
        Ok(_) => parse_percent(&line),
        Err(_) => DEFAULT_SAMPLE_PERCENT,
    }
}

fn parse_percent(raw: &str) -> u8 {
    let raw = raw.trim();
    if raw.is_empty() {
        return DEFAULT_SAMPLE_PERCENT;
    }
    raw.parse::<i64>()
        .map(|value| value.clamp(0, 100) as u8)
        .unwrap_or(DEFAULT_SAMPLE_PERCENT)
}
