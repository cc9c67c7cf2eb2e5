//! Turns address-spec file content into ordered target groups and applies
//! percent sampling to the groups that allow it.

use std::net::IpAddr;

use rand::seq::IndexedRandom;
use tracing::warn;

use crate::network::target::TargetSpec;

/// Percent applied when the operator gives no (or an unusable) answer.
pub const DEFAULT_SAMPLE_PERCENT: u8 = 100;

/// Targets derived from one spec line, sharing the line as their label.
#[derive(Clone, Debug)]
pub struct TargetGroup {
    pub label: String,
    pub targets: Vec<IpAddr>,
    /// Groups from single-address lines are never sampled.
    pub sampleable: bool,
}

/// Parses spec-file content into ordered groups.
///
/// Blank lines are ignored. Lines that fail to parse, or that expand to
/// nothing, are skipped with a diagnostic; enumeration continues.
pub fn parse_groups(input: &str) -> Vec<TargetGroup> {
    let mut groups = Vec::new();

    for line in input.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let spec = match line.parse::<TargetSpec>() {
            Ok(spec) => spec,
            Err(e) => {
                warn!("skipping address spec '{line}': {e}");
                continue;
            }
        };

        let targets = spec.expand();
        if targets.is_empty() {
            warn!("skipping address spec '{line}': no usable hosts");
            continue;
        }

        groups.push(TargetGroup {
            label: line.to_string(),
            targets,
            sampleable: !spec.is_single(),
        });
    }

    groups
}

/// Applies `percent` to every sampleable group, selecting targets uniformly
/// at random without replacement and annotating the label. Unsampleable
/// groups pass through untouched.
pub fn apply_sampling(groups: Vec<TargetGroup>, percent: u8) -> Vec<TargetGroup> {
    let percent = percent.min(100);
    let mut rng = rand::rng();

    groups
        .into_iter()
        .map(|group| {
            if !group.sampleable {
                return group;
            }

            let TargetGroup {
                label,
                targets,
                sampleable,
            } = group;

            let total = targets.len();
            let keep = sample_size(total, percent);
            let targets = if keep == total {
                targets
            } else {
                targets.choose_multiple(&mut rng, keep).copied().collect()
            };

            TargetGroup {
                label: format!("{label} (sample {percent}%)"),
                targets,
                sampleable,
            }
        })
        .collect()
}

/// Sample-size law: `clamp(ceil(n * percent / 100), 1, n)`.
pub fn sample_size(n: usize, percent: u8) -> usize {
    if n == 0 {
        return 0;
    }
    (n * percent as usize).div_ceil(100).clamp(1, n)
}
