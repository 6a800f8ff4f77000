// Karma aggregator
//
// Credits content rank back to stakeholders through the ownership mapping:
//
//   karma[u] = Σ_{i owned by u} share(i) * rank[i]      (optionally * stake[u])
//
// share(i) depends on the fan-out policy:
//   Full  -> 1                      every owner is credited the whole rank
//   Split -> 1 / owners(i)          rank is divided evenly between owners
//
// The output has one slot per stakeholder. It is never the same length as
// the content vectors by construction, only by coincidence.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::errors::{ensure_len, RankResult};
use crate::ownership::OwnershipMap;

/// How a content node owned by several stakeholders is credited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OwnerFanOut {
    /// Each owner receives the node's full rank.
    #[default]
    Full,
    /// The node's rank is split evenly across its owners.
    Split,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct KarmaPolicy {
    pub fan_out: OwnerFanOut,
    /// Multiply each stakeholder's sum by its stake.
    pub scale_by_stake: bool,
}

/// Karma for every stakeholder.
///
/// # Errors
/// - `MalformedGraph` if `stakes` isn't one value per stakeholder or `rank`
///   isn't one value per content node of the mapping
pub fn compute_karma(
    ownership: &OwnershipMap,
    stakes: &[u64],
    rank: &[f64],
    policy: &KarmaPolicy,
) -> RankResult<Vec<f64>> {
    ensure_len("stake array", stakes.len(), ownership.num_stakeholders())?;
    ensure_len("rank vector", rank.len(), ownership.num_content())?;

    let owner_counts = match policy.fan_out {
        OwnerFanOut::Full => None,
        OwnerFanOut::Split => Some(ownership.owner_counts()),
    };

    Ok((0..ownership.num_stakeholders())
        .into_par_iter()
        .map(|stakeholder| {
            let sum: f64 = ownership
                .owned_by(stakeholder)
                .iter()
                .map(|&content| {
                    let content = content as usize;
                    match &owner_counts {
                        // content is owned by at least this stakeholder
                        Some(counts) => rank[content] / counts[content] as f64,
                        None => rank[content],
                    }
                })
                .sum();
            if policy.scale_by_stake {
                sum * stakes[stakeholder] as f64
            } else {
                sum
            }
        })
        .collect())
}
