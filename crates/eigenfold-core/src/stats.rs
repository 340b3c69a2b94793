//! Statistics over measured probability distributions.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{FoldError, FoldResult};

/// Probabilities at or below this are treated as zero.
pub const PROBABILITY_FLOOR: f64 = 1e-12;

/// Shannon entropy in bits, ignoring probabilities at or below
/// [`PROBABILITY_FLOOR`].
pub fn shannon_entropy(probabilities: impl IntoIterator<Item = f64>) -> f64 {
    let h: f64 = probabilities
        .into_iter()
        .filter(|&p| p > PROBABILITY_FLOOR)
        .map(|p| -p * p.log2())
        .sum();
    // -0.0 for a point mass
    h.max(0.0)
}

/// Summary of a bitstring → probability distribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionSummary {
    /// Most probable bitstring.
    pub dominant_state: String,
    /// Its probability.
    pub dominant_p: f64,
    /// Shannon entropy of the full distribution, in bits.
    pub entropy: f64,
    /// States above the stability threshold, most probable first.
    pub stable: Vec<(String, f64)>,
    /// Total probability of the stable states.
    pub stable_p_sum: f64,
    /// Mean probability of the stable states; 0 when there are none.
    pub avg_p: f64,
}

impl DistributionSummary {
    /// Number of stable states.
    pub fn n_stable(&self) -> usize {
        self.stable.len()
    }
}

/// Sort states by descending probability, ties broken by bitstring.
fn ranked(distribution: &BTreeMap<String, f64>) -> Vec<(String, f64)> {
    let mut states: Vec<(String, f64)> = distribution
        .iter()
        .map(|(s, &p)| (s.clone(), p))
        .collect();
    states.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    states
}

/// Summarize a distribution, treating states with probability strictly above
/// `threshold` as stable.
pub fn summarize(
    distribution: &BTreeMap<String, f64>,
    threshold: f64,
) -> FoldResult<DistributionSummary> {
    if distribution.is_empty() {
        return Err(FoldError::EmptyDistribution);
    }
    if let Some((state, p)) = distribution
        .iter()
        .find(|(_, p)| !p.is_finite() || **p < 0.0)
    {
        return Err(FoldError::DegenerateDistribution(format!(
            "state {state} has probability {p}"
        )));
    }
    let total: f64 = distribution.values().sum();
    if total <= PROBABILITY_FLOOR {
        return Err(FoldError::DegenerateDistribution(format!(
            "total probability mass is {total}"
        )));
    }

    let states = ranked(distribution);
    let (dominant_state, dominant_p) = states[0].clone();
    let stable: Vec<(String, f64)> = states.into_iter().filter(|(_, p)| *p > threshold).collect();
    let stable_p_sum: f64 = stable.iter().map(|(_, p)| p).sum();
    let avg_p = if stable.is_empty() {
        0.0
    } else {
        stable_p_sum / stable.len() as f64
    };

    Ok(DistributionSummary {
        dominant_state,
        dominant_p,
        entropy: shannon_entropy(distribution.values().copied()),
        stable,
        stable_p_sum,
        avg_p,
    })
}
