//! QUBO construction for the binary-encoded HP lattice model.
//!
//! Each residue's occupied site is the integer `v_r = Σ_k 2^k · b(r, k)`
//! over its variable block. Pairwise terms are built from the squared
//! difference `D(i, j) = (v_i - v_j)^2`, expanded with `b^2 = b`:
//!
//! ```text
//! D(i, j) = Σ_k w_k² b_ik + Σ_{k<l} 2 w_k w_l b_ik b_il
//!         + Σ_k w_k² b_jk + Σ_{k<l} 2 w_k w_l b_jk b_jl
//!         - Σ_k Σ_l 2 w_k w_l b_ik b_jl
//! ```
//!
//! Three groups share one accumulator:
//!
//! | group     | pairs                               | contribution          |
//! |-----------|-------------------------------------|-----------------------|
//! | collision | non-bonded `i < j`                  | `+B (M² - D)`         |
//! | chain     | bonded `(r, r + 1)`                 | `+C D`                |
//! | contact   | non-bonded hydrophobic `i < j`      | `-A (M² - D)`         |
//!
//! with `M` the largest encodable block value. `M² - D` is non-negative and
//! largest when the two encoded values coincide. Bonded pairs never receive a
//! collision term, so the collision and chain groups cannot cancel.
//!
//! The squared difference is an approximation: under this encoding the chain
//! term pulls bonded residues toward *equal* encoded values rather than toward
//! adjacent lattice sites.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{FoldError, FoldResult};
use crate::lattice::Adjacency;
use crate::layout::VariableLayout;

/// Largest variable count accepted by brute-force enumeration.
pub const BRUTE_FORCE_LIMIT: usize = 20;

/// Penalty and reward strengths.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PenaltyWeights {
    /// Hydrophobic contact reward strength (A).
    pub contact: f64,
    /// Collision penalty strength (B).
    pub collision: f64,
    /// Chain connectivity strength (C).
    pub chain: f64,
}

impl Default for PenaltyWeights {
    fn default() -> Self {
        Self {
            contact: 5.0,
            collision: 500.0,
            chain: 5.0,
        }
    }
}

impl PenaltyWeights {
    /// Create weights from `(A, B, C)`.
    pub fn new(contact: f64, collision: f64, chain: f64) -> Self {
        Self {
            contact,
            collision,
            chain,
        }
    }
}

/// Sparse QUBO: `constant + Σ linear_i b_i + Σ_{i<j} quadratic_ij b_i b_j`.
///
/// All `add_*` calls accumulate; nothing is ever overwritten.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Qubo {
    num_variables: usize,
    linear: BTreeMap<usize, f64>,
    quadratic: BTreeMap<(usize, usize), f64>,
    constant: f64,
}

impl Qubo {
    /// Create an empty QUBO over `num_variables` binary variables.
    pub fn new(num_variables: usize) -> Self {
        Self {
            num_variables,
            linear: BTreeMap::new(),
            quadratic: BTreeMap::new(),
            constant: 0.0,
        }
    }

    /// Number of binary variables.
    pub fn num_variables(&self) -> usize {
        self.num_variables
    }

    /// Add `coeff * b_var`.
    pub fn add_linear(&mut self, var: usize, coeff: f64) {
        debug_assert!(var < self.num_variables);
        *self.linear.entry(var).or_insert(0.0) += coeff;
    }

    /// Add `coeff * b_a * b_b`.
    ///
    /// The key is stored as `(min, max)`. A diagonal pair folds into the
    /// linear term since `b * b = b`.
    pub fn add_quadratic(&mut self, a: usize, b: usize, coeff: f64) {
        if a == b {
            self.add_linear(a, coeff);
            return;
        }
        debug_assert!(a < self.num_variables && b < self.num_variables);
        let key = if a < b { (a, b) } else { (b, a) };
        *self.quadratic.entry(key).or_insert(0.0) += coeff;
    }

    /// Add a constant offset.
    pub fn add_constant(&mut self, value: f64) {
        self.constant += value;
    }

    /// Linear coefficients keyed by variable.
    pub fn linear(&self) -> &BTreeMap<usize, f64> {
        &self.linear
    }

    /// Quadratic coefficients keyed by `(smaller, larger)` variable pair.
    pub fn quadratic(&self) -> &BTreeMap<(usize, usize), f64> {
        &self.quadratic
    }

    /// Constant offset.
    pub fn constant(&self) -> f64 {
        self.constant
    }

    /// Number of linear plus quadratic entries.
    pub fn num_terms(&self) -> usize {
        self.linear.len() + self.quadratic.len()
    }

    /// True if no linear or quadratic entries were added.
    pub fn is_empty(&self) -> bool {
        self.linear.is_empty() && self.quadratic.is_empty()
    }

    /// Evaluate the objective for an assignment indexed by variable.
    ///
    /// # Panics
    ///
    /// Panics if `bits` is shorter than the variable count.
    pub fn evaluate(&self, bits: &[bool]) -> f64 {
        let linear: f64 = self
            .linear
            .iter()
            .filter(|&(&v, _)| bits[v])
            .map(|(_, c)| c)
            .sum();
        let quadratic: f64 = self
            .quadratic
            .iter()
            .filter(|&(&(a, b), _)| bits[a] && bits[b])
            .map(|(_, c)| c)
            .sum();
        self.constant + linear + quadratic
    }

    /// Exhaustively find a minimum-energy assignment.
    ///
    /// Only meant as a correctness reference for tiny instances.
    pub fn brute_force_minimum(&self) -> FoldResult<(Vec<bool>, f64)> {
        let n = self.num_variables;
        if n > BRUTE_FORCE_LIMIT {
            return Err(FoldError::TooManyVariables {
                variables: n,
                limit: BRUTE_FORCE_LIMIT,
            });
        }

        let mut best_bits = vec![false; n];
        let mut best_energy = f64::INFINITY;
        let mut bits = vec![false; n];
        for index in 0..(1usize << n) {
            for (v, bit) in bits.iter_mut().enumerate() {
                *bit = (index >> v) & 1 == 1;
            }
            let energy = self.evaluate(&bits);
            if energy < best_energy {
                best_energy = energy;
                best_bits.clone_from(&bits);
            }
        }

        Ok((best_bits, best_energy))
    }
}

impl std::fmt::Display for Qubo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "QUBO ({} variables, {} linear, {} quadratic, constant {:.4}):",
            self.num_variables,
            self.linear.len(),
            self.quadratic.len(),
            self.constant
        )?;
        for (v, c) in &self.linear {
            writeln!(f, "  {c:+.4} b[{v}]")?;
        }
        for ((a, b), c) in &self.quadratic {
            writeln!(f, "  {c:+.4} b[{a}] b[{b}]")?;
        }
        Ok(())
    }
}

/// One of the three additive term groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PenaltyGroup {
    /// Soft non-overlap penalty between non-bonded residues (B).
    Collision,
    /// Bonded-neighbor consistency penalty (C).
    Chain,
    /// Hydrophobic contact reward (A).
    Contact,
}

impl PenaltyGroup {
    /// All groups, in build order.
    pub const ALL: [PenaltyGroup; 3] = [
        PenaltyGroup::Collision,
        PenaltyGroup::Chain,
        PenaltyGroup::Contact,
    ];

    /// Residue pairs this group touches for the given HP labels.
    pub fn pairs(&self, labels: &[bool]) -> Vec<(usize, usize)> {
        let r = labels.len();
        match self {
            PenaltyGroup::Chain => (1..r).map(|i| (i - 1, i)).collect(),
            PenaltyGroup::Collision => (0..r)
                .flat_map(|i| ((i + 2)..r).map(move |j| (i, j)))
                .collect(),
            PenaltyGroup::Contact => (0..r)
                .flat_map(|i| ((i + 2)..r).map(move |j| (i, j)))
                .filter(|&(i, j)| labels[i] && labels[j])
                .collect(),
        }
    }
}

/// Add `scale * (v_i - v_j)^2`.
fn add_squared_difference(
    qubo: &mut Qubo,
    layout: &VariableLayout,
    i: usize,
    j: usize,
    scale: f64,
) {
    for residue in [i, j] {
        let block: Vec<(usize, f64)> = layout.weighted_block(residue).collect();
        for (k, &(vk, wk)) in block.iter().enumerate() {
            qubo.add_linear(vk, scale * wk * wk);
            for &(vl, wl) in &block[k + 1..] {
                qubo.add_quadratic(vk, vl, scale * 2.0 * wk * wl);
            }
        }
    }

    for (vk, wk) in layout.weighted_block(i) {
        for (vl, wl) in layout.weighted_block(j) {
            qubo.add_quadratic(vk, vl, -scale * 2.0 * wk * wl);
        }
    }
}

/// Add `scale * (M^2 - (v_i - v_j)^2)`, where `M` is the largest encodable
/// value.
///
/// The bracket is never negative: it peaks at `M^2` when both residues encode
/// the same site and vanishes when they are maximally apart. Collision passes
/// `+B`, so shared sites are penalized. Contact passes `-A`, so hydrophobic
/// pairs that coincide are rewarded. Both signs are intended.
fn add_separation_penalty(
    qubo: &mut Qubo,
    layout: &VariableLayout,
    i: usize,
    j: usize,
    scale: f64,
) {
    let m = layout.max_encoded_value() as f64;
    qubo.add_constant(scale * m * m);
    add_squared_difference(qubo, layout, i, j, -scale);
}

/// Builds the folding QUBO group by group over one shared accumulator.
#[derive(Debug, Clone)]
pub struct QuboBuilder<'a> {
    layout: &'a VariableLayout,
    labels: &'a [bool],
    weights: PenaltyWeights,
}

impl<'a> QuboBuilder<'a> {
    /// Create a builder; `labels` must have one entry per residue.
    pub fn new(
        layout: &'a VariableLayout,
        labels: &'a [bool],
        weights: PenaltyWeights,
    ) -> FoldResult<Self> {
        if labels.len() != layout.num_residues() {
            return Err(FoldError::LayoutMismatch(format!(
                "{} hydrophobicity labels for a layout of {} residues",
                labels.len(),
                layout.num_residues()
            )));
        }
        Ok(Self {
            layout,
            labels,
            weights,
        })
    }

    /// Accumulate one group into `qubo`, returning the residue pairs touched.
    pub fn add_group(&self, group: PenaltyGroup, qubo: &mut Qubo) -> Vec<(usize, usize)> {
        let pairs = group.pairs(self.labels);
        for &(i, j) in &pairs {
            match group {
                PenaltyGroup::Collision => {
                    add_separation_penalty(qubo, self.layout, i, j, self.weights.collision);
                }
                PenaltyGroup::Chain => {
                    add_squared_difference(qubo, self.layout, i, j, self.weights.chain);
                }
                PenaltyGroup::Contact => {
                    add_separation_penalty(qubo, self.layout, i, j, -self.weights.contact);
                }
            }
        }
        pairs
    }

    /// Build a QUBO containing a single group.
    pub fn build_group(&self, group: PenaltyGroup) -> Qubo {
        let mut qubo = Qubo::new(self.layout.num_variables());
        self.add_group(group, &mut qubo);
        qubo
    }

    /// Build the full objective.
    pub fn build(&self) -> Qubo {
        let mut qubo = Qubo::new(self.layout.num_variables());
        for group in PenaltyGroup::ALL {
            let pairs = self.add_group(group, &mut qubo);
            tracing::trace!(?group, pairs = pairs.len(), "added penalty group");
        }
        qubo
    }
}

/// Build the folding QUBO for a chain with the given HP labels.
///
/// `adjacency` must describe the lattice the layout was sized for. The
/// squared-difference terms do not enumerate lattice edges, so it is only
/// checked against the layout.
pub fn build_qubo(
    layout: &VariableLayout,
    adjacency: &Adjacency,
    labels: &[bool],
    weights: PenaltyWeights,
) -> FoldResult<Qubo> {
    if adjacency.len() != layout.num_sites() {
        return Err(FoldError::LayoutMismatch(format!(
            "adjacency covers {} sites, layout expects {}",
            adjacency.len(),
            layout.num_sites()
        )));
    }

    let qubo = QuboBuilder::new(layout, labels, weights)?.build();
    tracing::debug!(
        variables = qubo.num_variables(),
        linear = qubo.linear().len(),
        quadratic = qubo.quadratic().len(),
        lattice_edges = adjacency.num_edges(),
        "built QUBO"
    );
    Ok(qubo)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accumulation_is_additive() {
        let mut q = Qubo::new(3);
        q.add_linear(0, 1.0);
        q.add_linear(0, 2.5);
        q.add_quadratic(2, 1, 1.0);
        q.add_quadratic(1, 2, -0.5);
        q.add_constant(1.0);
        q.add_constant(2.0);

        assert_eq!(q.linear()[&0], 3.5);
        assert_eq!(q.quadratic()[&(1, 2)], 0.5);
        assert!(!q.quadratic().contains_key(&(2, 1)));
        assert_eq!(q.constant(), 3.0);
    }

    #[test]
    fn test_diagonal_pair_folds_into_linear() {
        let mut q = Qubo::new(2);
        q.add_quadratic(1, 1, 4.0);
        assert!(q.quadratic().is_empty());
        assert_eq!(q.linear()[&1], 4.0);
    }

    #[test]
    fn test_squared_difference_matches_direct_evaluation() {
        let layout = VariableLayout::new(2, 4);
        let mut q = Qubo::new(layout.num_variables());
        add_squared_difference(&mut q, &layout, 0, 1, 1.0);

        for index in 0..(1usize << layout.num_variables()) {
            let bits: Vec<bool> = (0..4).map(|v| (index >> v) & 1 == 1).collect();
            let vi = layout.encoded_value(&bits, 0) as f64;
            let vj = layout.encoded_value(&bits, 1) as f64;
            assert!((q.evaluate(&bits) - (vi - vj).powi(2)).abs() < 1e-12);
        }
    }

    #[test]
    fn test_group_pairs() {
        let labels = [true, false, true, true];
        assert_eq!(
            PenaltyGroup::Chain.pairs(&labels),
            vec![(0, 1), (1, 2), (2, 3)]
        );
        assert_eq!(
            PenaltyGroup::Collision.pairs(&labels),
            vec![(0, 2), (0, 3), (1, 3)]
        );
        assert_eq!(PenaltyGroup::Contact.pairs(&labels), vec![(0, 2), (0, 3)]);
    }

    #[test]
    fn test_builder_rejects_label_mismatch() {
        let layout = VariableLayout::new(3, 4);
        let labels = [true, false];
        assert!(matches!(
            QuboBuilder::new(&layout, &labels, PenaltyWeights::default()),
            Err(FoldError::LayoutMismatch(_))
        ));
    }

    #[test]
    fn test_brute_force_limit() {
        let q = Qubo::new(BRUTE_FORCE_LIMIT + 1);
        assert!(matches!(
            q.brute_force_minimum(),
            Err(FoldError::TooManyVariables { .. })
        ));
    }

    #[test]
    fn test_brute_force_small() {
        let mut q = Qubo::new(2);
        q.add_linear(0, -1.0);
        q.add_linear(1, -1.0);
        q.add_quadratic(0, 1, 3.0);
        let (bits, energy) = q.brute_force_minimum().unwrap();
        assert_eq!(energy, -1.0);
        assert_eq!(bits.iter().filter(|&&b| b).count(), 1);
    }
}
