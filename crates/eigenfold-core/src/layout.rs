//! Binary-variable layout shared by the QUBO builder, the Hamiltonian
//! converter and the decoder.
//!
//! Residue `r` owns the contiguous block of variables
//! `[r * num_bits, (r + 1) * num_bits)`. Inside a block, bit `k` has weight
//! `2^k`. Labels and bitstrings are written most-significant variable first,
//! so variable `v` sits at string position `n - 1 - v`.

use serde::{Deserialize, Serialize};

use crate::error::{FoldError, FoldResult};

/// The string-ordering convention for labels and measured bitstrings.
///
/// Every component that turns a variable index into a string position (or
/// back) goes through this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BitOrder;

impl BitOrder {
    /// String position of `variable` in a string of length `n`.
    #[inline]
    pub fn position(variable: usize, n: usize) -> usize {
        debug_assert!(variable < n, "variable {variable} out of range for {n}");
        n - 1 - variable
    }

    /// Render basis-state index `index` as an `n`-character bitstring.
    ///
    /// Bit `v` of `index` is variable `v`.
    pub fn basis_state(index: usize, n: usize) -> String {
        (0..n)
            .rev()
            .map(|v| if (index >> v) & 1 == 1 { '1' } else { '0' })
            .collect()
    }

    /// Parse a bitstring into per-variable bits (index = variable).
    pub fn parse_bits(bitstring: &str, n: usize) -> FoldResult<Vec<bool>> {
        let chars: Vec<char> = bitstring.chars().collect();
        if chars.len() != n {
            return Err(FoldError::BitstringLength {
                expected: n,
                actual: chars.len(),
            });
        }
        (0..n)
            .map(|v| match chars[Self::position(v, n)] {
                '0' => Ok(false),
                '1' => Ok(true),
                other => Err(FoldError::BitstringCharacter(other)),
            })
            .collect()
    }

    /// Render per-variable bits (index = variable) as a bitstring.
    pub fn format_bits(bits: &[bool]) -> String {
        bits.iter()
            .rev()
            .map(|&b| if b { '1' } else { '0' })
            .collect()
    }
}

/// Number of bits needed to address `sites` lattice sites (at least 1).
pub fn bits_for_sites(sites: usize) -> usize {
    if sites <= 2 {
        1
    } else {
        (usize::BITS - (sites - 1).leading_zeros()) as usize
    }
}

/// Assignment of binary variables to residues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableLayout {
    num_residues: usize,
    num_sites: usize,
    num_bits: usize,
}

impl VariableLayout {
    /// Create the layout for `num_residues` residues on `num_sites` sites.
    pub fn new(num_residues: usize, num_sites: usize) -> Self {
        Self {
            num_residues,
            num_sites,
            num_bits: bits_for_sites(num_sites),
        }
    }

    /// Number of residues (R).
    pub fn num_residues(&self) -> usize {
        self.num_residues
    }

    /// Number of lattice sites (S).
    pub fn num_sites(&self) -> usize {
        self.num_sites
    }

    /// Bits per residue, `ceil(log2(S))` with a minimum of 1.
    pub fn num_bits(&self) -> usize {
        self.num_bits
    }

    /// Total variable (qubit) count, `R * num_bits`.
    pub fn num_variables(&self) -> usize {
        self.num_residues * self.num_bits
    }

    /// Largest value a residue block can encode.
    pub fn max_encoded_value(&self) -> usize {
        (1usize << self.num_bits) - 1
    }

    /// Global variable index of bit `bit` of residue `residue`.
    #[inline]
    pub fn variable(&self, residue: usize, bit: usize) -> usize {
        debug_assert!(residue < self.num_residues && bit < self.num_bits);
        residue * self.num_bits + bit
    }

    /// Variable indices of a residue's block, least significant first.
    pub fn block(&self, residue: usize) -> std::ops::Range<usize> {
        let start = residue * self.num_bits;
        start..start + self.num_bits
    }

    /// `(variable, weight)` pairs of a residue's block.
    pub fn weighted_block(&self, residue: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        (0..self.num_bits).map(move |k| (self.variable(residue, k), (1u64 << k) as f64))
    }

    /// The residue → variables mapping as explicit vectors.
    pub fn mapping(&self) -> Vec<Vec<usize>> {
        (0..self.num_residues)
            .map(|r| self.block(r).collect())
            .collect()
    }

    /// Raw integer encoded by a residue's block (before wrapping).
    pub fn encoded_value(&self, bits: &[bool], residue: usize) -> usize {
        self.block(residue)
            .enumerate()
            .filter(|&(_, v)| bits[v])
            .map(|(k, _)| 1usize << k)
            .sum()
    }

    /// Site occupied by a residue: encoded value modulo S.
    pub fn site_of(&self, bits: &[bool], residue: usize) -> usize {
        self.encoded_value(bits, residue) % self.num_sites
    }

    /// Parse a measured bitstring using this layout's variable count.
    pub fn parse_bitstring(&self, bitstring: &str) -> FoldResult<Vec<bool>> {
        BitOrder::parse_bits(bitstring, self.num_variables())
    }
}

/// Map residues to variable indices, returning the explicit mapping and the
/// per-residue bit count.
pub fn map_idx_to_qubit(num_residues: usize, num_sites: usize) -> (Vec<Vec<usize>>, usize) {
    let layout = VariableLayout::new(num_residues, num_sites);
    (layout.mapping(), layout.num_bits())
}
