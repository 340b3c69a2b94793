//! Amino-acid sequences reduced to the HP (hydrophobic/polar) alphabet.

use serde::{Deserialize, Serialize};

use crate::error::{FoldError, FoldResult};

/// One-letter codes treated as hydrophobic.
pub const HYDROPHOBIC_RESIDUES: [char; 9] = ['A', 'V', 'I', 'L', 'M', 'F', 'Y', 'W', 'C'];

/// Whether a one-letter amino-acid code is hydrophobic.
pub fn is_hydrophobic(residue: char) -> bool {
    HYDROPHOBIC_RESIDUES.contains(&residue.to_ascii_uppercase())
}

/// A peptide chain in chain order together with its HP labels.
///
/// Residues `i` and `i + 1` are bonded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sequence {
    residues: String,
    hydrophobic: Vec<bool>,
}

impl Sequence {
    /// Parse a one-letter amino-acid string.
    ///
    /// Surrounding whitespace is ignored and letters are upper-cased.
    pub fn parse(input: &str) -> FoldResult<Self> {
        let residues: String = input.trim().to_ascii_uppercase();
        if residues.is_empty() {
            return Err(FoldError::EmptySequence);
        }
        if let Some((position, residue)) = residues
            .chars()
            .enumerate()
            .find(|(_, c)| !c.is_ascii_alphabetic())
        {
            return Err(FoldError::InvalidResidue { residue, position });
        }

        let hydrophobic = residues.chars().map(is_hydrophobic).collect();
        Ok(Self {
            residues,
            hydrophobic,
        })
    }

    /// Build a sequence directly from HP labels, e.g. for synthetic tests.
    ///
    /// Hydrophobic positions are rendered as `A`, polar ones as `G`.
    pub fn from_labels(labels: &[bool]) -> FoldResult<Self> {
        if labels.is_empty() {
            return Err(FoldError::EmptySequence);
        }
        let residues = labels.iter().map(|&h| if h { 'A' } else { 'G' }).collect();
        Ok(Self {
            residues,
            hydrophobic: labels.to_vec(),
        })
    }

    /// The upper-cased residue string.
    pub fn residues(&self) -> &str {
        &self.residues
    }

    /// Hydrophobicity label per residue, in chain order.
    pub fn labels(&self) -> &[bool] {
        &self.hydrophobic
    }

    /// Number of residues (R).
    pub fn len(&self) -> usize {
        self.hydrophobic.len()
    }

    /// Always false for a parsed sequence.
    pub fn is_empty(&self) -> bool {
        self.hydrophobic.is_empty()
    }

    /// Number of hydrophobic residues.
    pub fn hydrophobic_count(&self) -> usize {
        self.hydrophobic.iter().filter(|&&h| h).count()
    }

    /// HP string, e.g. `HPH`.
    pub fn hp_string(&self) -> String {
        self.hydrophobic
            .iter()
            .map(|&h| if h { 'H' } else { 'P' })
            .collect()
    }
}

impl std::fmt::Display for Sequence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.residues)
    }
}

impl std::str::FromStr for Sequence {
    type Err = FoldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
