//! Measured bitstrings back to lattice conformations.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::{FoldError, FoldResult};
use crate::lattice::{Adjacency, Coord};
use crate::layout::VariableLayout;

/// Site ID per residue, wrapping encoded values modulo the site count.
pub fn decode_sites(bitstring: &str, layout: &VariableLayout) -> FoldResult<Vec<usize>> {
    let bits = layout.parse_bitstring(bitstring)?;
    Ok((0..layout.num_residues())
        .map(|r| layout.site_of(&bits, r))
        .collect())
}

/// Coordinate per residue for a measured bitstring.
pub fn decode_bitstring(
    bitstring: &str,
    layout: &VariableLayout,
    coords: &[Coord],
) -> FoldResult<Vec<Coord>> {
    if coords.len() != layout.num_sites() {
        return Err(FoldError::LayoutMismatch(format!(
            "{} coordinates for a layout of {} sites",
            coords.len(),
            layout.num_sites()
        )));
    }
    Ok(decode_sites(bitstring, layout)?
        .into_iter()
        .map(|site| coords[site])
        .collect())
}

/// A decoded conformation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecodedFold {
    /// The measured bitstring.
    pub bitstring: String,
    /// Probability the solver assigned to it.
    pub probability: f64,
    /// Site ID per residue.
    pub sites: Vec<usize>,
    /// Coordinate per residue.
    pub coords: Vec<Coord>,
}

impl DecodedFold {
    /// Decode a bitstring into a conformation.
    pub fn decode(
        bitstring: &str,
        probability: f64,
        layout: &VariableLayout,
        coords: &[Coord],
    ) -> FoldResult<Self> {
        let decoded = decode_bitstring(bitstring, layout, coords)?;
        Ok(Self {
            bitstring: bitstring.to_string(),
            probability,
            sites: decode_sites(bitstring, layout)?,
            coords: decoded,
        })
    }

    /// True if no two residues share a site.
    pub fn is_self_avoiding(&self) -> bool {
        let unique: BTreeSet<usize> = self.sites.iter().copied().collect();
        unique.len() == self.sites.len()
    }

    /// True if every bonded pair sits on neighboring sites.
    pub fn is_chain_connected(&self, adjacency: &Adjacency) -> bool {
        self.sites
            .windows(2)
            .all(|w| adjacency.are_adjacent(w[0], w[1]))
    }

    /// Non-bonded hydrophobic pairs that sit on neighboring sites.
    pub fn hydrophobic_contacts(&self, adjacency: &Adjacency, labels: &[bool]) -> usize {
        let n = self.sites.len().min(labels.len());
        let mut contacts = 0;
        for i in 0..n {
            for j in (i + 2)..n {
                if labels[i] && labels[j] && adjacency.are_adjacent(self.sites[i], self.sites[j])
                {
                    contacts += 1;
                }
            }
        }
        contacts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lattice::{LatticeDims, LatticeType, build_adjacency, build_lattice};

    fn square() -> Vec<Coord> {
        build_lattice(LatticeDims::new(2, 2, 1), LatticeType::Sc)
    }

    #[test]
    fn test_decode_four_sites() {
        let coords = square();
        let layout = VariableLayout::new(1, 4);
        assert_eq!(layout.num_bits(), 2);
        assert_eq!(decode_sites("00", &layout).unwrap(), vec![0]);
        assert_eq!(decode_sites("01", &layout).unwrap(), vec![1]);
        assert_eq!(decode_sites("10", &layout).unwrap(), vec![2]);
        assert_eq!(decode_sites("11", &layout).unwrap(), vec![3]);
        assert_eq!(decode_bitstring("11", &layout, &coords).unwrap(), vec![coords[3]]);
    }

    #[test]
    fn test_decode_wraps_overflow() {
        // Three sites need two bits; value 3 aliases onto site 0.
        let coords = build_lattice(LatticeDims::new(1, 1, 3), LatticeType::Sc);
        let layout = VariableLayout::new(2, 3);
        // residue 1 = "11" (3 -> 0), residue 0 = "10" (2)
        assert_eq!(decode_sites("1110", &layout).unwrap(), vec![2, 0]);
        let decoded = decode_bitstring("1110", &layout, &coords).unwrap();
        assert_eq!(decoded, vec![[0.0, 0.0, 2.0], [0.0, 0.0, 0.0]]);
    }

    #[test]
    fn test_decode_rejects_wrong_length() {
        let layout = VariableLayout::new(2, 4);
        assert!(matches!(
            decode_sites("010", &layout),
            Err(FoldError::BitstringLength { .. })
        ));
    }

    #[test]
    fn test_fold_properties() {
        let coords = square();
        let adjacency = build_adjacency(&coords);
        let layout = VariableLayout::new(4, 4);
        // residues 0..4 on sites 0, 1, 3, 2 (a closed square walk)
        let bitstring = "10110100";
        let fold = DecodedFold::decode(bitstring, 0.5, &layout, &coords).unwrap();
        assert_eq!(fold.sites, vec![0, 1, 3, 2]);
        assert!(fold.is_self_avoiding());
        assert!(fold.is_chain_connected(&adjacency));
        assert_eq!(fold.hydrophobic_contacts(&adjacency, &[true, false, false, true]), 1);
        assert_eq!(fold.hydrophobic_contacts(&adjacency, &[true, true, false, false]), 0);
    }
}
