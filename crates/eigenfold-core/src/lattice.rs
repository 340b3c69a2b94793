//! Crystal lattices and their nearest-neighbor graphs.
//!
//! Site IDs are indices into the generated coordinate list. The generation
//! order (x, then y, then z, then basis offset, all ascending) is what every
//! downstream component indexes by, so it must never change.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::{FoldError, FoldResult};

/// A lattice site position.
pub type Coord = [f64; 3];

/// Tolerance used when comparing Manhattan distances against 1.
const DISTANCE_TOLERANCE: f64 = 1e-9;

/// Supported crystal structures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LatticeType {
    /// Simple cubic.
    Sc,
    /// Body-centered cubic.
    Bcc,
    /// Face-centered cubic.
    Fcc,
    /// Hexagonal close-packed.
    Hcp,
}

impl LatticeType {
    /// All supported structures, in sweep order.
    pub const ALL: [LatticeType; 4] = [
        LatticeType::Sc,
        LatticeType::Bcc,
        LatticeType::Fcc,
        LatticeType::Hcp,
    ];

    /// Short tag used on the command line and in result records.
    pub fn tag(&self) -> &'static str {
        match self {
            LatticeType::Sc => "sc",
            LatticeType::Bcc => "bcc",
            LatticeType::Fcc => "fcc",
            LatticeType::Hcp => "hcp",
        }
    }

    /// Fractional basis offsets of the unit cell.
    pub fn basis(&self) -> &'static [Coord] {
        const SC: [Coord; 1] = [[0.0, 0.0, 0.0]];
        const BCC: [Coord; 2] = [[0.0, 0.0, 0.0], [0.5, 0.5, 0.5]];
        const FCC: [Coord; 4] = [
            [0.0, 0.0, 0.0],
            [0.0, 0.5, 0.5],
            [0.5, 0.0, 0.5],
            [0.5, 0.5, 0.0],
        ];
        const HCP: [Coord; 2] = [[0.0, 0.0, 0.0], [2.0 / 3.0, 1.0 / 3.0, 0.5]];

        match self {
            LatticeType::Sc => &SC,
            LatticeType::Bcc => &BCC,
            LatticeType::Fcc => &FCC,
            LatticeType::Hcp => &HCP,
        }
    }
}

impl std::fmt::Display for LatticeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.tag())
    }
}

impl std::str::FromStr for LatticeType {
    type Err = FoldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sc" => Ok(LatticeType::Sc),
            "bcc" => Ok(LatticeType::Bcc),
            "fcc" => Ok(LatticeType::Fcc),
            "hcp" => Ok(LatticeType::Hcp),
            _ => Err(FoldError::UnknownStructure(s.to_string())),
        }
    }
}

/// Unit-cell counts along each axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatticeDims {
    /// Cells along x.
    pub nx: usize,
    /// Cells along y.
    pub ny: usize,
    /// Cells along z.
    pub nz: usize,
}

impl LatticeDims {
    /// Create new dimensions.
    pub fn new(nx: usize, ny: usize, nz: usize) -> Self {
        Self { nx, ny, nz }
    }

    /// Number of unit cells.
    pub fn cells(&self) -> usize {
        self.nx * self.ny * self.nz
    }
}

/// Enumerate lattice sites in the canonical site-ID order.
pub fn build_lattice(dims: LatticeDims, structure: LatticeType) -> Vec<Coord> {
    let basis = structure.basis();
    let mut coords = Vec::with_capacity(dims.cells() * basis.len());

    for x in 0..dims.nx {
        for y in 0..dims.ny {
            for z in 0..dims.nz {
                for [ox, oy, oz] in basis {
                    coords.push([x as f64 + ox, y as f64 + oy, z as f64 + oz]);
                }
            }
        }
    }

    coords
}

/// Pick a roughly square footprint extruded along z with at least
/// `ceil(residues * ratio)` unit cells.
pub fn choose_lattice_dims(residues: usize, ratio: f64) -> FoldResult<LatticeDims> {
    if residues == 0 {
        return Err(FoldError::InvalidDimensions(
            "cannot size a lattice for zero residues".into(),
        ));
    }
    if !ratio.is_finite() || ratio <= 0.0 {
        return Err(FoldError::InvalidDimensions(format!(
            "lattice ratio must be positive, got {ratio}"
        )));
    }

    let target = (residues as f64 * ratio).ceil().max(1.0) as usize;
    let side = ((target as f64).sqrt().floor() as usize).max(1);
    let nz = target.div_ceil(side * side);

    Ok(LatticeDims::new(side, side, nz))
}

/// Nearest-neighbor graph over lattice sites.
///
/// `neighbors(i)` holds every `j != i` at Manhattan distance exactly 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Adjacency {
    neighbors: Vec<BTreeSet<usize>>,
}

impl Adjacency {
    /// Neighbors of a site.
    pub fn neighbors(&self, site: usize) -> &BTreeSet<usize> {
        &self.neighbors[site]
    }

    /// Number of sites.
    pub fn len(&self) -> usize {
        self.neighbors.len()
    }

    /// True if the graph has no sites.
    pub fn is_empty(&self) -> bool {
        self.neighbors.is_empty()
    }

    /// Whether two sites are neighbors.
    pub fn are_adjacent(&self, a: usize, b: usize) -> bool {
        self.neighbors.get(a).is_some_and(|n| n.contains(&b))
    }

    /// Number of undirected edges.
    pub fn num_edges(&self) -> usize {
        self.neighbors.iter().map(BTreeSet::len).sum::<usize>() / 2
    }

    /// Iterate over `(site, neighbors)`.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &BTreeSet<usize>)> {
        self.neighbors.iter().enumerate()
    }
}

/// Manhattan distance between two coordinates.
pub fn manhattan(a: &Coord, b: &Coord) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y).abs()).sum()
}

/// Build the nearest-neighbor graph by pairwise comparison.
pub fn build_adjacency(coords: &[Coord]) -> Adjacency {
    let mut neighbors = vec![BTreeSet::new(); coords.len()];

    for (i, a) in coords.iter().enumerate() {
        for (j, b) in coords.iter().enumerate().skip(i + 1) {
            if (manhattan(a, b) - 1.0).abs() < DISTANCE_TOLERANCE {
                neighbors[i].insert(j);
                neighbors[j].insert(i);
            }
        }
    }

    Adjacency { neighbors }
}

/// A generated lattice with its adjacency graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lattice {
    /// Crystal structure.
    pub structure: LatticeType,
    /// Unit-cell counts.
    pub dims: LatticeDims,
    coords: Vec<Coord>,
    adjacency: Adjacency,
}

impl Lattice {
    /// Generate a lattice of the given dimensions.
    pub fn new(dims: LatticeDims, structure: LatticeType) -> FoldResult<Self> {
        if dims.cells() == 0 {
            return Err(FoldError::InvalidDimensions(format!(
                "{}x{}x{} has no unit cells",
                dims.nx, dims.ny, dims.nz
            )));
        }
        let coords = build_lattice(dims, structure);
        let adjacency = build_adjacency(&coords);
        tracing::debug!(
            structure = %structure,
            sites = coords.len(),
            edges = adjacency.num_edges(),
            "built lattice"
        );
        Ok(Self {
            structure,
            dims,
            coords,
            adjacency,
        })
    }

    /// Generate a lattice sized for a chain of `residues` residues.
    pub fn for_chain(residues: usize, ratio: f64, structure: LatticeType) -> FoldResult<Self> {
        let lattice = Self::new(choose_lattice_dims(residues, ratio)?, structure)?;
        if lattice.num_sites() < residues {
            return Err(FoldError::LatticeTooSmall {
                sites: lattice.num_sites(),
                residues,
            });
        }
        Ok(lattice)
    }

    /// Site coordinates indexed by site ID.
    pub fn coords(&self) -> &[Coord] {
        &self.coords
    }

    /// The nearest-neighbor graph.
    pub fn adjacency(&self) -> &Adjacency {
        &self.adjacency
    }

    /// Number of sites (S).
    pub fn num_sites(&self) -> usize {
        self.coords.len()
    }
}
