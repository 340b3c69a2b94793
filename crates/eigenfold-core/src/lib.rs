//! `eigenfold-core`: lattice HP-model protein folding as a QUBO.
//!
//! Places a residue chain on a 3D lattice (simple, body-centered,
//! face-centered cubic or hexagonal close-packed), encodes each residue's
//! site index in `ceil(log2 S)` binary variables and builds a penalty QUBO:
//!
//! - **Collision**: non-bonded residues sharing a site
//! - **Chain**: consecutive residues drifting apart
//! - **Contact**: reward for non-bonded hydrophobic pairs sitting close
//!
//! The QUBO is mapped to a Z-only Pauli Hamiltonian for a minimum-eigenvalue
//! solver, and the measured distribution is summarized and decoded back into
//! conformations.
//!
//! # Pipeline
//!
//! ```text
//! Sequence ─> Lattice ─> Adjacency ─> VariableLayout ─> Qubo
//!                                                        │
//!                                                        v
//! FoldRecord <─ stats <─ MinimumEigensolver <─ PauliHamiltonian
//!      │
//!      v
//! CSV / JSON export
//! ```
//!
//! # Quick start
//!
//! ```rust
//! use eigenfold_core::{Estimator, EstimatorConfig, ExactSolver};
//!
//! let estimator = Estimator::new(EstimatorConfig::default(), ExactSolver::new());
//! let record = estimator.estimate("AV", "sc").unwrap();
//! assert_eq!(record.num_residues, 2);
//! assert_eq!(record.n_qubits, 4);
//! ```

pub mod config;
pub mod decode;
pub mod error;
pub mod estimator;
pub mod export;
pub mod hamiltonian;
pub mod lattice;
pub mod layout;
pub mod qubo;
pub mod sequence;
pub mod solver;
pub mod stats;

pub use config::EstimatorConfig;
pub use decode::{DecodedFold, decode_bitstring, decode_sites};
pub use error::{FoldError, FoldResult};
pub use estimator::{Estimator, FoldProblem, FoldRecord, FoldReport};
pub use export::ExportConfig;
pub use hamiltonian::{Pauli, PauliHamiltonian, PauliString, PauliTerm, qubo_to_pauli};
pub use lattice::{
    Adjacency, Coord, Lattice, LatticeDims, LatticeType, build_adjacency, build_lattice,
    choose_lattice_dims,
};
pub use layout::{BitOrder, VariableLayout, map_idx_to_qubit};
pub use qubo::{PenaltyGroup, PenaltyWeights, Qubo, QuboBuilder, build_qubo};
pub use sequence::{Sequence, is_hydrophobic};
pub use solver::{ExactSolver, MinimumEigensolver, SolverOutput};
pub use stats::{DistributionSummary, shannon_entropy, summarize};
