//! Error types for the folding core.

use thiserror::Error;

/// Errors produced while building, converting, decoding or scoring a fold.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FoldError {
    /// Lattice tag is not one of `sc`, `bcc`, `fcc`, `hcp`.
    #[error("unknown lattice structure '{0}' (expected one of: sc, bcc, fcc, hcp)")]
    UnknownStructure(String),

    /// Sequence is empty after trimming.
    #[error("sequence is empty")]
    EmptySequence,

    /// Sequence contains a character that is not an amino-acid letter.
    #[error("invalid residue '{residue}' at position {position}")]
    InvalidResidue {
        /// The offending character.
        residue: char,
        /// Zero-based position in the input.
        position: usize,
    },

    /// Lattice dimensions or ratio do not produce any sites.
    #[error("invalid lattice dimensions: {0}")]
    InvalidDimensions(String),

    /// Lattice has fewer sites than the chain has residues.
    #[error("lattice has {sites} sites but the chain has {residues} residues")]
    LatticeTooSmall {
        /// Number of lattice sites.
        sites: usize,
        /// Number of residues.
        residues: usize,
    },

    /// Inputs disagree with the variable layout they are used with.
    #[error("layout mismatch: {0}")]
    LayoutMismatch(String),

    /// A Pauli term acts on a qubit outside the Hamiltonian.
    #[error("term acts on qubit {qubit} but the Hamiltonian has {num_qubits} qubits")]
    QubitOutOfRange {
        /// Offending qubit index.
        qubit: usize,
        /// Width of the Hamiltonian.
        num_qubits: usize,
    },

    /// Bitstring does not match the variable layout.
    #[error("bitstring has length {actual}, expected {expected}")]
    BitstringLength {
        /// Number of variables in the layout.
        expected: usize,
        /// Length of the supplied bitstring.
        actual: usize,
    },

    /// Bitstring contains a character other than `0` or `1`.
    #[error("bitstring contains invalid character '{0}'")]
    BitstringCharacter(char),

    /// Brute-force enumeration was asked for too many variables.
    #[error("{variables} variables exceed the brute-force limit of {limit}")]
    TooManyVariables {
        /// Requested variable count.
        variables: usize,
        /// Maximum supported variable count.
        limit: usize,
    },

    /// Solver returned no probability mass at all.
    #[error("solver returned an empty probability distribution")]
    EmptyDistribution,

    /// Solver returned a distribution whose mass is not usable.
    #[error("solver returned a degenerate probability distribution: {0}")]
    DegenerateDistribution(String),

    /// The minimization oracle failed.
    #[error("solver '{solver}' failed: {message}")]
    Solver {
        /// Solver name.
        solver: String,
        /// Failure description.
        message: String,
    },

    /// Configuration could not be loaded or failed validation.
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error while exporting or loading.
    #[error("I/O error: {0}")]
    Io(String),

    /// Serialization error while exporting.
    #[error("export error: {0}")]
    Export(String),
}

impl FoldError {
    /// Convenience constructor for solver failures.
    pub fn solver(solver: impl Into<String>, message: impl std::fmt::Display) -> Self {
        FoldError::Solver {
            solver: solver.into(),
            message: message.to_string(),
        }
    }
}

impl From<serde_json::Error> for FoldError {
    fn from(e: serde_json::Error) -> Self {
        FoldError::Export(e.to_string())
    }
}

impl From<csv::Error> for FoldError {
    fn from(e: csv::Error) -> Self {
        FoldError::Export(e.to_string())
    }
}

/// Result type for folding operations.
pub type FoldResult<T> = Result<T, FoldError>;
