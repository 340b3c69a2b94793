//! Error types for the VQE solver.

use eigenfold_core::FoldError;
use thiserror::Error;

/// Errors produced while configuring or running VQE.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum VqeError {
    /// Hamiltonian is too wide to simulate.
    #[error("{qubits} qubits exceed the statevector limit of {limit}")]
    TooManyQubits {
        /// Qubits the Hamiltonian acts on.
        qubits: usize,
        /// Configured maximum.
        limit: usize,
    },

    /// Hamiltonian acts on no qubits.
    #[error("Hamiltonian has no qubits")]
    EmptyHamiltonian,

    /// Parameter vector does not match the ansatz.
    #[error("ansatz expects {expected} parameters, got {actual}")]
    ParameterCount {
        /// Parameters the ansatz needs.
        expected: usize,
        /// Parameters supplied.
        actual: usize,
    },

    /// Gate addresses a qubit outside the register.
    #[error("gate on qubit {qubit} outside a {num_qubits}-qubit register")]
    QubitOutOfRange {
        /// Offending qubit.
        qubit: usize,
        /// Register width.
        num_qubits: usize,
    },

    /// Ansatz name is not recognised.
    #[error("unknown ansatz '{0}' (expected one of: hardware_efficient, two_local)")]
    UnknownAnsatz(String),

    /// Optimizer name is not recognised.
    #[error("unknown optimizer '{0}' (expected one of: cobyla, spsa)")]
    UnknownOptimizer(String),

    /// Settings are out of range.
    #[error("invalid VQE configuration: {0}")]
    InvalidConfig(String),

    /// The optimizer produced a non-finite energy.
    #[error("optimization diverged: {0}")]
    Diverged(String),
}

impl From<VqeError> for FoldError {
    fn from(e: VqeError) -> Self {
        FoldError::solver("vqe", e)
    }
}

/// Result type for VQE operations.
pub type VqeResult<T> = Result<T, VqeError>;
