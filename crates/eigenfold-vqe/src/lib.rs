//! `eigenfold-vqe`: variational minimum-eigenvalue solver.
//!
//! Implements [`eigenfold_core::MinimumEigensolver`] with a statevector VQE:
//!
//! - **Ansatz**: hardware-efficient (RY+RZ) or two-local (RY) rotation
//!   layers with linear CZ entanglers
//! - **Optimizers**: COBYLA-style trust-region simplex and SPSA
//! - **Readout**: exact probabilities or seeded shot sampling
//!
//! # Quick start
//!
//! ```rust
//! use eigenfold_core::{Estimator, EstimatorConfig};
//! use eigenfold_vqe::VqeSolver;
//!
//! let solver = VqeSolver::default().with_maxiter(30);
//! let estimator = Estimator::new(EstimatorConfig::default(), solver);
//! let record = estimator.estimate("AV", "sc").unwrap();
//! assert_eq!(record.n_qubits, 4);
//! ```

pub mod ansatz;
pub mod error;
pub mod optimizers;
pub mod runner;
pub mod statevector;

pub use ansatz::{Ansatz, AnsatzKind, Gate};
pub use error::{VqeError, VqeResult};
pub use optimizers::{Cobyla, OptimizationResult, Optimizer, OptimizerKind, Spsa};
pub use runner::{VqeConfig, VqeOutcome, VqeSolver};
pub use statevector::Statevector;
