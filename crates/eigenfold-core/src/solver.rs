//! Minimum-eigenvalue solver boundary.
//!
//! The estimator treats the solver as a synchronous black box: it hands over
//! a Hamiltonian and gets back an energy, parameters and a distribution over
//! measured bitstrings. Errors propagate to the caller without retry.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::error::{FoldError, FoldResult};
use crate::hamiltonian::PauliHamiltonian;
use crate::layout::BitOrder;

/// Output of a minimization run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolverOutput {
    /// Optimal operator eigenvalue estimate (excluding the constant offset).
    pub optimal_value: f64,
    /// Optimal variational parameters; opaque to the core.
    pub optimal_params: Vec<f64>,
    /// Measured bitstring → probability, bitstrings most significant first.
    pub distribution: BTreeMap<String, f64>,
    /// Wall time spent inside the solver.
    pub elapsed: Duration,
}

/// A minimization oracle for Pauli Hamiltonians.
pub trait MinimumEigensolver: Send + Sync {
    /// Short name used in logs and errors.
    fn name(&self) -> &str;

    /// Estimate the minimum eigenvalue of `hamiltonian`.
    fn compute_minimum_eigenvalue(&self, hamiltonian: &PauliHamiltonian)
    -> FoldResult<SolverOutput>;
}

impl<T: MinimumEigensolver + ?Sized> MinimumEigensolver for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn compute_minimum_eigenvalue(
        &self,
        hamiltonian: &PauliHamiltonian,
    ) -> FoldResult<SolverOutput> {
        (**self).compute_minimum_eigenvalue(hamiltonian)
    }
}

/// Largest qubit count the exact solver will enumerate.
pub const EXACT_SOLVER_LIMIT: usize = 20;

/// Exhaustive reference solver for diagonal Hamiltonians.
///
/// Spreads probability uniformly over every basis state within
/// `degeneracy_tolerance` of the minimum. Only suitable for tiny instances.
#[derive(Debug, Clone)]
pub struct ExactSolver {
    /// Energy window treated as degenerate with the ground state.
    pub degeneracy_tolerance: f64,
}

impl Default for ExactSolver {
    fn default() -> Self {
        Self {
            degeneracy_tolerance: 1e-9,
        }
    }
}

impl ExactSolver {
    /// Create an exact solver with the default degeneracy tolerance.
    pub fn new() -> Self {
        Self::default()
    }
}

impl MinimumEigensolver for ExactSolver {
    fn name(&self) -> &str {
        "exact"
    }

    fn compute_minimum_eigenvalue(
        &self,
        hamiltonian: &PauliHamiltonian,
    ) -> FoldResult<SolverOutput> {
        let start = Instant::now();
        let n = hamiltonian.num_qubits();
        if n > EXACT_SOLVER_LIMIT {
            return Err(FoldError::TooManyVariables {
                variables: n,
                limit: EXACT_SOLVER_LIMIT,
            });
        }
        if !hamiltonian.is_diagonal() {
            return Err(FoldError::solver(
                self.name(),
                "Hamiltonian contains X or Y terms",
            ));
        }

        let diagonal = hamiltonian.diagonal();
        let minimum = diagonal.iter().copied().fold(f64::INFINITY, f64::min);
        let ground: Vec<usize> = diagonal
            .iter()
            .enumerate()
            .filter(|(_, e)| (**e - minimum).abs() <= self.degeneracy_tolerance)
            .map(|(i, _)| i)
            .collect();

        let p = 1.0 / ground.len() as f64;
        let distribution = ground
            .iter()
            .map(|&i| (BitOrder::basis_state(i, n), p))
            .collect();

        Ok(SolverOutput {
            optimal_value: minimum,
            optimal_params: vec![],
            distribution,
            elapsed: start.elapsed(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hamiltonian::{PauliString, PauliTerm};

    #[test]
    fn test_exact_solver_single_ground_state() {
        // E = Z0 + 0.5 Z1: minimum -1.5 at q0 = 1, q1 = 1
        let h = PauliHamiltonian::new(2, vec![PauliTerm::z(1.0, 0), PauliTerm::z(0.5, 1)])
            .unwrap();
        let out = ExactSolver::new().compute_minimum_eigenvalue(&h).unwrap();
        assert_eq!(out.optimal_value, -1.5);
        assert_eq!(out.distribution.len(), 1);
        assert_eq!(out.distribution["11"], 1.0);
    }

    #[test]
    fn test_exact_solver_degenerate() {
        // E = Z0 Z1: minimum -1 at 01 and 10
        let h = PauliHamiltonian::new(2, vec![PauliTerm::zz(1.0, 0, 1)]).unwrap();
        let out = ExactSolver::new().compute_minimum_eigenvalue(&h).unwrap();
        assert_eq!(out.distribution.len(), 2);
        assert_eq!(out.distribution["01"], 0.5);
        assert_eq!(out.distribution["10"], 0.5);
    }

    #[test]
    fn test_exact_solver_rejects_off_diagonal() {
        let h = PauliHamiltonian::new(
            1,
            vec![PauliTerm::new(1.0, PauliString::from_ops([(0, crate::hamiltonian::Pauli::X)]))],
        )
        .unwrap();
        assert!(ExactSolver::new().compute_minimum_eigenvalue(&h).is_err());
    }

    #[test]
    fn test_boxed_solver_delegates() {
        let boxed: Box<dyn MinimumEigensolver> = Box::new(ExactSolver::new());
        assert_eq!(boxed.name(), "exact");
        let h = PauliHamiltonian::new(1, vec![PauliTerm::z(2.0, 0)]).unwrap();
        let out = boxed.compute_minimum_eigenvalue(&h).unwrap();
        assert_eq!(out.optimal_value, -2.0);
    }
}
