//! VQE (Variational Quantum Eigensolver) runner.
//!
//! Minimizes `⟨ψ(θ)|H|ψ(θ)⟩` over the ansatz parameters with a classical
//! optimizer, simulating the ansatz exactly on a statevector. The final state
//! is turned into a bitstring distribution either exactly or by sampling a
//! fixed number of shots.

use std::collections::BTreeMap;
use std::f64::consts::FRAC_PI_2;
use std::time::Instant;

use eigenfold_core::stats::PROBABILITY_FLOOR;
use eigenfold_core::{BitOrder, FoldResult, MinimumEigensolver, PauliHamiltonian, SolverOutput};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::ansatz::{Ansatz, AnsatzKind};
use crate::error::{VqeError, VqeResult};
use crate::optimizers::{Cobyla, OptimizationResult, Optimizer, OptimizerKind, Spsa};
use crate::statevector::Statevector;

/// VQE settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VqeConfig {
    /// Ansatz shape
    #[serde(default)]
    pub ansatz: AnsatzKind,

    /// Entangle-then-rotate repetitions
    #[serde(default = "default_reps")]
    pub reps: usize,

    /// Classical optimizer
    #[serde(default)]
    pub optimizer: OptimizerKind,

    /// Maximum optimizer iterations
    #[serde(default = "default_maxiter")]
    pub maxiter: usize,

    /// Convergence tolerance on the energy spread
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,

    /// Seed for initial parameters, SPSA directions and shot sampling
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Measurement shots for the final distribution; exact probabilities when unset
    #[serde(default)]
    pub shots: Option<u32>,

    /// Refuse Hamiltonians wider than this
    #[serde(default = "default_max_qubits")]
    pub max_qubits: usize,
}

fn default_reps() -> usize {
    2
}

fn default_maxiter() -> usize {
    100
}

fn default_tolerance() -> f64 {
    1e-6
}

fn default_seed() -> u64 {
    42
}

fn default_max_qubits() -> usize {
    20
}

impl Default for VqeConfig {
    fn default() -> Self {
        VqeConfig {
            ansatz: AnsatzKind::default(),
            reps: default_reps(),
            optimizer: OptimizerKind::default(),
            maxiter: default_maxiter(),
            tolerance: default_tolerance(),
            seed: default_seed(),
            shots: None,
            max_qubits: default_max_qubits(),
        }
    }
}

impl VqeConfig {
    /// Validate configuration values.
    pub fn validate(&self) -> VqeResult<()> {
        if self.maxiter == 0 {
            return Err(VqeError::InvalidConfig(
                "maxiter must be greater than 0".to_string(),
            ));
        }
        if !self.tolerance.is_finite() || self.tolerance <= 0.0 {
            return Err(VqeError::InvalidConfig(format!(
                "tolerance must be finite and positive, got {}",
                self.tolerance
            )));
        }
        if self.shots == Some(0) {
            return Err(VqeError::InvalidConfig(
                "shots must be greater than 0; omit it for exact probabilities".to_string(),
            ));
        }
        if self.max_qubits == 0 || self.max_qubits > usize::BITS as usize - 2 {
            return Err(VqeError::InvalidConfig(format!(
                "max_qubits must be between 1 and {}, got {}",
                usize::BITS - 2,
                self.max_qubits
            )));
        }
        Ok(())
    }
}

/// Everything a VQE run produces.
#[derive(Debug, Clone)]
pub struct VqeOutcome {
    /// Best energy found, excluding the Hamiltonian constant.
    pub optimal_energy: f64,
    pub optimal_params: Vec<f64>,
    /// Bitstring → probability of the optimal state.
    pub distribution: BTreeMap<String, f64>,
    pub iterations: usize,
    /// Number of circuit evaluations.
    pub circuit_evaluations: usize,
    /// Energy history during optimization.
    pub energy_history: Vec<f64>,
    pub converged: bool,
}

/// Statevector VQE solver.
#[derive(Debug, Clone, Default)]
pub struct VqeSolver {
    config: VqeConfig,
}

impl VqeSolver {
    /// Create a solver with the given settings.
    pub fn new(config: VqeConfig) -> VqeResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Set the number of ansatz repetitions.
    pub fn with_reps(mut self, reps: usize) -> Self {
        self.config.reps = reps;
        self
    }

    /// Set maximum iterations.
    pub fn with_maxiter(mut self, maxiter: usize) -> Self {
        self.config.maxiter = maxiter.max(1);
        self
    }

    /// Sample the final state with this many shots.
    pub fn with_shots(mut self, shots: u32) -> Self {
        self.config.shots = (shots > 0).then_some(shots);
        self
    }

    /// Set the ansatz shape.
    pub fn with_ansatz(mut self, ansatz: AnsatzKind) -> Self {
        self.config.ansatz = ansatz;
        self
    }

    /// Set the seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.seed = seed;
        self
    }

    pub fn config(&self) -> &VqeConfig {
        &self.config
    }

    /// Ansatz used for a Hamiltonian on `num_qubits` qubits.
    pub fn ansatz(&self, num_qubits: usize) -> Ansatz {
        Ansatz::new(self.config.ansatz, num_qubits, self.config.reps)
    }

    /// Seeded initial parameters in `[-π/2, π/2)`.
    pub fn initial_params(&self, num_qubits: usize) -> Vec<f64> {
        let mut rng = StdRng::seed_from_u64(self.config.seed);
        (0..self.ansatz(num_qubits).num_parameters())
            .map(|_| rng.gen_range(-FRAC_PI_2..FRAC_PI_2))
            .collect()
    }

    /// Run VQE with seeded initial parameters.
    pub fn run(&self, hamiltonian: &PauliHamiltonian) -> VqeResult<VqeOutcome> {
        self.check_width(hamiltonian.num_qubits())?;
        let initial = self.initial_params(hamiltonian.num_qubits());
        self.run_with_params(hamiltonian, initial)
    }

    /// Run VQE from the given initial parameters.
    pub fn run_with_params(
        &self,
        hamiltonian: &PauliHamiltonian,
        initial_params: Vec<f64>,
    ) -> VqeResult<VqeOutcome> {
        let n = hamiltonian.num_qubits();
        self.check_width(n)?;
        let ansatz = self.ansatz(n);
        if initial_params.len() != ansatz.num_parameters() {
            return Err(VqeError::ParameterCount {
                expected: ansatz.num_parameters(),
                actual: initial_params.len(),
            });
        }

        let energy = EnergyEvaluator::new(hamiltonian);
        let objective = |params: &[f64]| -> f64 {
            // Parameter counts are checked above; a failure here yields an
            // energy the optimizer will never prefer.
            match ansatz
                .build(params)
                .and_then(|gates| Statevector::from_gates(n, &gates))
            {
                Ok(state) => energy.evaluate(&state),
                Err(_) => f64::INFINITY,
            }
        };

        tracing::debug!(
            qubits = n,
            parameters = ansatz.num_parameters(),
            ansatz = %self.config.ansatz,
            optimizer = %self.config.optimizer,
            "starting VQE"
        );
        let result = self.optimize(objective, initial_params);
        if !result.optimal_value.is_finite() {
            return Err(VqeError::Diverged(format!(
                "best energy is {}",
                result.optimal_value
            )));
        }

        let state = Statevector::from_gates(n, &ansatz.build(&result.optimal_params)?)?;
        let distribution = self.distribution(&state);

        tracing::debug!(
            energy = result.optimal_value,
            evaluations = result.num_evaluations,
            converged = result.converged,
            states = distribution.len(),
            "VQE finished"
        );

        Ok(VqeOutcome {
            optimal_energy: result.optimal_value,
            optimal_params: result.optimal_params,
            distribution,
            iterations: result.num_iterations,
            circuit_evaluations: result.num_evaluations,
            energy_history: result.history,
            converged: result.converged,
        })
    }

    fn optimize<F>(&self, objective: F, initial_params: Vec<f64>) -> OptimizationResult
    where
        F: FnMut(&[f64]) -> f64,
    {
        match self.config.optimizer {
            OptimizerKind::Cobyla => Cobyla::new()
                .with_maxiter(self.config.maxiter)
                .with_tol(self.config.tolerance)
                .minimize(objective, initial_params),
            OptimizerKind::Spsa => Spsa::new()
                .with_maxiter(self.config.maxiter)
                .with_seed(self.config.seed)
                .minimize(objective, initial_params),
        }
    }

    fn check_width(&self, num_qubits: usize) -> VqeResult<()> {
        if num_qubits == 0 {
            return Err(VqeError::EmptyHamiltonian);
        }
        if num_qubits > self.config.max_qubits {
            return Err(VqeError::TooManyQubits {
                qubits: num_qubits,
                limit: self.config.max_qubits,
            });
        }
        Ok(())
    }

    /// Bitstring distribution of `state`, exact or sampled.
    fn distribution(&self, state: &Statevector) -> BTreeMap<String, f64> {
        let n = state.num_qubits();
        match self.config.shots {
            None => state
                .probabilities()
                .into_iter()
                .enumerate()
                .filter(|&(_, p)| p > PROBABILITY_FLOOR)
                .map(|(i, p)| (BitOrder::basis_state(i, n), p))
                .collect(),
            Some(shots) => {
                let mut rng = StdRng::seed_from_u64(self.config.seed.wrapping_add(1));
                state
                    .sample(shots, &mut rng)
                    .into_iter()
                    .map(|(i, count)| {
                        (BitOrder::basis_state(i, n), f64::from(count) / f64::from(shots))
                    })
                    .collect()
            }
        }
    }
}

/// Expectation values for one Hamiltonian, using its precomputed diagonal
/// when it has no X or Y terms.
struct EnergyEvaluator<'a> {
    hamiltonian: &'a PauliHamiltonian,
    diagonal: Option<Vec<f64>>,
}

impl<'a> EnergyEvaluator<'a> {
    fn new(hamiltonian: &'a PauliHamiltonian) -> Self {
        let diagonal = hamiltonian.is_diagonal().then(|| hamiltonian.diagonal());
        Self {
            hamiltonian,
            diagonal,
        }
    }

    fn evaluate(&self, state: &Statevector) -> f64 {
        match &self.diagonal {
            Some(diagonal) => state.diagonal_expectation(diagonal),
            None => state.expectation(self.hamiltonian),
        }
    }
}

impl MinimumEigensolver for VqeSolver {
    fn name(&self) -> &str {
        "vqe"
    }

    fn compute_minimum_eigenvalue(
        &self,
        hamiltonian: &PauliHamiltonian,
    ) -> FoldResult<SolverOutput> {
        let start = Instant::now();
        let outcome = self.run(hamiltonian)?;
        Ok(SolverOutput {
            optimal_value: outcome.optimal_energy,
            optimal_params: outcome.optimal_params,
            distribution: outcome.distribution,
            elapsed: start.elapsed(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eigenfold_core::PauliTerm;

    /// `E = Z0 + Z1 - 0.5 Z0 Z1`, ground state |11⟩ with E = -2.5.
    fn two_qubit_ising() -> PauliHamiltonian {
        PauliHamiltonian::new(
            2,
            vec![
                PauliTerm::z(1.0, 0),
                PauliTerm::z(1.0, 1),
                PauliTerm::zz(-0.5, 0, 1),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_vqe_solver_defaults() {
        let solver = VqeSolver::default();
        assert_eq!(solver.config().reps, 2);
        assert_eq!(solver.config().maxiter, 100);
        assert_eq!(solver.config().ansatz, AnsatzKind::HardwareEfficient);
        assert_eq!(solver.config().shots, None);
        assert_eq!(solver.ansatz(4).num_parameters(), 24);
    }

    #[test]
    fn test_initial_params_are_seeded() {
        let a = VqeSolver::default().initial_params(3);
        let b = VqeSolver::default().initial_params(3);
        let c = VqeSolver::default().with_seed(7).initial_params(3);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.iter().all(|p| p.abs() <= FRAC_PI_2));
    }

    #[test]
    fn test_vqe_finds_ising_ground_state() {
        let solver = VqeSolver::default()
            .with_ansatz(AnsatzKind::TwoLocal)
            .with_reps(1)
            .with_maxiter(300);
        let outcome = solver.run(&two_qubit_ising()).unwrap();

        // Variational bound: never below the true minimum.
        assert!(outcome.optimal_energy >= -2.5 - 1e-9);
        assert!(outcome.optimal_energy < -2.0, "energy {}", outcome.optimal_energy);

        let total: f64 = outcome.distribution.values().sum();
        assert!((total - 1.0).abs() < 1e-9);
        let best = outcome
            .distribution
            .iter()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .unwrap();
        assert_eq!(best.0, "11");
    }

    #[test]
    fn test_shot_distribution_sums_to_one() {
        let solver = VqeSolver::default().with_maxiter(20).with_shots(512);
        let outcome = solver.run(&two_qubit_ising()).unwrap();
        let total: f64 = outcome.distribution.values().sum();
        assert!((total - 1.0).abs() < 1e-12);
        assert!(outcome.distribution.values().all(|&p| p * 512.0 == (p * 512.0).round()));
    }

    #[test]
    fn test_width_limits() {
        let solver = VqeSolver::new(VqeConfig {
            max_qubits: 1,
            ..VqeConfig::default()
        })
        .unwrap();
        assert!(matches!(
            solver.run(&two_qubit_ising()),
            Err(VqeError::TooManyQubits { qubits: 2, limit: 1 })
        ));
        assert!(matches!(
            VqeSolver::default().run(&PauliHamiltonian::new(0, vec![]).unwrap()),
            Err(VqeError::EmptyHamiltonian)
        ));
    }

    #[test]
    fn test_invalid_config() {
        assert!(VqeSolver::new(VqeConfig {
            shots: Some(0),
            ..VqeConfig::default()
        })
        .is_err());
        assert!(VqeSolver::new(VqeConfig {
            tolerance: -1.0,
            ..VqeConfig::default()
        })
        .is_err());
    }

    #[test]
    fn test_solver_trait_reports_elapsed() {
        let solver = VqeSolver::default().with_maxiter(10);
        let output = solver.compute_minimum_eigenvalue(&two_qubit_ising()).unwrap();
        assert_eq!(output.optimal_params.len(), solver.ansatz(2).num_parameters());
        assert!(!output.distribution.is_empty());
    }
}
