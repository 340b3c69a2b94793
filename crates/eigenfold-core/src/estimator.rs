//! End-to-end folding estimate for one (sequence, lattice) pair.
//!
//! Pipeline: lattice → adjacency → variable layout → QUBO → Pauli
//! Hamiltonian → solver → distribution statistics → decoded conformations.

use serde::{Deserialize, Serialize};

use crate::config::EstimatorConfig;
use crate::decode::DecodedFold;
use crate::error::FoldResult;
use crate::hamiltonian::{PauliHamiltonian, qubo_to_pauli};
use crate::lattice::{Lattice, LatticeType};
use crate::layout::VariableLayout;
use crate::qubo::{Qubo, build_qubo};
use crate::sequence::Sequence;
use crate::solver::{MinimumEigensolver, SolverOutput};
use crate::stats::summarize;

/// One row of results, as persisted to CSV and JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoldRecord {
    /// Lattice tag (`sc`, `bcc`, `fcc`, `hcp`).
    pub lattice: String,
    /// Amino-acid sequence.
    pub peptide: String,
    /// Number of residues.
    #[serde(rename = "R")]
    pub num_residues: usize,
    /// Number of lattice sites.
    #[serde(rename = "S")]
    pub num_sites: usize,
    /// Number of qubits (QUBO variables).
    pub n_qubits: usize,
    /// `R·S / n_qubits`: one-hot variables saved per qubit.
    pub qubit_density: f64,
    /// Number of states above the stability threshold.
    pub n_stable: usize,
    pub dominant_state: String,
    pub dominant_p: f64,
    /// Shannon entropy in bits.
    pub entropy: f64,
    /// Mean probability of the stable states.
    pub avg_p: f64,
    /// Most probable stable states, at most `max_reported_states` of them.
    pub stable_states: Vec<(String, f64)>,
    /// Total probability of all stable states.
    pub stable_p_sum: f64,
    /// Minimum energy in QUBO units.
    pub energy: f64,
    /// Solver wall time in seconds.
    pub time: f64,
}

/// Everything built before the solver runs.
#[derive(Debug, Clone)]
pub struct FoldProblem {
    pub sequence: Sequence,
    pub lattice: Lattice,
    pub layout: VariableLayout,
    pub qubo: Qubo,
    pub hamiltonian: PauliHamiltonian,
}

impl FoldProblem {
    /// Build the lattice, QUBO and Hamiltonian for `sequence`.
    pub fn build(
        sequence: &Sequence,
        structure: LatticeType,
        config: &EstimatorConfig,
    ) -> FoldResult<Self> {
        let lattice = Lattice::for_chain(sequence.len(), config.lattice_ratio, structure)?;
        let layout = VariableLayout::new(sequence.len(), lattice.num_sites());
        let qubo = build_qubo(&layout, lattice.adjacency(), sequence.labels(), config.weights)?;
        let hamiltonian = qubo_to_pauli(&qubo, &layout, config.normalize)?;

        tracing::debug!(
            peptide = %sequence,
            lattice = %structure,
            sites = lattice.num_sites(),
            qubits = layout.num_variables(),
            terms = hamiltonian.num_terms(),
            "prepared folding problem"
        );

        Ok(Self {
            sequence: sequence.clone(),
            lattice,
            layout,
            qubo,
            hamiltonian,
        })
    }

    /// Number of qubits the Hamiltonian acts on.
    pub fn num_qubits(&self) -> usize {
        self.layout.num_variables()
    }

    /// Decode a measured bitstring into a conformation.
    pub fn decode(&self, bitstring: &str, probability: f64) -> FoldResult<DecodedFold> {
        DecodedFold::decode(bitstring, probability, &self.layout, self.lattice.coords())
    }
}

/// A result record together with the details behind it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoldReport {
    pub record: FoldRecord,
    /// `H`/`P` rendering of the sequence.
    pub hp: String,
    /// Operator eigenvalue of the (possibly normalized) Hamiltonian.
    pub optimal_value: f64,
    pub optimal_params: Vec<f64>,
    /// Non-zero Hamiltonian terms, including the identity.
    pub num_terms: usize,
    /// Factor the Hamiltonian was divided by.
    pub scale: f64,
    /// Decoded conformation of the dominant state.
    pub dominant_fold: DecodedFold,
    /// Decoded conformations of every stable state, most probable first.
    pub stable_folds: Vec<DecodedFold>,
}

/// Runs the folding pipeline with a given solver.
#[derive(Debug, Clone)]
pub struct Estimator<S> {
    config: EstimatorConfig,
    solver: S,
}

impl<S: MinimumEigensolver> Estimator<S> {
    /// Create an estimator.
    pub fn new(config: EstimatorConfig, solver: S) -> Self {
        Self { config, solver }
    }

    /// The configuration in use.
    pub fn config(&self) -> &EstimatorConfig {
        &self.config
    }

    /// The solver in use.
    pub fn solver(&self) -> &S {
        &self.solver
    }

    /// Parse inputs and run the full pipeline, returning only the record.
    pub fn estimate(&self, peptide: &str, lattice: &str) -> FoldResult<FoldRecord> {
        let sequence = Sequence::parse(peptide)?;
        let structure: LatticeType = lattice.parse()?;
        Ok(self.run(&sequence, structure)?.record)
    }

    /// Run the full pipeline.
    pub fn run(&self, sequence: &Sequence, structure: LatticeType) -> FoldResult<FoldReport> {
        let problem = FoldProblem::build(sequence, structure, &self.config)?;
        let output = self.solver.compute_minimum_eigenvalue(&problem.hamiltonian)?;
        self.report(&problem, output)
    }

    /// Turn a solver output into a report for `problem`.
    pub fn report(&self, problem: &FoldProblem, output: SolverOutput) -> FoldResult<FoldReport> {
        let summary = summarize(&output.distribution, self.config.stable_threshold)?;

        let stable_folds = summary
            .stable
            .iter()
            .map(|(state, p)| problem.decode(state, *p))
            .collect::<FoldResult<Vec<_>>>()?;
        let dominant_fold = problem.decode(&summary.dominant_state, summary.dominant_p)?;

        let num_residues = problem.sequence.len();
        let num_sites = problem.lattice.num_sites();
        let n_qubits = problem.num_qubits();
        let energy = problem.hamiltonian.physical_energy(output.optimal_value);
        let n_stable = summary.n_stable();

        let record = FoldRecord {
            lattice: problem.lattice.structure.tag().to_string(),
            peptide: problem.sequence.residues().to_string(),
            num_residues,
            num_sites,
            n_qubits,
            qubit_density: (num_residues * num_sites) as f64 / n_qubits as f64,
            n_stable,
            dominant_state: summary.dominant_state,
            dominant_p: summary.dominant_p,
            entropy: summary.entropy,
            avg_p: summary.avg_p,
            stable_states: summary
                .stable
                .into_iter()
                .take(self.config.max_reported_states)
                .collect(),
            stable_p_sum: summary.stable_p_sum,
            energy,
            time: output.elapsed.as_secs_f64(),
        };

        tracing::info!(
            peptide = %record.peptide,
            lattice = %record.lattice,
            solver = self.solver.name(),
            energy,
            n_stable,
            "fold estimate complete"
        );

        Ok(FoldReport {
            record,
            hp: problem.sequence.hp_string(),
            optimal_value: output.optimal_value,
            optimal_params: output.optimal_params,
            num_terms: problem.hamiltonian.num_terms(),
            scale: problem.hamiltonian.scale(),
            dominant_fold,
            stable_folds,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FoldError;
    use crate::solver::ExactSolver;
    use std::collections::BTreeMap;
    use std::time::Duration;

    /// Returns a fixed distribution regardless of the Hamiltonian.
    struct ScriptedSolver {
        value: f64,
        states: Vec<(usize, f64)>,
    }

    impl MinimumEigensolver for ScriptedSolver {
        fn name(&self) -> &str {
            "scripted"
        }

        fn compute_minimum_eigenvalue(
            &self,
            hamiltonian: &PauliHamiltonian,
        ) -> FoldResult<SolverOutput> {
            let n = hamiltonian.num_qubits();
            let distribution: BTreeMap<String, f64> = self
                .states
                .iter()
                .map(|&(i, p)| (crate::layout::BitOrder::basis_state(i, n), p))
                .collect();
            Ok(SolverOutput {
                optimal_value: self.value,
                optimal_params: vec![0.1, 0.2],
                distribution,
                elapsed: Duration::from_millis(250),
            })
        }
    }

    #[test]
    fn test_record_fields() {
        let solver = ScriptedSolver {
            value: -0.5,
            states: vec![(0, 0.6), (1, 0.25), (2, 0.1), (3, 0.05)],
        };
        let estimator = Estimator::new(EstimatorConfig::default(), solver);
        let report = estimator
            .run(&Sequence::parse("AV").unwrap(), LatticeType::Sc)
            .unwrap();
        let record = &report.record;

        assert_eq!(record.lattice, "sc");
        assert_eq!(record.peptide, "AV");
        assert_eq!(record.num_residues, 2);
        assert!(record.num_sites >= 2);
        assert_eq!(
            record.qubit_density,
            (record.num_residues * record.num_sites) as f64 / record.n_qubits as f64
        );
        assert_eq!(record.n_stable, 2);
        assert_eq!(record.dominant_p, 0.6);
        assert!((record.stable_p_sum - 0.85).abs() < 1e-12);
        assert_eq!(record.time, 0.25);
        assert_eq!(report.stable_folds.len(), 2);
        assert_eq!(report.optimal_params, vec![0.1, 0.2]);
    }

    #[test]
    fn test_stable_states_truncated() {
        let solver = ScriptedSolver {
            value: 0.0,
            states: vec![(0, 0.2), (1, 0.2), (2, 0.2), (3, 0.2), (4, 0.2)],
        };
        let estimator = Estimator::new(EstimatorConfig::default(), solver);
        let record = estimator.estimate("AGA", "sc").unwrap();
        assert_eq!(record.n_stable, 5);
        assert_eq!(record.stable_states.len(), 3);
    }

    #[test]
    fn test_empty_distribution_is_an_error() {
        let solver = ScriptedSolver {
            value: 0.0,
            states: vec![],
        };
        let estimator = Estimator::new(EstimatorConfig::default(), solver);
        assert!(matches!(
            estimator.estimate("AV", "sc"),
            Err(FoldError::EmptyDistribution)
        ));
    }

    #[test]
    fn test_unknown_lattice_is_an_error() {
        let estimator = Estimator::new(EstimatorConfig::default(), ExactSolver::new());
        assert!(matches!(
            estimator.estimate("AV", "diamond"),
            Err(FoldError::UnknownStructure(_))
        ));
    }

    #[test]
    fn test_exact_energy_matches_qubo_minimum() {
        let config = EstimatorConfig::default();
        let sequence = Sequence::parse("AV").unwrap();
        let problem = FoldProblem::build(&sequence, LatticeType::Sc, &config).unwrap();
        let (_, qubo_min) = problem.qubo.brute_force_minimum().unwrap();

        let estimator = Estimator::new(config, ExactSolver::new());
        let report = estimator.run(&sequence, LatticeType::Sc).unwrap();
        assert!((report.record.energy - qubo_min).abs() < 1e-6 * qubo_min.abs().max(1.0));
        assert_eq!(report.dominant_fold.sites.len(), 2);
    }
}
