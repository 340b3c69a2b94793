//! VQE against the folding pipeline and the exact reference solver.

use eigenfold_core::{
    Estimator, EstimatorConfig, ExactSolver, FoldProblem, LatticeType, MinimumEigensolver,
    Sequence,
};
use eigenfold_vqe::{AnsatzKind, Gate, OptimizerKind, Statevector, VqeConfig, VqeSolver};
use proptest::prelude::*;

fn av_problem() -> FoldProblem {
    FoldProblem::build(
        &Sequence::parse("AV").unwrap(),
        LatticeType::Sc,
        &EstimatorConfig::default(),
    )
    .unwrap()
}

// ---------------------------------------------------------------------------
// Variational bound
// ---------------------------------------------------------------------------

#[test]
fn vqe_energy_never_beats_exact_minimum() {
    let problem = av_problem();
    let exact = ExactSolver::new()
        .compute_minimum_eigenvalue(&problem.hamiltonian)
        .unwrap();

    for ansatz in [AnsatzKind::HardwareEfficient, AnsatzKind::TwoLocal] {
        let solver = VqeSolver::default().with_ansatz(ansatz).with_maxiter(60);
        let output = solver.compute_minimum_eigenvalue(&problem.hamiltonian).unwrap();
        assert!(
            output.optimal_value >= exact.optimal_value - 1e-9,
            "{ansatz}: {} < {}",
            output.optimal_value,
            exact.optimal_value
        );
    }
}

#[test]
fn spsa_runs_through_the_solver_interface() {
    let problem = av_problem();
    let solver = VqeSolver::new(VqeConfig {
        optimizer: OptimizerKind::Spsa,
        maxiter: 40,
        ..VqeConfig::default()
    })
    .unwrap();
    let output = solver.compute_minimum_eigenvalue(&problem.hamiltonian).unwrap();
    let total: f64 = output.distribution.values().sum();
    assert!((total - 1.0).abs() < 1e-6);
}

// ---------------------------------------------------------------------------
// Estimator integration
// ---------------------------------------------------------------------------

#[test]
fn estimator_with_vqe_produces_consistent_record() {
    let estimator = Estimator::new(
        EstimatorConfig::default(),
        VqeSolver::default().with_maxiter(40),
    );
    let report = estimator
        .run(&Sequence::parse("AGV").unwrap(), LatticeType::Sc)
        .unwrap();
    let record = &report.record;

    assert_eq!(record.num_residues, 3);
    assert_eq!(record.n_qubits, 6);
    assert_eq!(record.dominant_state.len(), record.n_qubits);
    assert!(record.entropy >= 0.0 && record.entropy <= record.n_qubits as f64 + 1e-9);
    assert!(record.stable_states.len() <= 3);
    assert!(record.stable_p_sum <= 1.0 + 1e-9);
    assert_eq!(report.optimal_params.len(), 2 * 6 * 3);
}

#[test]
fn too_wide_problems_are_refused() {
    let estimator = Estimator::new(
        EstimatorConfig::default(),
        VqeSolver::new(VqeConfig {
            max_qubits: 4,
            ..VqeConfig::default()
        })
        .unwrap(),
    );
    let err = estimator.estimate("AVGL", "fcc").unwrap_err();
    assert!(err.to_string().contains("vqe"));
}

// ---------------------------------------------------------------------------
// Statevector invariants
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn ansatz_states_stay_normalized(
        params in prop::collection::vec(-3.2f64..3.2, 18),
    ) {
        let gates = eigenfold_vqe::Ansatz::new(AnsatzKind::HardwareEfficient, 3, 2)
            .build(&params)
            .unwrap();
        prop_assert!(gates.iter().any(|g| matches!(g, Gate::Cz(..))));
        let state = Statevector::from_gates(3, &gates).unwrap();
        prop_assert!((state.norm_sqr() - 1.0).abs() < 1e-9);
    }
}
