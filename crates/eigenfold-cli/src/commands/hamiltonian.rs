//! Hamiltonian command implementation.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Result;
use serde::Serialize;

use eigenfold_core::export::{ExportConfig, to_file, to_json};
use eigenfold_core::{FoldProblem, LatticeType, Sequence};

use super::common::{load_config, print_success};

/// JSON view of a folding Hamiltonian.
#[derive(Debug, Serialize)]
pub struct HamiltonianDump {
    pub peptide: String,
    pub lattice: String,
    pub num_qubits: usize,
    pub num_terms: usize,
    /// Offset carried over from the QUBO, in operator units.
    pub constant: f64,
    /// Factor the coefficients were divided by.
    pub scale: f64,
    /// Pauli label (most significant qubit first) to coefficient.
    pub terms: BTreeMap<String, f64>,
}

impl HamiltonianDump {
    pub fn from_problem(problem: &FoldProblem) -> Self {
        let h = &problem.hamiltonian;
        Self {
            peptide: problem.sequence.residues().to_string(),
            lattice: problem.lattice.structure.tag().to_string(),
            num_qubits: h.num_qubits(),
            num_terms: h.num_terms(),
            constant: h.constant(),
            scale: h.scale(),
            terms: h.label_map(),
        }
    }
}

/// Execute the hamiltonian command.
pub fn execute(
    sequence: &str,
    lattice: &str,
    config_path: Option<&Path>,
    output: Option<&Path>,
) -> Result<()> {
    let sequence = Sequence::parse(sequence)?;
    let structure: LatticeType = lattice.parse()?;
    let config = load_config(config_path)?;

    let problem = FoldProblem::build(&sequence, structure, &config)?;
    let dump = HamiltonianDump::from_problem(&problem);
    tracing::info!(
        qubits = dump.num_qubits,
        terms = dump.num_terms,
        "built Hamiltonian"
    );

    let export = ExportConfig::default();
    if let Some(path) = output {
        to_file(&dump, path, &export)?;
        print_success(&format!("Hamiltonian written to {}", path.display()));
    } else {
        println!("{}", to_json(&dump, &export)?);
    }

    Ok(())
}
