//! Sweep command implementation.
//!
//! Runs every (peptide, lattice) pair in parallel. A pair that fails is
//! logged and left out of the summary; the rest of the sweep continues.

use std::path::Path;

use anyhow::Result;
use console::style;
use rayon::prelude::*;

use eigenfold_core::export::{ExportConfig, to_file, write_csv_file};
use eigenfold_core::{Estimator, FoldRecord, LatticeType, MinimumEigensolver};

use super::common::{
    SolverArgs, build_solver, create_progress_bar, load_config, print_success, read_peptides,
};

/// Execute the sweep command.
pub fn execute(
    peptides: &[String],
    peptides_file: Option<&Path>,
    lattices: &[String],
    output: &Path,
    json_output: Option<&Path>,
    config_path: Option<&Path>,
    solver_args: &SolverArgs,
) -> Result<()> {
    let peptides = match peptides_file {
        Some(path) => read_peptides(path)?,
        None => peptides.to_vec(),
    };
    if peptides.is_empty() {
        anyhow::bail!("No peptides given");
    }

    let structures = lattices
        .iter()
        .map(|tag| tag.parse::<LatticeType>())
        .collect::<Result<Vec<_>, _>>()?;

    let config = load_config(config_path)?;
    let estimator = Estimator::new(config, build_solver(solver_args)?);

    let jobs: Vec<(&str, LatticeType)> = peptides
        .iter()
        .flat_map(|p| structures.iter().map(move |&s| (p.as_str(), s)))
        .collect();

    eprintln!(
        "{} Sweeping {} peptides x {} lattices with {}",
        style("→").cyan().bold(),
        peptides.len(),
        structures.len(),
        estimator.solver().name()
    );

    let records = run_jobs(&estimator, &jobs);
    let failed = jobs.len() - records.len();

    write_csv_file(&records, output)?;
    print_success(&format!(
        "{} records written to {}",
        records.len(),
        output.display()
    ));

    if let Some(path) = json_output {
        to_file(&records, path, &ExportConfig::default())?;
        print_success(&format!("JSON written to {}", path.display()));
    }

    if failed > 0 {
        eprintln!(
            "{} {}",
            style("!").yellow().bold(),
            failure_summary(failed, jobs.len())
        );
    }

    Ok(())
}

/// Closing note for a sweep with failures; each failure was already logged.
fn failure_summary(failed: usize, total: usize) -> String {
    format!("{failed} of {total} runs failed and were left out (see the warnings above)")
}

/// Estimate every job in parallel, keeping input order and dropping failures.
pub fn run_jobs<S: MinimumEigensolver>(
    estimator: &Estimator<S>,
    jobs: &[(&str, LatticeType)],
) -> Vec<FoldRecord> {
    let pb = create_progress_bar(jobs.len() as u64, "folding");

    let records: Vec<FoldRecord> = jobs
        .par_iter()
        .filter_map(|&(peptide, structure)| {
            let result = estimator.estimate(peptide, structure.tag());
            pb.inc(1);
            match result {
                Ok(record) => Some(record),
                Err(e) => {
                    tracing::warn!(peptide, lattice = %structure, error = %e, "fold failed");
                    None
                }
            }
        })
        .collect();

    pb.finish_and_clear();
    records
}
