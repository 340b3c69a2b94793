//! Fold command implementation.
//!
//! `eigenfold fold --sequence <SEQ> [--lattice fcc] [--solver vqe|exact] [--json]`

use std::path::Path;

use anyhow::Result;
use console::style;

use eigenfold_core::export::{ExportConfig, to_json};
use eigenfold_core::{Estimator, FoldReport, LatticeType, Sequence};

use super::common::{SolverArgs, build_solver, load_config, print_result, print_section};

/// Execute the fold command.
pub fn execute(
    sequence: &str,
    lattice: &str,
    config_path: Option<&Path>,
    solver_args: &SolverArgs,
    json: bool,
) -> Result<()> {
    let sequence = Sequence::parse(sequence)?;
    let structure: LatticeType = lattice.parse()?;
    let config = load_config(config_path)?;
    let solver = build_solver(solver_args)?;

    if !json {
        println!(
            "{} Folding {} on {} with {}",
            style("→").cyan().bold(),
            style(&sequence).green(),
            style(structure).yellow(),
            solver.name()
        );
    }

    let estimator = Estimator::new(config, solver);
    let report = estimator.run(&sequence, structure)?;

    if json {
        println!("{}", to_json(&report, &ExportConfig::default())?);
    } else {
        print_report(&report);
    }

    Ok(())
}

fn print_report(report: &FoldReport) {
    let record = &report.record;

    print_section("Problem");
    print_result("Sequence", format!("{} ({})", record.peptide, report.hp));
    print_result("Lattice", format!("{} ({} sites)", record.lattice, record.num_sites));
    print_result(
        "Qubits",
        format!("{} (density {:.2})", record.n_qubits, record.qubit_density),
    );
    print_result("Terms", report.num_terms);

    print_section("Result");
    print_result("Energy", format!("{:.4}", record.energy));
    print_result(
        "Dominant",
        format!("{} (p = {:.4})", record.dominant_state, record.dominant_p),
    );
    print_result("Sites", format!("{:?}", report.dominant_fold.sites));
    print_result(
        "Self-avoiding",
        if report.dominant_fold.is_self_avoiding() {
            style("yes").green()
        } else {
            style("no").red()
        },
    );
    print_result("Entropy", format!("{:.4} bits", record.entropy));
    print_result("Time", format!("{:.3}s", record.time));

    if !report.stable_folds.is_empty() {
        print_section(&format!("Stable states ({})", record.n_stable));
        for fold in &report.stable_folds {
            println!(
                "  {}  p = {:.4}  sites {:?}",
                style(&fold.bitstring).cyan(),
                fold.probability,
                fold.sites
            );
        }
        print_result("Total p", format!("{:.4}", record.stable_p_sum));
    }
}
