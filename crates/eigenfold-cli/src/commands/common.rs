//! Shared helpers for CLI commands.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use eigenfold_core::{EstimatorConfig, ExactSolver, MinimumEigensolver};
use eigenfold_vqe::{AnsatzKind, VqeConfig, VqeSolver};

/// Solver selection shared by `fold` and `sweep`.
#[derive(Args, Debug, Clone)]
pub struct SolverArgs {
    /// Minimum-eigenvalue solver (vqe, exact)
    #[arg(long, default_value = "vqe")]
    pub solver: String,

    /// VQE ansatz (hardware_efficient, two_local)
    #[arg(long)]
    pub ansatz: Option<String>,

    /// VQE entangle-then-rotate repetitions
    #[arg(long)]
    pub reps: Option<usize>,

    /// Maximum optimizer iterations
    #[arg(long)]
    pub maxiter: Option<usize>,

    /// Sample the final state with this many shots instead of exact probabilities
    #[arg(long)]
    pub shots: Option<u32>,

    /// Seed for initial parameters and sampling
    #[arg(long)]
    pub seed: Option<u64>,
}

/// Build the solver named in `args`.
pub fn build_solver(args: &SolverArgs) -> Result<Box<dyn MinimumEigensolver>> {
    match args.solver.to_lowercase().as_str() {
        "vqe" => {
            let mut config = VqeConfig::default();
            if let Some(ansatz) = &args.ansatz {
                config.ansatz = ansatz.parse::<AnsatzKind>()?;
            }
            if let Some(reps) = args.reps {
                config.reps = reps;
            }
            if let Some(maxiter) = args.maxiter {
                config.maxiter = maxiter;
            }
            if let Some(seed) = args.seed {
                config.seed = seed;
            }
            config.shots = args.shots;
            let solver = VqeSolver::new(config)?;
            Ok(Box::new(solver))
        }
        "exact" => Ok(Box::new(ExactSolver::new())),
        other => {
            anyhow::bail!("Unknown solver: '{other}'. Available: vqe, exact");
        }
    }
}

/// Load estimator settings from an optional YAML file plus environment.
pub fn load_config(path: Option<&Path>) -> Result<EstimatorConfig> {
    if let Some(path) = path {
        if !path.exists() {
            anyhow::bail!("File not found: {}", path.display());
        }
    }
    EstimatorConfig::load(path).context("Failed to load estimator configuration")
}

/// Read peptides from a file, one per line; blank lines and `#` comments are skipped.
pub fn read_peptides(path: &Path) -> Result<Vec<String>> {
    let source = fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;
    Ok(parse_peptide_list(&source))
}

pub fn parse_peptide_list(source: &str) -> Vec<String> {
    source
        .lines()
        .map(|line| line.split('#').next().unwrap_or("").trim())
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Create a progress bar for batch runs.
pub fn create_progress_bar(len: u64, message: &str) -> ProgressBar {
    let pb = ProgressBar::new(len);
    let template = ProgressStyle::with_template(
        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
    )
    .map(|s| s.progress_chars("#>-"))
    .unwrap_or_else(|_| ProgressStyle::default_bar());
    pb.set_style(template);
    pb.set_message(message.to_string());
    pb
}

/// Print a section header.
pub fn print_section(title: &str) {
    println!();
    println!("{}", style(format!("▶ {title}")).green().bold());
    println!("{}", style("─".repeat(40)).dim());
}

/// Print a result line.
pub fn print_result(label: &str, value: impl std::fmt::Display) {
    println!("  {} {}", style(format!("{label}:")).dim(), value);
}

/// Print a success message to stderr, keeping stdout clean for data.
pub fn print_success(message: &str) {
    eprintln!("{} {}", style("OK").green().bold(), message);
}
