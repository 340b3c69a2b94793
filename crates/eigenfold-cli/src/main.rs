//! Eigenfold Command-Line Interface
//!
//! Lattice protein folding estimates from the terminal:
//!
//! ```text
//! eigenfold fold --sequence AVGLA --lattice fcc
//! eigenfold sweep --peptide AVG --peptide MFWY --lattices sc,fcc
//! eigenfold hamiltonian --sequence AVGL --output h.json
//! ```

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use console::style;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::common::SolverArgs;
use commands::{fold, hamiltonian, sweep};

/// Eigenfold - HP lattice protein folding via QUBO and VQE
#[derive(Parser)]
#[command(name = "eigenfold")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Estimate the fold of a single sequence on one lattice
    Fold {
        /// Amino-acid sequence (one-letter codes)
        #[arg(short, long)]
        sequence: String,

        /// Lattice structure (sc, bcc, fcc, hcp)
        #[arg(short, long, default_value = "fcc")]
        lattice: String,

        /// YAML estimator configuration
        #[arg(short, long)]
        config: Option<PathBuf>,

        #[command(flatten)]
        solver: SolverArgs,

        /// Print the full report as JSON instead of a summary
        #[arg(long)]
        json: bool,
    },

    /// Run every peptide against every lattice and write a CSV summary
    Sweep {
        /// Peptide sequence (repeatable)
        #[arg(short, long = "peptide", required_unless_present = "peptides_file")]
        peptides: Vec<String>,

        /// File with one peptide per line (`#` starts a comment)
        #[arg(long, conflicts_with = "peptides")]
        peptides_file: Option<PathBuf>,

        /// Lattice structures, comma separated
        #[arg(
            short,
            long,
            value_delimiter = ',',
            default_value = "sc,bcc,fcc,hcp"
        )]
        lattices: Vec<String>,

        /// CSV output path
        #[arg(short, long, default_value = "data/eigenfold_summary.csv")]
        output: PathBuf,

        /// Also write the records as a JSON array
        #[arg(long)]
        json_output: Option<PathBuf>,

        /// YAML estimator configuration
        #[arg(short, long)]
        config: Option<PathBuf>,

        #[command(flatten)]
        solver: SolverArgs,
    },

    /// Dump the Pauli Hamiltonian of a folding problem as JSON
    Hamiltonian {
        /// Amino-acid sequence (one-letter codes)
        #[arg(short, long)]
        sequence: String,

        /// Lattice structure (sc, bcc, fcc, hcp)
        #[arg(short, long, default_value = "fcc")]
        lattice: String,

        /// YAML estimator configuration
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .init();

    // Execute command
    let result = match cli.command {
        Commands::Fold {
            sequence,
            lattice,
            config,
            solver,
            json,
        } => fold::execute(&sequence, &lattice, config.as_deref(), &solver, json),

        Commands::Sweep {
            peptides,
            peptides_file,
            lattices,
            output,
            json_output,
            config,
            solver,
        } => sweep::execute(
            &peptides,
            peptides_file.as_deref(),
            &lattices,
            &output,
            json_output.as_deref(),
            config.as_deref(),
            &solver,
        ),

        Commands::Hamiltonian {
            sequence,
            lattice,
            config,
            output,
        } => hamiltonian::execute(&sequence, &lattice, config.as_deref(), output.as_deref()),
    };

    // Handle errors
    if let Err(e) = result {
        eprintln!("{} {}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}
