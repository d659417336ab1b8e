//! epiclass CLI: the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

use epiclass_core::model::Intervention;

mod commands;

#[derive(Parser)]
#[command(
    name = "epiclass",
    version,
    about = "Classroom epidemiology: SEIR outbreak simulator and adaptive quiz"
)]
struct Cli {
    /// Config file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a single SEIR simulation
    Simulate(commands::simulate::SimulateArgs),

    /// Run a scenario set and compare it against its baseline
    Compare {
        /// Path to a scenario set .toml file
        #[arg(long)]
        scenarios: PathBuf,

        /// Write the comparison report JSON here
        #[arg(long)]
        output: Option<PathBuf>,

        /// Output format: text, json, markdown
        #[arg(long, default_value = "text")]
        format: String,

        /// Max scenarios simulated at once
        #[arg(long)]
        parallelism: Option<usize>,
    },

    /// Take the adaptive quiz
    Quiz {
        /// Question bank file or directory
        #[arg(long)]
        bank: Option<PathBuf>,

        /// Maximum number of questions
        #[arg(long)]
        max_questions: Option<usize>,

        /// RNG seed for a reproducible question order
        #[arg(long)]
        seed: Option<u64>,

        /// Save the finished session as JSON
        #[arg(long)]
        save: Option<PathBuf>,
    },

    /// Risk ratio and odds ratio from a 2x2 table
    Stats {
        /// Exposed individuals with the outcome
        #[arg(long)]
        exposed_cases: f64,

        /// Exposed individuals without the outcome
        #[arg(long)]
        exposed_noncases: f64,

        /// Unexposed individuals with the outcome
        #[arg(long)]
        unexposed_cases: f64,

        /// Unexposed individuals without the outcome
        #[arg(long)]
        unexposed_noncases: f64,

        /// Add 0.5 to every cell when a cell is zero
        #[arg(long)]
        correct_zeros: bool,
    },

    /// Validate question bank and scenario set files
    Validate {
        /// Question bank file or directory
        #[arg(long)]
        bank: Option<PathBuf>,

        /// Scenario set file
        #[arg(long)]
        scenarios: Option<PathBuf>,
    },

    /// Create a starter config, question bank, and scenario set
    Init,
}

/// Parse a `DAY:REDUCTION` flag value.
pub(crate) fn parse_intervention(s: &str) -> Result<Intervention, String> {
    s.parse()
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("epiclass=info".parse().unwrap())
                .add_directive("epiclass_core=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();
    let config_path = cli.config;

    let result = match cli.command {
        Commands::Simulate(args) => commands::simulate::execute(args, config_path),
        Commands::Compare {
            scenarios,
            output,
            format,
            parallelism,
        } => commands::compare::execute(scenarios, output, format, parallelism, config_path).await,
        Commands::Quiz {
            bank,
            max_questions,
            seed,
            save,
        } => commands::quiz::execute(bank, max_questions, seed, save, config_path),
        Commands::Stats {
            exposed_cases,
            exposed_noncases,
            unexposed_cases,
            unexposed_noncases,
            correct_zeros,
        } => commands::stats::execute(
            exposed_cases,
            exposed_noncases,
            unexposed_cases,
            unexposed_noncases,
            correct_zeros,
        ),
        Commands::Validate { bank, scenarios } => commands::validate::execute(bank, scenarios),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
