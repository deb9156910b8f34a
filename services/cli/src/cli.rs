use crate::compute::{run_compute, ComputeArgs};
use crate::formula::{run_check_formula, CheckFormulaArgs};
use clap::{Parser, Subcommand};
use gradebook::config::AppConfig;
use gradebook::error::AppError;
use gradebook::telemetry;
use tracing::debug;

#[derive(Parser, Debug)]
#[command(
    name = "gradebook-cli",
    about = "Compute period grades, final grades and academic status from roster exports",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Grade every (student, subject) pair found in an assessment export
    Compute(ComputeArgs),
    /// Validate a final-grade formula and evaluate it against sample period grades
    CheckFormula(CheckFormulaArgs),
}

pub(crate) fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;
    debug!(environment = ?config.environment, "configuration loaded");

    match cli.command {
        Command::Compute(args) => run_compute(args, &config),
        Command::CheckFormula(args) => run_check_formula(args),
    }
}
