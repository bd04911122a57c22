use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
use commands::codes::{handle_codes_command, CodesArgs};
use commands::diabetes::{handle_diabetes_command, DiabetesArgs};

/// Fairness benchmark datasets, fetched, normalized and annotated.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load the Diabetes 130-US hospitals dataset
    Diabetes(DiabetesArgs),
    /// Print the integer code descriptions of the protected attributes
    Codes(CodesArgs),
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Diabetes(args) => handle_diabetes_command(args),
        Command::Codes(args) => handle_codes_command(args),
    }
}
