use std::error::Error;

use clap::{Parser, Subcommand};
use commands::{
    query::{self, QueryArgs},
    report::{self, ReportArgs},
    version::{self, VersionArgs},
};

mod commands;

#[derive(Parser, Debug)]
#[command(name = "pwa", about = "Observables and error propagation for partial-wave fit results")]
struct Cli {
    /// Log verbosity level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: tracing::Level,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Evaluate every observable of one bin and write `report.json`.
    Report(ReportArgs),
    /// Print a single observable with its propagated error.
    Query(QueryArgs),
    /// Print the tool version.
    Version(VersionArgs),
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_max_level(cli.log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
    match cli.command {
        Command::Report(args) => report::run(&args),
        Command::Query(args) => query::run(&args),
        Command::Version(args) => version::run(&args),
    }
}
