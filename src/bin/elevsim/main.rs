use clap::Parser;
use elevsim::Result;

mod cli;
mod commands;
mod monitor;
mod workload;

use cli::{Cli, Command};

fn main() -> Result<()> {
    let _guard = elevsim::logging::setup()?;

    let cli = Cli::parse();
    match cli.command {
        Command::Config => commands::config(cli.config.as_deref()),
        Command::Run {
            until,
            requests,
            interarrival,
            seed,
            output,
        } => commands::run(cli.config.as_deref(), until, requests, interarrival, seed, output),
    }
}
