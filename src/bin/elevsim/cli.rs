use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "elevsim", version, about = "Discrete-event simulator for a bank of elevators")]
pub struct Cli {
    /// Path to a TOML file overriding the embedded defaults.
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the effective configuration and exit.
    Config,
    /// Run one simulation, driven by a synthetic demo workload.
    Run {
        /// Stop once no events remain, rather than at a fixed time bound.
        #[arg(long)]
        until: Option<f64>,
        /// Number of requests the demo workload generates.
        #[arg(long, default_value_t = 200)]
        requests: usize,
        /// Mean interarrival time between requests, in simulated time units.
        #[arg(long, default_value_t = 2.0)]
        interarrival: f64,
        /// Overrides the configured seed for the demo workload's RNG.
        #[arg(long)]
        seed: Option<String>,
        /// Directory to write request-latency traces into.
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,
    },
}
