// CLI - Command Line Interface for the Casper FFG simulator
// Principle: Simple, clear, composable commands

pub mod runner;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Casper FFG simulator - drive the stake ledger over an in-memory chain
#[derive(Parser, Debug)]
#[command(name = "casper-sim")]
#[command(author = "Casper FFG Contributors")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Simulate Casper FFG validator accounting over an in-memory chain")]
#[command(long_about = r#"
Runs the Casper FFG engine against an in-memory chain: validators deposit,
vote, log out, get slashed and withdraw while epochs advance.

Simulate ten validators for thirty epochs, two of them offline:
  casper-sim simulate --validators 10 --epochs 30 --offline 2

Slash validator 0 and print a JSON report:
  casper-sim simulate --slash 0 --json

Write the default configuration:
  casper-sim config --output casper.json
"#)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true, default_value = "false")]
    pub verbose: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "info", env = "CASPER_LOG")]
    pub log_level: String,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a simulation
    Simulate(SimulateCmd),

    /// Write or check a configuration file
    Config(ConfigCmd),
}

/// Run a simulation
#[derive(Parser, Debug)]
pub struct SimulateCmd {
    /// Configuration file (JSON); defaults are used when absent
    #[arg(short, long, env = "CASPER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Number of validators inducted at genesis
    #[arg(long, default_value = "10")]
    pub validators: usize,

    /// Number of epochs to run
    #[arg(long, default_value = "30")]
    pub epochs: u64,

    /// Deposit per validator, in ether
    #[arg(long, default_value = "1000")]
    pub deposit: u64,

    /// Number of validators (the last ones) that never vote
    #[arg(long, default_value = "0")]
    pub offline: usize,

    /// Validator that double votes once it is active
    #[arg(long)]
    pub slash: Option<usize>,

    /// Validator that logs out once it is active
    #[arg(long)]
    pub logout: Option<usize>,

    /// Seed for validator key generation
    #[arg(long, default_value = "42")]
    pub seed: u64,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}

/// Write or check a configuration file
#[derive(Parser, Debug)]
pub struct ConfigCmd {
    /// Write the default configuration to this path
    #[arg(short, long, conflicts_with = "check")]
    pub output: Option<PathBuf>,

    /// Validate an existing configuration file
    #[arg(long)]
    pub check: Option<PathBuf>,
}
