//! CLI interface for pumpwatch
//!
//! Provides subcommands for:
//! - `run`: Start the scan loop
//! - `status`: Show the status reply for the loaded configuration
//! - `config`: Show the effective configuration

mod run;

pub use run::RunArgs;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "pumpwatch")]
#[command(about = "Pump/dump surveillance bot for top-ranked crypto assets")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the scan loop
    Run(RunArgs),
    /// Show the status reply for the loaded configuration
    Status,
    /// Show the effective configuration
    Config,
}
