//! CLI interface for gmo-ticks
//!
//! Provides subcommands for:
//! - `run`: Start collecting ticks into the store
//! - `config`: Show the active configuration

mod run;

pub use run::RunArgs;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "gmo-ticks")]
#[command(about = "Durable tick collector for GMO Coin ticker streams")]
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
    /// Start collecting ticks into the store
    Run(RunArgs),
    /// Show the active configuration
    Config,
}
