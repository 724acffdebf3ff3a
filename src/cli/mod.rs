use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod commands;
pub mod render;

#[derive(Parser)]
#[command(name = "powder-dispenser")]
#[command(about = "Simulated laboratory powder-dispensing workflow")]
#[command(long_about = "Select a product from the generated catalog, approve a target weight and watch \
                       the simulated dispenser add powder until the weight lands within ±5% of the target. \
                       Get started with 'powder-dispenser run --ndc 0'.")]
pub struct Cli {
    /// Seed every random source for a reproducible session
    #[arg(long, global = true, help = "Seed for catalog, batch, target and increment generation")]
    pub seed: Option<u64>,
    /// Override the sampling period of a dispensing run
    #[arg(long, global = true, help = "Milliseconds between weight samples")]
    pub tick_ms: Option<u64>,
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the product identifiers available for selection
    Catalog {
        /// Print the catalog as JSON
        #[arg(long)]
        json: bool,
    },
    /// Select a product, approve it and dispense until the target is reached
    Run {
        /// Catalog index (0-based) or a product identifier such as 12345-6789-01
        #[arg(long, help = "Catalog index or product identifier to dispense")]
        ndc: String,
        /// Print the final state as JSON instead of progress lines
        #[arg(long)]
        json: bool,
    },
    /// Interactive session reading commands from stdin
    Shell,
    /// Print the effective configuration as TOML
    Config {
        /// Write the configuration to this file instead of printing it
        #[arg(long, value_name = "PATH")]
        write: Option<PathBuf>,
    },
}
