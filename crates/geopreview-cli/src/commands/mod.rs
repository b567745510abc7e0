//! Command implementations

mod catalog;
mod config;
mod encode;
mod raster;
mod vector;

use crate::cli::{Cli, Commands};
use crate::output::OutputWriter;
use anyhow::Result;

/// Execute a CLI command
pub fn execute(cli: Cli) -> Result<()> {
    let output = OutputWriter::new(cli.json);
    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Vector(args) => vector::execute(args, &output, config_path),
        Commands::Raster(args) => raster::execute(args, &output, config_path),
        Commands::Catalog(args) => catalog::execute(args, &output),
        Commands::Encode(args) => encode::execute(args, &output),
        Commands::Config => config::execute(&output, config_path),
    }
}
