//! Command line interface: argument parsing, configuration merging and
//! subcommand execution.

pub mod config_merger;
pub mod executor;
pub mod handlers;
pub mod parser;
pub mod validation;

pub use config_merger::ConfigurationMerger;
pub use executor::execute_command;
pub use parser::{Cli, Commands, Environment, LogLevel};

use anyhow::Context;

use crate::logger::init_logger;

/// Loads configuration for `cli`, installs the logger and runs the command.
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let merger = ConfigurationMerger::from_cli(&cli).context("Failed to load configuration")?;
    let settings = merger
        .merge_cli_args(&cli)
        .context("Invalid configuration")?;

    let logger_config = settings.logger.clone().into_logger_config()?;
    init_logger(logger_config).context("Failed to initialize logger")?;

    execute_command(&cli, settings, merger.environment()).await
}
