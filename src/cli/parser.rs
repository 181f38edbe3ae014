//! Command line definition.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use super::validation::{
    validate_config_file_path, validate_host_address, validate_port, validate_rollback_steps,
};
use crate::config::Environment as AppEnvironment;

/// Inventory and sales backend for a parts warehouse
#[derive(Parser, Debug)]
#[command(name = "warehouse")]
#[command(about = "Inventory and sales backend for a parts warehouse")]
#[command(long_about = "
Warehouse serves the inventory, sales and sales report API and manages its
PostgreSQL schema.

EXAMPLES:
    # Start the server with the layered configuration in ./config
    warehouse serve

    # Bind to all interfaces on port 8080
    warehouse serve --host 0.0.0.0 --port 8080

    # Validate configuration without starting
    warehouse --env production serve --dry-run

    # Apply pending migrations, or list them first
    warehouse migrate
    warehouse migrate --dry-run

    # Revert the last migration
    warehouse migrate --rollback 1
")]
#[command(version = crate::pkg_version(), long_version = crate::clap_long_version())]
pub struct Cli {
    /// Subcommand to execute, `serve` when omitted
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Single TOML configuration file to load instead of the layered files
    #[arg(
        short,
        long,
        global = true,
        value_name = "FILE",
        value_parser = validate_config_file_path
    )]
    pub config: Option<PathBuf>,

    /// Environment whose configuration file is layered over default.toml
    #[arg(short, long, global = true, value_enum)]
    pub env: Option<Environment>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log errors only
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Start the HTTP server
    Serve {
        /// Address to bind, e.g. 127.0.0.1 or 0.0.0.0
        #[arg(long, value_name = "ADDRESS", value_parser = validate_host_address)]
        host: Option<String>,

        /// TCP port to listen on (1-65535)
        #[arg(short, long, value_name = "PORT", value_parser = validate_port)]
        port: Option<u16>,

        /// Log level, overriding --verbose/--quiet and the configuration
        #[arg(long, value_enum)]
        log_level: Option<LogLevel>,

        /// Validate and print the configuration, then exit
        #[arg(long)]
        dry_run: bool,
    },
    /// Apply, list or revert database migrations
    Migrate {
        /// List pending migrations without applying them
        #[arg(long, conflicts_with = "rollback")]
        dry_run: bool,

        /// Revert this many of the most recently applied migrations
        #[arg(long, value_name = "STEPS", value_parser = validate_rollback_steps)]
        rollback: Option<u32>,
    },
}

impl Default for Commands {
    fn default() -> Self {
        Self::Serve {
            host: None,
            port: None,
            log_level: None,
            dry_run: false,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Environment {
    #[value(name = "development", alias = "dev")]
    Development,
    #[value(name = "production", alias = "prod")]
    Production,
    #[value(name = "test")]
    Test,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogLevel {
    #[value(name = "error")]
    Error,
    #[value(name = "warn", alias = "warning")]
    Warn,
    #[value(name = "info")]
    Info,
    #[value(name = "debug")]
    Debug,
    #[value(name = "trace")]
    Trace,
}

impl Cli {
    /// The subcommand to run, defaulting to `serve`
    pub fn subcommand(&self) -> Commands {
        self.command.clone().unwrap_or_default()
    }
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

impl From<Environment> for AppEnvironment {
    fn from(env: Environment) -> Self {
        match env {
            Environment::Development => AppEnvironment::Development,
            Environment::Production => AppEnvironment::Production,
            Environment::Test => AppEnvironment::Test,
        }
    }
}
