//! Dispatches a parsed command once configuration is loaded.

use super::handlers::{MigrateCommandHandler, ServeCommandHandler};
use super::parser::{Cli, Commands};
use crate::config::{Environment, Settings};

pub async fn execute_command(
    cli: &Cli,
    settings: Settings,
    environment: Environment,
) -> anyhow::Result<()> {
    match cli.subcommand() {
        Commands::Serve { dry_run, .. } => {
            ServeCommandHandler::new(settings, environment)
                .execute(dry_run)
                .await
        }
        Commands::Migrate { dry_run, rollback } => {
            MigrateCommandHandler::new(settings)
                .execute(dry_run, rollback)
                .await?;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[tokio::test]
    async fn test_serve_dry_run_returns() {
        let cli = Cli::try_parse_from(["warehouse", "serve", "--dry-run"]).unwrap();
        let result = execute_command(&cli, Settings::default(), Environment::Test).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_migrate_errors_are_propagated() {
        let cli = Cli::try_parse_from(["warehouse", "migrate", "--dry-run"]).unwrap();
        let result = execute_command(&cli, Settings::default(), Environment::Test).await;
        assert!(result.is_err());
    }
}
