//! `migrate` subcommand.

use crate::config::Settings;
use crate::db::{pending_migrations, revert_migrations, run_pending_migrations};
use crate::error::AppResult;

pub struct MigrateCommandHandler {
    config: Settings,
}

impl MigrateCommandHandler {
    pub fn new(config: Settings) -> Self {
        Self { config }
    }

    /// Lists pending migrations (`dry_run`), reverts `rollback` migrations,
    /// or applies everything pending.
    ///
    /// # Errors
    /// - invalid database settings
    /// - connection or migration failures
    pub async fn execute(&self, dry_run: bool, rollback: Option<u32>) -> AppResult<()> {
        self.config.database.validate()?;
        let url = &self.config.database.url;

        if dry_run {
            let pending = pending_migrations(url).await?;
            if pending.is_empty() {
                println!("No pending migrations, database is up to date");
            } else {
                println!("{} pending migration(s):", pending.len());
                print_list(&pending);
                println!("Run without --dry-run to apply them");
            }
            return Ok(());
        }

        if let Some(steps) = rollback {
            let reverted = revert_migrations(url, steps).await?;
            tracing::info!(count = reverted.len(), "Migrations reverted");
            println!("Reverted {} migration(s):", reverted.len());
            print_list(&reverted);
            return Ok(());
        }

        let applied = run_pending_migrations(url).await?;
        tracing::info!(count = applied.len(), "Migrations applied");
        if applied.is_empty() {
            println!("No migrations to apply, database is up to date");
        } else {
            println!("Applied {} migration(s):", applied.len());
            print_list(&applied);
        }
        Ok(())
    }
}

fn print_list(names: &[String]) {
    for name in names {
        println!("  - {}", name);
    }
}
