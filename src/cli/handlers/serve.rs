//! `serve` subcommand.

use crate::config::{Environment, Settings};
use crate::server::Server;

pub struct ServeCommandHandler {
    config: Settings,
    environment: Environment,
}

impl ServeCommandHandler {
    pub fn new(config: Settings, environment: Environment) -> Self {
        Self {
            config,
            environment,
        }
    }

    /// Prints the effective configuration (`dry_run`) or runs the server
    /// until shutdown.
    pub async fn execute(self, dry_run: bool) -> anyhow::Result<()> {
        if dry_run {
            println!("{}", self.summary());
            println!("Dry run completed, configuration is valid");
            return Ok(());
        }

        Server::new(self.config, self.environment).run().await
    }

    /// Effective configuration without secrets
    pub fn summary(&self) -> String {
        let c = &self.config;
        format!(
            "environment:    {}\n\
             listen address: {}\n\
             body limit:     {} bytes\n\
             database pool:  {}-{} connections, auto_migrate={}\n\
             token lifetime: {}h\n\
             log level:      {}\n\
             cors origins:   {}\n\
             image provider: {:?}",
            self.environment,
            c.server.address(),
            c.server.body_limit,
            c.database.min_connections,
            c.database.max_connections,
            c.database.auto_migrate,
            c.jwt.expiration_hours,
            c.logger.level,
            c.cors.allowed_origins.join(", "),
            c.images.provider,
        )
    }
}
