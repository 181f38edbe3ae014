//! Configuration validation logic
//!
//! This module provides validation methods for all configuration structures
//! to ensure configuration values are within acceptable ranges and formats.

use crate::config::error::ConfigError;
use crate::config::settings::{
    DatabaseConfig, ImageProvider, ImagesConfig, JwtConfig, LoggerSettings, ServerConfig, Settings,
};

/// Minimum length of the HS256 signing secret
pub const MIN_JWT_SECRET_LEN: usize = 32;

const VALID_DATABASE_SCHEMES: &[&str] = &["postgres://", "postgresql://"];

impl ServerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::validation(
                "server.port",
                "Port must be between 1 and 65535. Please specify a valid port number.",
            ));
        }

        if self.body_limit == 0 {
            return Err(ConfigError::validation(
                "server.body_limit",
                "Body limit must be greater than 0 bytes.",
            ));
        }

        Ok(())
    }
}

impl DatabaseConfig {
    /// Validate database configuration
    ///
    /// # Validation Rules
    /// - URL must be a PostgreSQL connection string
    /// - Connection counts must be positive and min must not exceed max
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.url.is_empty() {
            return Err(ConfigError::validation(
                "database.url",
                "Database URL is required. Please specify a valid database connection string.",
            ));
        }

        if !VALID_DATABASE_SCHEMES
            .iter()
            .any(|scheme| self.url.starts_with(scheme))
        {
            return Err(ConfigError::validation(
                "database.url",
                "Invalid database URL format. Expected format: postgres://[user:password@]host[:port]/database",
            ));
        }

        if self.max_connections == 0 {
            return Err(ConfigError::validation(
                "database.max_connections",
                "Max connections must be greater than 0.",
            ));
        }

        if self.min_connections == 0 {
            return Err(ConfigError::validation(
                "database.min_connections",
                "Min connections must be greater than 0.",
            ));
        }

        if self.min_connections > self.max_connections {
            return Err(ConfigError::ValidationError {
                field: "database.min_connections".to_string(),
                message: format!(
                    "Min connections ({}) cannot exceed max connections ({}).",
                    self.min_connections, self.max_connections
                ),
            });
        }

        if self.connection_timeout == 0 {
            return Err(ConfigError::validation(
                "database.connection_timeout",
                "Connection timeout must be greater than 0 seconds.",
            ));
        }

        Ok(())
    }
}

impl JwtConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.secret.len() < MIN_JWT_SECRET_LEN {
            return Err(ConfigError::ValidationError {
                field: "jwt.secret".to_string(),
                message: format!(
                    "JWT secret must be at least {} characters long.",
                    MIN_JWT_SECRET_LEN
                ),
            });
        }

        if self.expiration_hours <= 0 {
            return Err(ConfigError::validation(
                "jwt.expiration_hours",
                "Token expiration must be at least 1 hour.",
            ));
        }

        Ok(())
    }
}

impl ImagesConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.provider == ImageProvider::Cloudflare {
            if self.cloudflare.account_id.trim().is_empty() {
                return Err(ConfigError::validation(
                    "images.cloudflare.account_id",
                    "Cloudflare account id is required when the cloudflare provider is enabled.",
                ));
            }
            if self.cloudflare.api_token.trim().is_empty() {
                return Err(ConfigError::validation(
                    "images.cloudflare.api_token",
                    "Cloudflare API token is required when the cloudflare provider is enabled.",
                ));
            }
        }

        if self.upload_timeout == 0 {
            return Err(ConfigError::validation(
                "images.upload_timeout",
                "Upload timeout must be greater than 0 seconds.",
            ));
        }

        Ok(())
    }
}

impl LoggerSettings {
    /// Validation is delegated to the runtime logger configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.clone().into_logger_config().map(|_| ())
    }
}

impl Settings {
    /// Validate all configuration settings, returning the first error found
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate()?;
        self.database.validate()?;
        self.jwt.validate()?;
        self.logger.validate()?;
        self.images.validate()?;
        Ok(())
    }
}
