//! Configuration loader for warehouse-rs
//!
//! This module provides the `ConfigLoader` struct that handles loading
//! configuration from multiple sources with proper precedence.

use std::path::{Path, PathBuf};

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File, FileFormat};

use crate::config::environment::Environment as AppEnvironment;
use crate::config::error::ConfigError;
use crate::config::settings::Settings;

/// Environment variable for configuration directory
const CONFIG_DIR_ENV: &str = "WAREHOUSE_CONFIG_DIR";

/// Environment variable for specific configuration file
const CONFIG_FILE_ENV: &str = "WAREHOUSE_CONFIG_FILE";

const DEFAULT_CONFIG_DIR: &str = "config";

/// Environment variable prefix for configuration overrides
const ENV_PREFIX: &str = "WAREHOUSE";

/// Separator for nested configuration keys in environment variables
const ENV_SEPARATOR: &str = "__";

/// Configuration loader that handles layered configuration loading
///
/// The loader supports the following configuration sources (in order of priority):
/// 1. `default.toml` - Base default configuration (required)
/// 2. `{environment}.toml` - Environment-specific configuration (optional)
/// 3. `local.toml` - Local development overrides (optional)
/// 4. `WAREHOUSE_*` environment variables (highest priority)
#[derive(Debug)]
pub struct ConfigLoader {
    config_dir: PathBuf,
    /// When set, layered loading is skipped and only this file is read
    config_file: Option<PathBuf>,
    environment: AppEnvironment,
}

impl ConfigLoader {
    /// Create a loader from `WAREHOUSE_CONFIG_DIR`, `WAREHOUSE_CONFIG_FILE`
    /// and `WAREHOUSE_APP_ENV`.
    ///
    /// # Errors
    ///
    /// Returns an error if both `WAREHOUSE_CONFIG_DIR` and
    /// `WAREHOUSE_CONFIG_FILE` are set.
    pub fn new() -> Result<Self, ConfigError> {
        let config_dir = std::env::var(CONFIG_DIR_ENV).ok().map(PathBuf::from);
        let config_file = std::env::var(CONFIG_FILE_ENV).ok().map(PathBuf::from);

        if config_dir.is_some() && config_file.is_some() {
            return Err(ConfigError::mutual_exclusivity(
                "WAREHOUSE_CONFIG_DIR and WAREHOUSE_CONFIG_FILE cannot both be set. \
                 Use WAREHOUSE_CONFIG_DIR for layered configuration or \
                 WAREHOUSE_CONFIG_FILE for a single configuration file.",
            ));
        }

        Ok(Self {
            config_dir: config_dir.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_DIR)),
            config_file,
            environment: AppEnvironment::from_env(),
        })
    }

    /// Layered loading from an explicit directory
    pub fn from_dir(config_dir: impl Into<PathBuf>, environment: AppEnvironment) -> Self {
        Self {
            config_dir: config_dir.into(),
            config_file: None,
            environment,
        }
    }

    /// Replace any layered sources with a single configuration file
    pub fn with_config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_file = Some(path.into());
        self
    }

    /// Override the environment detected from `WAREHOUSE_APP_ENV`
    pub fn with_environment(mut self, environment: AppEnvironment) -> Self {
        self.environment = environment;
        self
    }

    pub fn environment(&self) -> AppEnvironment {
        self.environment
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Load and validate configuration from all sources
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `default.toml` (or the explicit config file) is not found
    /// - Configuration parsing fails
    /// - Configuration validation fails
    pub fn load(&self) -> Result<Settings, ConfigError> {
        let settings = self.load_unvalidated()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load configuration without running validation.
    ///
    /// The CLI uses this so command line overrides are merged before the
    /// final validation pass.
    pub fn load_unvalidated(&self) -> Result<Settings, ConfigError> {
        let config = self.build_config()?;
        config.try_deserialize().map_err(|e| {
            ConfigError::ParseError(format!("Failed to deserialize configuration: {}", e))
        })
    }

    fn build_config(&self) -> Result<Config, ConfigError> {
        let builder = Config::builder();

        let builder = match self.config_file {
            Some(ref config_file) => add_file_source(builder, config_file, true)?,
            None => self.build_layered_config(builder)?,
        };

        // WAREHOUSE_SERVER__PORT -> server.port
        let builder = add_env_source(builder);

        builder.build().map_err(ConfigError::from)
    }

    fn build_layered_config(
        &self,
        builder: ConfigBuilder<DefaultState>,
    ) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        let default_path = self.config_dir.join("default.toml");
        let builder = add_file_source(builder, &default_path, true)?;

        let env_path = self
            .config_dir
            .join(format!("{}.toml", self.environment.as_str()));
        let builder = add_file_source(builder, &env_path, false)?;

        let local_path = self.config_dir.join("local.toml");
        add_file_source(builder, &local_path, false)
    }
}

fn add_file_source(
    builder: ConfigBuilder<DefaultState>,
    path: &Path,
    required: bool,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    if required && !path.exists() {
        return Err(ConfigError::file_not_found(format!(
            "Required configuration file not found: {}",
            path.display()
        )));
    }

    Ok(builder.add_source(File::from(path).format(FileFormat::Toml).required(required)))
}

/// `WAREHOUSE_` prefixed variables with `__` separating nested keys, e.g.
/// `WAREHOUSE_DATABASE__URL` -> `database.url`
fn add_env_source(builder: ConfigBuilder<DefaultState>) -> ConfigBuilder<DefaultState> {
    builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator(ENV_SEPARATOR)
            .ignore_empty(true)
            .try_parsing(true),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::Mutex;
    use tempfile::TempDir;

    // Tests touching process environment run one at a time
    static TEST_MUTEX: Mutex<()> = Mutex::new(());

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    fn setup_config_dir(files: &[(&str, &str)]) -> TempDir {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        for (name, content) in files {
            fs::write(temp_dir.path().join(name), content).expect("Failed to write config file");
        }
        temp_dir
    }

    fn default_toml() -> String {
        format!(
            r#"
[server]
host = "127.0.0.1"
port = 3000

[database]
url = "postgres://localhost/warehouse"

[jwt]
secret = "{SECRET}"
"#
        )
    }

    struct EnvGuard {
        vars_to_restore: Vec<(String, Option<String>)>,
    }

    impl EnvGuard {
        fn new() -> Self {
            Self {
                vars_to_restore: Vec::new(),
            }
        }

        fn set(&mut self, key: &str, value: &str) {
            self.vars_to_restore
                .push((key.to_string(), std::env::var(key).ok()));
            unsafe {
                std::env::set_var(key, value);
            }
        }

        fn remove(&mut self, key: &str) {
            self.vars_to_restore
                .push((key.to_string(), std::env::var(key).ok()));
            unsafe {
                std::env::remove_var(key);
            }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            for (key, original_value) in self.vars_to_restore.iter().rev() {
                unsafe {
                    match original_value {
                        Some(value) => std::env::set_var(key, value),
                        None => std::env::remove_var(key),
                    }
                }
            }
        }
    }

    #[test]
    fn test_new_defaults_to_config_dir() {
        let _lock = TEST_MUTEX.lock().unwrap();
        let mut env = EnvGuard::new();
        env.remove(CONFIG_DIR_ENV);
        env.remove(CONFIG_FILE_ENV);
        env.remove(AppEnvironment::ENV_VAR);

        let loader = ConfigLoader::new().unwrap();
        assert_eq!(loader.config_dir(), Path::new("config"));
        assert!(loader.config_file.is_none());
        assert_eq!(loader.environment(), AppEnvironment::Development);
    }

    #[test]
    fn test_new_rejects_dir_and_file_together() {
        let _lock = TEST_MUTEX.lock().unwrap();
        let mut env = EnvGuard::new();
        env.set(CONFIG_DIR_ENV, "/custom/config");
        env.set(CONFIG_FILE_ENV, "/custom/config/app.toml");

        match ConfigLoader::new() {
            Err(ConfigError::MutualExclusivityError(msg)) => {
                assert!(msg.contains(CONFIG_DIR_ENV));
                assert!(msg.contains(CONFIG_FILE_ENV));
            }
            other => panic!("Expected MutualExclusivityError, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_default_toml_fails() {
        let temp_dir = setup_config_dir(&[]);
        let loader = ConfigLoader::from_dir(temp_dir.path(), AppEnvironment::Development);

        assert!(matches!(loader.load(), Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_environment_file_overrides_default() {
        let _lock = TEST_MUTEX.lock().unwrap();
        let temp_dir = setup_config_dir(&[
            ("default.toml", &default_toml()),
            ("production.toml", "[server]\nport = 8080\n"),
        ]);

        let loader = ConfigLoader::from_dir(temp_dir.path(), AppEnvironment::Production);
        let settings = loader.load().unwrap();

        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.server.host, "127.0.0.1");
        assert_eq!(settings.jwt.expiration_hours, 24);
    }

    #[test]
    fn test_local_toml_has_priority_over_environment_file() {
        let _lock = TEST_MUTEX.lock().unwrap();
        let temp_dir = setup_config_dir(&[
            ("default.toml", &default_toml()),
            ("development.toml", "[server]\nport = 3001\n"),
            ("local.toml", "[server]\nport = 3002\n"),
        ]);

        let loader = ConfigLoader::from_dir(temp_dir.path(), AppEnvironment::Development);
        assert_eq!(loader.load().unwrap().server.port, 3002);
    }

    #[test]
    fn test_env_vars_have_highest_priority() {
        let _lock = TEST_MUTEX.lock().unwrap();
        let mut env = EnvGuard::new();
        let temp_dir = setup_config_dir(&[
            ("default.toml", &default_toml()),
            ("local.toml", "[server]\nport = 3002\n"),
        ]);
        env.set("WAREHOUSE_SERVER__PORT", "4000");
        env.set("WAREHOUSE_DATABASE__URL", "postgres://env-override/db");

        let loader = ConfigLoader::from_dir(temp_dir.path(), AppEnvironment::Development);
        let settings = loader.load().unwrap();

        assert_eq!(settings.server.port, 4000);
        assert_eq!(settings.database.url, "postgres://env-override/db");
    }

    #[test]
    fn test_single_file_mode_skips_layers() {
        let _lock = TEST_MUTEX.lock().unwrap();
        let temp_dir = setup_config_dir(&[
            ("default.toml", "[server]\nport = 1111\n"),
            ("app.toml", &default_toml()),
        ]);

        let loader = ConfigLoader::from_dir(temp_dir.path(), AppEnvironment::Development)
            .with_config_file(temp_dir.path().join("app.toml"));
        assert_eq!(loader.load().unwrap().server.port, 3000);
    }

    #[test]
    fn test_load_validates_settings() {
        let _lock = TEST_MUTEX.lock().unwrap();
        let temp_dir = setup_config_dir(&[(
            "default.toml",
            "[database]\nurl = \"postgres://localhost/warehouse\"\n[jwt]\nsecret = \"short\"\n",
        )]);

        let loader = ConfigLoader::from_dir(temp_dir.path(), AppEnvironment::Development);
        assert!(loader.load_unvalidated().is_ok());
        match loader.load() {
            Err(ConfigError::ValidationError { field, .. }) => assert_eq!(field, "jwt.secret"),
            other => panic!("Expected ValidationError, got {:?}", other),
        }
    }
}
