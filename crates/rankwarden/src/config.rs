//! Layered configuration for Rankwarden.
//!
//! Sources, later ones overriding earlier ones:
//! - Bundled defaults (include_str! from rankwarden.toml)
//! - `~/.config/rankwarden/rankwarden.toml`
//! - `./rankwarden.toml`
//! - `RANKWARDEN__SECTION__KEY` environment variables

use config::{Config, Environment, File, FileFormat};
use derive_getters::Getters;
use rankwarden_database::{StoreConfig, StoreConfigBuilder};
use rankwarden_error::{ConfigError, RankwardenError, RankwardenResult};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

/// Bundled default configuration.
pub const DEFAULT_CONFIG: &str = include_str!("../rankwarden.toml");

/// Prefix for environment overrides.
pub const ENV_PREFIX: &str = "RANKWARDEN";

/// Connection target.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Getters)]
pub struct DatabaseSection {
    /// Full connection URL; takes precedence over the fields below
    #[serde(default)]
    url: Option<String>,
    /// Database host
    host: String,
    /// Database port
    port: u16,
    /// Login role
    username: String,
    /// Login password
    password: String,
    /// Database name
    database: String,
}

/// Connection pool sizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Getters)]
pub struct PoolSection {
    /// Maximum pooled connections
    max_size: u32,
    /// How long to wait for a pooled connection (milliseconds)
    connection_timeout_millis: u64,
}

/// Blocking worker sizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Getters)]
pub struct WorkerSection {
    /// Maximum statements running at once
    threads: usize,
}

/// Top-level Rankwarden configuration.
///
/// # Example
///
/// ```no_run
/// use rankwarden::RankwardenConfig;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = RankwardenConfig::load()?;
/// println!("Pool size: {}", config.pool().max_size());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Getters)]
pub struct RankwardenConfig {
    /// Connection target
    database: DatabaseSection,
    /// Pool sizing
    pool: PoolSection,
    /// Worker sizing
    workers: WorkerSection,
}

impl RankwardenConfig {
    /// Load from every standard location.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if a present file or variable cannot be
    /// parsed.
    #[instrument]
    pub fn load() -> RankwardenResult<Self> {
        let mut files = Vec::new();
        if let Some(home) = dirs::home_dir() {
            files.push(home.join(".config/rankwarden/rankwarden.toml"));
        }
        files.push(PathBuf::from("rankwarden.toml"));

        Self::load_layered(&files, Self::environment())
    }

    /// Load bundled defaults overlaid with `files` (each optional) and then
    /// `environment`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if a source cannot be parsed.
    pub fn load_layered(files: &[PathBuf], environment: Environment) -> RankwardenResult<Self> {
        let mut builder =
            Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

        for path in files {
            debug!(path = %path.display(), "Adding optional configuration file");
            builder = builder.add_source(File::from(path.as_path()).required(false));
        }

        builder
            .add_source(environment)
            .build()
            .map_err(|e| config_error(format!("Failed to build configuration: {}", e)))?
            .try_deserialize()
            .map_err(|e| config_error(format!("Failed to parse configuration: {}", e)))
    }

    /// Load from one file only, on top of the bundled defaults.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the file is missing or invalid.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> RankwardenResult<Self> {
        Config::builder()
            .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
            .add_source(File::from(path.as_ref()))
            .build()
            .map_err(|e| {
                config_error(format!(
                    "Failed to read configuration from {}: {}",
                    path.as_ref().display(),
                    e
                ))
            })?
            .try_deserialize()
            .map_err(|e| config_error(format!("Failed to parse configuration: {}", e)))
    }

    /// Environment source reading `RANKWARDEN__SECTION__KEY` variables.
    pub fn environment() -> Environment {
        Environment::with_prefix(ENV_PREFIX)
            .separator("__")
            .try_parsing(true)
    }

    /// Replace the connection URL.
    pub fn with_database_url(mut self, url: impl Into<String>) -> Self {
        self.database.url = Some(url.into());
        self
    }

    /// Settings for the pooled store client.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the pool or worker count is zero.
    pub fn store_config(&self) -> RankwardenResult<StoreConfig> {
        if self.pool.max_size == 0 {
            return Err(config_error("pool.max_size must be at least 1"));
        }
        if self.workers.threads == 0 {
            return Err(config_error("workers.threads must be at least 1"));
        }

        StoreConfigBuilder::default()
            .url(self.database.url.clone())
            .host(self.database.host.clone())
            .port(self.database.port)
            .username(self.database.username.clone())
            .password(self.database.password.clone())
            .database(self.database.database.clone())
            .max_pool_size(self.pool.max_size)
            .connection_timeout_millis(self.pool.connection_timeout_millis)
            .worker_threads(self.workers.threads)
            .build()
            .map_err(|e| config_error(format!("Invalid store configuration: {}", e)))
    }
}

#[track_caller]
fn config_error(message: impl Into<String>) -> RankwardenError {
    RankwardenError::from(ConfigError::new(message))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_defaults_parse() {
        let environment = RankwardenConfig::environment().source(Some(config::Map::new()));
        let config = RankwardenConfig::load_layered(&[], environment).unwrap();
        assert_eq!(config.database().host(), "localhost");
        assert_eq!(*config.database().port(), 5432);
        assert_eq!(*config.pool().max_size(), 10);
        assert_eq!(*config.workers().threads(), 4);
    }
}
