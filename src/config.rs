//! Configuration loading
//!
//! Sources, lowest precedence first:
//! 1. built-in defaults
//! 2. TOML file (`parley.toml`, `PARLEY_CONFIG_PATH`, or the builder's path)
//! 3. environment (`PARLEY_` prefix, `__` between nested keys, plus
//!    `PARLEY_DATABASE_URL`)
//! 4. builder overrides
//!
//! A `.env` file in the working directory is loaded first.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

use crate::lifecycle::DEFAULT_PLATFORM;

const DEFAULT_CONFIG_FILE: &str = "parley.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Platform tag merged into every session's variables
    pub platform: String,
    pub log: LogConfig,
    pub database: DatabaseConfig,
    pub metadata: MetadataConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Default `EnvFilter` directive; `RUST_LOG` takes precedence
    pub filter: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
    pub idle_timeout_secs: u64,
    pub max_lifetime_secs: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetadataConfig {
    /// JSON file holding the version metadata
    pub version_path: Option<PathBuf>,
}

impl Config {
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Load configuration with no overrides
    pub fn load() -> Result<Self> {
        Self::builder().build()
    }
}

impl DatabaseConfig {
    pub fn require_url(&self) -> Result<&str> {
        self.url.as_deref().context(
            "No database URL configured\n\n\
            Set PARLEY_DATABASE_URL, pass --database-url, or add `url` under [database] in parley.toml",
        )
    }
}

/// Builder for loading `Config` with explicit overrides
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    database_url: Option<String>,
    config_path: Option<PathBuf>,
    version_path: Option<PathBuf>,
    platform: Option<String>,
}

impl ConfigBuilder {
    pub fn database_url(mut self, url: Option<String>) -> Self {
        self.database_url = url;
        self
    }

    pub fn config_path(mut self, path: Option<PathBuf>) -> Self {
        self.config_path = path;
        self
    }

    pub fn version_path(mut self, path: Option<PathBuf>) -> Self {
        self.version_path = path;
        self
    }

    pub fn platform(mut self, platform: Option<String>) -> Self {
        self.platform = platform;
        self
    }

    pub fn build(self) -> Result<Config> {
        dotenvy::dotenv().ok();

        // An explicitly named file must exist; the default one is optional
        let (path, required) = match self
            .config_path
            .or_else(|| env::var("PARLEY_CONFIG_PATH").ok().map(PathBuf::from))
        {
            Some(path) => (path, true),
            None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        };

        let mut builder = config::Config::builder()
            .set_default("platform", DEFAULT_PLATFORM)?
            .set_default("log.filter", "info")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 1)?
            .set_default("database.acquire_timeout_secs", 30)?
            .set_default("database.idle_timeout_secs", 600)?
            .set_default("database.max_lifetime_secs", 1800)?
            .add_source(config::File::from(path.clone()).required(required))
            .add_source(
                config::Environment::with_prefix("PARLEY")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        let database_url = self
            .database_url
            .or_else(|| env::var("PARLEY_DATABASE_URL").ok());
        if let Some(url) = database_url {
            builder = builder.set_override("database.url", url)?;
        }
        if let Some(version_path) = self.version_path {
            builder = builder.set_override(
                "metadata.version_path",
                version_path.display().to_string(),
            )?;
        }
        if let Some(platform) = self.platform {
            builder = builder.set_override("platform", platform)?;
        }

        let config: Config = builder
            .build()
            .and_then(|c| c.try_deserialize())
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?;

        if config.database.min_connections > config.database.max_connections {
            anyhow::bail!(
                "database.min_connections ({}) exceeds database.max_connections ({})",
                config.database.min_connections,
                config.database.max_connections
            );
        }

        Ok(config)
    }
}
