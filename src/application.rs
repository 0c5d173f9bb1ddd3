//! Application wiring
//!
//! Bootstraps configuration, picks the session repository and version
//! fetcher, and assembles the services. Holds no global state.

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use crate::config::Config;
use crate::lifecycle::SessionInitializer;
use crate::metadata::{FileVersionFetcher, VersionFetcher};
use crate::persistence::{MemorySessionRepository, PgSessionRepository, SessionRepository};
use crate::services::TurnService;

/// The application instance with all services
pub struct Application {
    pub config: Config,
    pub turn_service: TurnService,
}

impl Application {
    /// Create a new Application instance (pure instantiation, no I/O)
    pub fn new(
        config: Config,
        repository: Arc<dyn SessionRepository>,
        fetcher: Arc<dyn VersionFetcher>,
    ) -> Self {
        let initializer = SessionInitializer::new(config.platform.clone());
        Self {
            turn_service: TurnService::new(repository, fetcher, initializer),
            config,
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }
}

/// Options for initializing the application
#[derive(Debug, Clone)]
pub struct InitOptions {
    /// Database URL (overrides config file and env vars)
    pub database_url: Option<String>,

    /// Config file path (overrides default search)
    pub config_path: Option<String>,

    /// Version metadata file (overrides config file and env vars)
    pub version_path: Option<String>,

    /// Whether to run migrations when a database is configured
    pub auto_migrate: bool,
}

impl Default for InitOptions {
    fn default() -> Self {
        Self {
            database_url: None,
            config_path: None,
            version_path: None,
            auto_migrate: true,
        }
    }
}

/// Builder for constructing InitOptions
pub struct InitBuilder {
    options: InitOptions,
}

impl InitBuilder {
    /// Create a new builder with default options
    pub fn new() -> Self {
        Self {
            options: InitOptions::default(),
        }
    }

    /// Set the database URL
    pub fn database_url(mut self, url: impl Into<String>) -> Self {
        self.options.database_url = Some(url.into());
        self
    }

    /// Set the config file path
    pub fn config_path(mut self, path: impl Into<String>) -> Self {
        self.options.config_path = Some(path.into());
        self
    }

    /// Set the version metadata file
    pub fn version_path(mut self, path: impl Into<String>) -> Self {
        self.options.version_path = Some(path.into());
        self
    }

    /// Set whether to automatically run migrations
    pub fn auto_migrate(mut self, auto: bool) -> Self {
        self.options.auto_migrate = auto;
        self
    }

    /// Initialize with the configured options
    pub async fn init(self) -> Result<Application> {
        initialize(self.options).await
    }
}

impl Default for InitBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Initialize and return an Application instance
///
/// Uses Postgres for session state when a database URL is configured and an
/// in-memory repository otherwise.
pub async fn initialize(options: InitOptions) -> Result<Application> {
    // Bootstrap: Load config
    let config = Config::builder()
        .database_url(options.database_url)
        .config_path(options.config_path.map(PathBuf::from))
        .version_path(options.version_path.map(PathBuf::from))
        .build()?;

    instantiate(config, options.auto_migrate).await
}

/// Assemble the application from an already loaded configuration
pub async fn instantiate(config: Config, auto_migrate: bool) -> Result<Application> {
    let version_path = config
        .metadata
        .version_path
        .clone()
        .context("No version metadata configured (metadata.version_path)")?;
    let fetcher: Arc<dyn VersionFetcher> = Arc::new(FileVersionFetcher::new(version_path));

    let repository: Arc<dyn SessionRepository> = if config.database.url.is_some() {
        let pool = crate::db::create_pool(&config.database).await?;
        if auto_migrate {
            crate::db::migrate(&pool)
                .await
                .context("Failed to run automatic migrations")?;
        }
        info!("using postgres session repository");
        Arc::new(PgSessionRepository::new(pool))
    } else {
        info!("no database configured, session state is kept in memory");
        Arc::new(MemorySessionRepository::new())
    };

    Ok(Application::new(config, repository, fetcher))
}
