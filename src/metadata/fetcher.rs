//! Version fetch collaborators
//!
//! The initializer awaits exactly one fetch per turn and never retries; any
//! retry policy belongs to the fetcher implementation.

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use super::VersionMetadata;
use crate::error::FetchError;

#[async_trait]
pub trait VersionFetcher: Send + Sync {
    async fn fetch_version(&self) -> Result<VersionMetadata, FetchError>;
}

/* ===================== File Fetcher ===================== */

/// Reads version metadata from a JSON file on every fetch
#[derive(Debug, Clone)]
pub struct FileVersionFetcher {
    path: PathBuf,
}

impl FileVersionFetcher {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl VersionFetcher for FileVersionFetcher {
    async fn fetch_version(&self) -> Result<VersionMetadata, FetchError> {
        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| FetchError::Io {
                path: self.path.display().to_string(),
                source,
            })?;

        Ok(serde_json::from_str(&raw)?)
    }
}

/* ===================== Static Fetcher ===================== */

/// Serves a fixed version, or fails with `NotFound` when constructed empty
#[derive(Debug, Clone, Default)]
pub struct StaticVersionFetcher {
    version: Option<VersionMetadata>,
}

impl StaticVersionFetcher {
    pub fn new(version: VersionMetadata) -> Self {
        Self {
            version: Some(version),
        }
    }

    pub fn unavailable() -> Self {
        Self { version: None }
    }
}

#[async_trait]
impl VersionFetcher for StaticVersionFetcher {
    async fn fetch_version(&self) -> Result<VersionMetadata, FetchError> {
        self.version
            .clone()
            .ok_or_else(|| FetchError::NotFound("static fetcher has no version".to_string()))
    }
}
