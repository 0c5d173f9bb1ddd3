//! Session state persistence
//!
//! Stack, storage and variables are stored per user as one JSON document.
//! Turn-scoped state is never persisted.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;

use crate::runtime::SessionState;

pub use memory::MemorySessionRepository;
pub use postgres::PgSessionRepository;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("failed to (de)serialize session state: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[async_trait]
pub trait SessionRepository: Send + Sync {
    async fn load(&self, user_id: &str) -> Result<Option<SessionState>, RepositoryError>;

    async fn save(&self, user_id: &str, state: &SessionState) -> Result<(), RepositoryError>;

    /// Returns whether a state existed
    async fn delete(&self, user_id: &str) -> Result<bool, RepositoryError>;
}
