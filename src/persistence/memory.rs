use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::{RepositoryError, SessionRepository};
use crate::runtime::SessionState;

/// Process-local repository for tests and offline runs
#[derive(Debug, Default)]
pub struct MemorySessionRepository {
    states: RwLock<HashMap<String, SessionState>>,
}

impl MemorySessionRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionRepository for MemorySessionRepository {
    async fn load(&self, user_id: &str) -> Result<Option<SessionState>, RepositoryError> {
        Ok(self.states.read().await.get(user_id).cloned())
    }

    async fn save(&self, user_id: &str, state: &SessionState) -> Result<(), RepositoryError> {
        self.states
            .write()
            .await
            .insert(user_id.to_string(), state.clone());
        Ok(())
    }

    async fn delete(&self, user_id: &str) -> Result<bool, RepositoryError> {
        Ok(self.states.write().await.remove(user_id).is_some())
    }
}
