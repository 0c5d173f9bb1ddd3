use anyhow::{Context as _, Result};
use std::sync::Arc;
use tracing::debug;

use crate::lifecycle::{SessionBranch, SessionInitializer};
use crate::metadata::VersionFetcher;
use crate::persistence::SessionRepository;
use crate::runtime::Context;
use crate::types::TurnRequest;

/// A turn primed for the interpreter
#[derive(Debug)]
pub struct StartedTurn {
    pub context: Context,
    pub branch: SessionBranch,
}

/// Service for the per-turn session lifecycle (load, initialize, save)
#[derive(Clone)]
pub struct TurnService {
    repository: Arc<dyn SessionRepository>,
    fetcher: Arc<dyn VersionFetcher>,
    initializer: SessionInitializer,
}

impl TurnService {
    pub fn new(
        repository: Arc<dyn SessionRepository>,
        fetcher: Arc<dyn VersionFetcher>,
        initializer: SessionInitializer,
    ) -> Self {
        Self {
            repository,
            fetcher,
            initializer,
        }
    }

    /// Load the user's session state and initialize a new turn over it
    ///
    /// Users without persisted state start from an empty stack. Nothing is
    /// written back here; a failed initialization leaves stored state as is.
    pub async fn begin_turn(&self, request: &TurnRequest) -> Result<StartedTurn> {
        let state = self
            .repository
            .load(&request.user_id)
            .await
            .context("Failed to load session state")?
            .unwrap_or_default();

        let mut context = Context::from_state(state);
        let branch = self
            .initializer
            .initialize(self.fetcher.as_ref(), &mut context, request)
            .await
            .context("Failed to initialize session")?;

        Ok(StartedTurn { context, branch })
    }

    /// Persist the session-scoped part of a finished turn
    pub async fn end_turn(&self, user_id: &str, context: Context) -> Result<()> {
        let turn_id = context.turn.id;
        self.repository
            .save(user_id, &context.into_state())
            .await
            .context("Failed to save session state")?;

        debug!(%turn_id, user_id, "session state saved");
        Ok(())
    }

    /// Forget everything stored for a user
    pub async fn reset(&self, user_id: &str) -> Result<bool> {
        self.repository
            .delete(user_id)
            .await
            .context("Failed to delete session state")
    }
}
