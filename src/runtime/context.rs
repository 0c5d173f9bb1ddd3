//! Per-turn execution context
//!
//! `Context` bundles the session-scoped state (stack, storage, variables) with
//! the turn-scoped state and output trace. Only `SessionState` outlives a turn.

use super::stack::ExecutionStack;
use super::storage::SessionStorage;
use super::store::Store;
use super::trace::Trace;
use super::variables::VariableStore;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Session-scoped state persisted between turns
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    #[serde(default)]
    pub stack: ExecutionStack,
    #[serde(default)]
    pub storage: SessionStorage,
    #[serde(default)]
    pub variables: VariableStore,
}

/// State that lives for exactly one turn
#[derive(Debug, Clone, PartialEq)]
pub struct TurnState {
    pub id: Uuid,

    /// A brand new stack was created this turn; the interpreter runs entry
    /// triggers only when this is set
    pub new_stack: bool,

    /// Ephemeral bag for collaborators that need turn-local scratch space
    pub bag: Store,
}

impl TurnState {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            new_stack: false,
            bag: Store::new(),
        }
    }
}

impl Default for TurnState {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Context {
    pub stack: ExecutionStack,
    pub storage: SessionStorage,
    pub variables: VariableStore,
    pub turn: TurnState,
    pub trace: Trace,
}

impl Context {
    /// Start a fresh turn over previously persisted session state
    pub fn from_state(state: SessionState) -> Self {
        Self {
            stack: state.stack,
            storage: state.storage,
            variables: state.variables,
            turn: TurnState::new(),
            trace: Trace::new(),
        }
    }

    /// Session-scoped part of the context; turn state and trace are dropped
    pub fn into_state(self) -> SessionState {
        SessionState {
            stack: self.stack,
            storage: self.storage,
            variables: self.variables,
        }
    }

    /// Snapshot of the session-scoped part without consuming the context
    pub fn to_state(&self) -> SessionState {
        self.clone().into_state()
    }
}
