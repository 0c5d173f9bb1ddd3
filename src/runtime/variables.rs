//! Variable binding store shared across flow evaluation
//!
//! Two operations populate it:
//! - `initialize` seeds names that are absent and never touches existing
//!   bindings, so user variables survive across turns and sessions
//! - `merge` always overwrites, for values derived from the current request

use super::store::Store;
use super::values::Val;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VariableStore {
    store: Store,
}

impl VariableStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed every absent name with `default`
    pub fn initialize<I, S>(&mut self, names: I, default: Val)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.store.initialize(names, &default);
    }

    /// Overwrite or create every named binding
    pub fn merge(&mut self, bindings: HashMap<String, Val>) {
        self.store.merge(bindings);
    }

    pub fn get(&self, name: &str) -> Option<&Val> {
        self.store.get(name)
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Val>) {
        self.store.set(name, value);
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }
}
