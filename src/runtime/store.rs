//! String-keyed value bag
//!
//! `Store` is the common container behind session storage, variables and
//! frame-local storage. It is unsynchronized: each session owns its stores
//! exclusively and the platform never runs two turns of one session at once.

use super::values::Val;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Store {
    entries: HashMap<String, Val>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Val> {
        self.entries.get(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Val>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Remove a key, returning its previous value
    pub fn delete(&mut self, key: &str) -> Option<Val> {
        self.entries.remove(key)
    }

    /// Read-modify-write of a single entry
    ///
    /// The mutator receives the current value (`None` when absent) and returns
    /// the replacement, which is stored and returned.
    pub fn update<F>(&mut self, key: &str, mutator: F) -> Val
    where
        F: FnOnce(Option<Val>) -> Val,
    {
        let next = mutator(self.entries.remove(key));
        self.entries.insert(key.to_string(), next.clone());
        next
    }

    /// Bind `default` to every name that is not already present
    ///
    /// Existing bindings are never overwritten.
    pub fn initialize<I, S>(&mut self, names: I, default: &Val)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for name in names {
            self.entries
                .entry(name.into())
                .or_insert_with(|| default.clone());
        }
    }

    /// Overwrite (or create) every binding in `bindings`
    pub fn merge(&mut self, bindings: HashMap<String, Val>) {
        self.entries.extend(bindings);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
