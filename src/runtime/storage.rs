//! Session-scoped storage
//!
//! Holds the well-known per-session attributes (session counter, locale,
//! user id, device capabilities, permissions, repeat mode, last output and
//! the active stream descriptor). Absent keys are a valid state, not an error.

use super::keys::StorageKey;
use super::store::Store;
use super::values::Val;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionStorage {
    store: Store,
}

impl SessionStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: StorageKey) -> Option<&Val> {
        self.store.get(key.as_str())
    }

    pub fn set(&mut self, key: StorageKey, value: impl Into<Val>) {
        self.store.set(key.as_str(), value);
    }

    pub fn delete(&mut self, key: StorageKey) -> Option<Val> {
        self.store.delete(key.as_str())
    }

    /// Atomic read-modify-write of one entry
    ///
    /// `mutator` receives the current value (or `None`) and returns the value
    /// to store. The new value is returned. Not synchronized: a session's
    /// storage is only ever touched by its single in-flight turn.
    pub fn update_in_place<F>(&mut self, key: StorageKey, mutator: F) -> Val
    where
        F: FnOnce(Option<Val>) -> Val,
    {
        self.store.update(key.as_str(), mutator)
    }
}
