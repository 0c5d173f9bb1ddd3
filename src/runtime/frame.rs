//! Execution frames
//!
//! One frame per active flow invocation. The frame owns its local storage and
//! names the diagram it executes; the diagram id never changes after creation.

use super::keys::FrameKey;
use super::store::Store;
use super::values::Val;
use serde::{Deserialize, Serialize};

/// Reserved diagram id of the resume prompt flow
pub const RESUME_DIAGRAM_ID: &str = "__RESUME_FLOW__";

/* ===================== Frames ===================== */

/// Frame kind - what this invocation was created for
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "t")]
pub enum FrameKind {
    /// Regular flow invocation (root flow or a call made by the interpreter)
    Flow,
    /// Resume prompt asking the user whether to pick up where they left off
    Resume {
        /// What to resume into
        target: String,
        /// Continue automatically after the prompt instead of waiting for input
        follow: Option<bool>,
    },
}

/// Execution frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    diagram_id: String,

    #[serde(flatten)]
    pub kind: FrameKind,

    /// Frame-local storage
    pub storage: Store,
}

impl Frame {
    /// Create a regular flow frame
    pub fn new(diagram_id: impl Into<String>) -> Self {
        Self {
            diagram_id: diagram_id.into(),
            kind: FrameKind::Flow,
            storage: Store::new(),
        }
    }

    /// Create a resume frame on the reserved resume diagram
    pub fn resume(target: impl Into<String>, follow: Option<bool>) -> Self {
        Self {
            diagram_id: RESUME_DIAGRAM_ID.to_string(),
            kind: FrameKind::Resume {
                target: target.into(),
                follow,
            },
            storage: Store::new(),
        }
    }

    pub fn diagram_id(&self) -> &str {
        &self.diagram_id
    }

    pub fn is_resume(&self) -> bool {
        self.diagram_id == RESUME_DIAGRAM_ID
    }

    pub fn get(&self, key: FrameKey) -> Option<&Val> {
        self.storage.get(key.as_str())
    }

    pub fn set(&mut self, key: FrameKey, value: impl Into<Val>) {
        self.storage.set(key.as_str(), value);
    }

    pub fn delete(&mut self, key: FrameKey) -> Option<Val> {
        self.storage.delete(key.as_str())
    }
}
