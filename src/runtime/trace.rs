//! Output instructions
//!
//! The core never renders responses. It only asks the output-rendering
//! collaborator to speak text; `Trace` records those instructions for the
//! response builder that runs after the interpreter.

use serde::{Deserialize, Serialize};

/// Output-rendering collaborator
pub trait OutputRenderer {
    /// Fire-and-forget instruction to speak `text`
    fn speak(&mut self, text: &str);
}

/// One recorded output instruction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "lowercase")]
pub enum TraceEvent {
    Speak { message: String },
}

/// Turn-scoped record of output instructions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Trace {
    events: Vec<TraceEvent>,
}

impl Trace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[TraceEvent] {
        &self.events
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl OutputRenderer for Trace {
    fn speak(&mut self, text: &str) {
        self.events.push(TraceEvent::Speak {
            message: text.to_string(),
        });
    }
}
