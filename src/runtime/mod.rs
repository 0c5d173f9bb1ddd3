//! # Session runtime
//!
//! Data structures the session initializer mutates and the flow interpreter
//! runs against.
//!
//! - `ExecutionStack` of `Frame`s, one per active flow invocation
//! - `SessionStorage` for well-known per-session attributes
//! - `VariableStore` for variables shared across flows
//! - `Context` bundling the above with turn-scoped state

pub mod context;
pub mod frame;
pub mod keys;
pub mod stack;
pub mod storage;
pub mod store;
pub mod trace;
pub mod values;
pub mod variables;

// Re-export commonly used items
pub use context::{Context, SessionState, TurnState};
pub use frame::{Frame, FrameKind, RESUME_DIAGRAM_ID};
pub use keys::{var, FrameKey, StorageKey};
pub use stack::{ExecutionStack, StackError};
pub use storage::SessionStorage;
pub use store::Store;
pub use trace::{OutputRenderer, Trace, TraceEvent};
pub use values::{json_to_val, val_to_json, Val};
pub use variables::VariableStore;
