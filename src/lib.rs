pub mod application;
pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod lifecycle;
pub mod logging;
pub mod metadata;
pub mod persistence;
pub mod runtime;
pub mod services;
pub mod types;

// Re-export main types
pub use error::{FetchError, InitError};
pub use lifecycle::{SessionBranch, SessionInitializer};
pub use runtime::{Context, SessionState};
pub use types::*;

// Re-export init API for convenience
pub use application::{initialize, InitBuilder, InitOptions};
