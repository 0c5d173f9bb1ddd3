//! Request lifecycle stages that run around the interpreter

pub mod initialize;

#[cfg(test)]
mod tests;

pub use initialize::{decide_branch, SessionBranch, SessionInitializer, DEFAULT_PLATFORM};
