//! Execution stack
//!
//! Ordered frames, bottom = root flow, top = current point of execution.
//! Searches scan bottom to top, so `find_index` returns the frame closest to
//! the root when several match.

use super::frame::Frame;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StackError {
    #[error("execution stack is empty")]
    Empty,

    #[error("stack index {index} out of bounds for stack of {len} frames")]
    IndexOutOfBounds { index: usize, len: usize },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExecutionStack {
    frames: Vec<Frame>,
}

impl ExecutionStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_frames(frames: Vec<Frame>) -> Self {
        Self { frames }
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn push(&mut self, frame: Frame) {
        self.frames.push(frame);
    }

    pub fn pop(&mut self) -> Option<Frame> {
        self.frames.pop()
    }

    pub fn top(&self) -> Result<&Frame, StackError> {
        self.frames.last().ok_or(StackError::Empty)
    }

    pub fn top_mut(&mut self) -> Result<&mut Frame, StackError> {
        self.frames.last_mut().ok_or(StackError::Empty)
    }

    pub fn get(&self, index: usize) -> Option<&Frame> {
        self.frames.get(index)
    }

    /// Remove every frame
    pub fn flush(&mut self) {
        self.frames.clear();
    }

    /// Index of the first frame (scanning from the bottom) matching `predicate`
    pub fn find_index<P>(&self, predicate: P) -> Option<usize>
    where
        P: Fn(&Frame) -> bool,
    {
        self.frames.iter().position(predicate)
    }

    /// Pop the frame at `index` and everything above it
    ///
    /// Leaves exactly `index` frames on the stack. Returns the removed frames,
    /// bottom first.
    pub fn pop_to(&mut self, index: usize) -> Result<Vec<Frame>, StackError> {
        if index >= self.frames.len() {
            return Err(StackError::IndexOutOfBounds {
                index,
                len: self.frames.len(),
            });
        }

        Ok(self.frames.split_off(index))
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }
}
