//! Fixed-capacity rolling log of executed steps.

use std::collections::VecDeque;

use crate::error::{EngineError, EngineResult};
use crate::step::Step;

/// Insertion-ordered step log that evicts the oldest entry once full.
///
/// Steps are never touched after insertion, so eviction is strict FIFO.
#[derive(Debug, Clone)]
pub struct HistoryBuffer {
    entries: VecDeque<Step>,
    capacity: usize,
}

impl HistoryBuffer {
    /// Create an empty buffer. A zero capacity is rejected.
    pub fn new(capacity: usize) -> EngineResult<Self> {
        if capacity == 0 {
            return Err(EngineError::InvalidCapacity {
                component: "history buffer",
                value: capacity,
            });
        }
        Ok(Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        })
    }

    /// Append a step at the tail, returning the evicted head if the buffer was full
    pub fn append(&mut self, step: Step) -> Option<Step> {
        self.entries.push_back(step);
        if self.entries.len() > self.capacity {
            self.entries.pop_front()
        } else {
            None
        }
    }

    /// Current contents, oldest first
    pub fn snapshot(&self) -> Vec<Step> {
        self.entries.iter().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Step> {
        self.entries.iter()
    }

    /// Most recently appended step
    pub fn last(&self) -> Option<&Step> {
        self.entries.back()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
