//! Bounded FIFO history of readings

use std::collections::VecDeque;

use crate::reading::Reading;
use crate::ExplorerError;

/// Fixed-capacity buffer holding the most recent readings in chronological order
#[derive(Debug, Clone)]
pub struct HistoryBuffer {
    readings: VecDeque<Reading>,
    capacity: usize,
}

impl HistoryBuffer {
    /// Create an empty buffer. A zero capacity is a configuration error.
    pub fn new(capacity: usize) -> crate::Result<Self> {
        if capacity == 0 {
            return Err(ExplorerError::Config(
                "History capacity must be greater than 0".to_string(),
            ));
        }
        Ok(Self {
            readings: VecDeque::with_capacity(capacity),
            capacity,
        })
    }

    /// Append to the tail, returning the evicted head if the buffer was full
    pub fn append(&mut self, reading: Reading) -> Option<Reading> {
        self.readings.push_back(reading);
        if self.readings.len() > self.capacity {
            self.readings.pop_front()
        } else {
            None
        }
    }

    /// Owned copy of the current contents, oldest first
    pub fn snapshot(&self) -> Vec<Reading> {
        self.readings.iter().copied().collect()
    }

    pub fn latest(&self) -> Option<&Reading> {
        self.readings.back()
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
