//! Shared state for the reading history

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;

use crate::history::HistoryBuffer;
use crate::reading::Reading;

/// Shared state written by the engine and read by the dashboard
#[derive(Debug)]
pub struct SharedState {
    history: HistoryBuffer,
    /// Number of readings recorded so far. Derived views built at an older
    /// generation are stale.
    generation: u64,
    started_at: Instant,
}

impl SharedState {
    pub fn new(capacity: usize) -> crate::Result<Self> {
        Ok(Self {
            history: HistoryBuffer::new(capacity)?,
            generation: 0,
            started_at: Instant::now(),
        })
    }

    /// Append a reading and mark derived views stale.
    /// Returns the reading evicted from the history, if any.
    pub fn record(&mut self, reading: Reading) -> Option<Reading> {
        let evicted = self.history.append(reading);
        self.generation += 1;
        evicted
    }

    pub fn snapshot(&self) -> Vec<Reading> {
        self.history.snapshot()
    }

    pub fn history(&self) -> &HistoryBuffer {
        &self.history
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Time since the state was created
    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }
}

/// Thread-safe shared state handle
pub type StateHandle = Arc<RwLock<SharedState>>;

pub fn new_state_handle(capacity: usize) -> crate::Result<StateHandle> {
    Ok(Arc::new(RwLock::new(SharedState::new(capacity)?)))
}
