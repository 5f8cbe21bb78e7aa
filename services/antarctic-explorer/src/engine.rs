//! Engine: the refresh scheduler driving generate -> append -> mark stale

use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::generator::ReadingGenerator;
use crate::reading::Reading;
use crate::state::StateHandle;

/// The engine produces one reading per refresh interval until cancelled
#[derive(Debug)]
pub struct Engine {
    generator: ReadingGenerator,
    state: StateHandle,
    interval: Duration,
    cancel: CancellationToken,
}

impl Engine {
    pub fn new(
        generator: ReadingGenerator,
        state: StateHandle,
        interval: Duration,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            generator,
            state,
            interval,
            cancel,
        }
    }

    /// Generate one reading and record it in the shared state
    pub async fn tick(&self) -> Reading {
        let reading = self.generator.generate();

        let (evicted, generation, buffered) = {
            let mut state = self.state.write().await;
            let evicted = state.record(reading);
            (evicted, state.generation(), state.history().len())
        };

        tracing::debug!(
            "Tick {}: {} at {} ({} buffered, evicted={:?})",
            generation,
            reading,
            reading.time_text(),
            buffered,
            evicted.map(|r| r.value())
        );
        reading
    }

    /// Tick on a fixed interval. The first tick fires immediately.
    /// Returns when the cancellation token is triggered.
    pub async fn run(&self) {
        let mut ticker = tokio::time::interval(self.interval.max(Duration::from_millis(1)));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.tick().await;
                }
                _ = self.cancel.cancelled() => {
                    tracing::debug!("Refresh loop cancelled");
                    break;
                }
            }
        }
    }
}
