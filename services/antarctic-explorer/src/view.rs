//! Derived views over the reading history
//!
//! [`DerivedView::build`] is a pure function of a snapshot, the current time
//! and the averaging window. [`ViewCache`] sits in front of it and only
//! rebuilds when the shared state has moved on or an in-window reading has
//! aged out, so every consumer sees the same result as a fresh computation.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::generator::Clock;
use crate::reading::Reading;
use crate::state::StateHandle;
use crate::stats::{self, Regression};

/// Placeholder shown when there is nothing to display
pub const NO_DATA: &str = "No data";

/// One row of the history table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRow {
    pub index: usize,
    pub value: f64,
    pub timestamp: DateTime<Utc>,
    pub time: String,
}

impl From<(usize, &Reading)> for HistoryRow {
    fn from((index, reading): (usize, &Reading)) -> Self {
        Self {
            index,
            value: reading.value(),
            timestamp: reading.timestamp(),
            time: reading.time_text(),
        }
    }
}

/// Everything the presentation layer needs for one render
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedView {
    pub table: Vec<HistoryRow>,
    pub latest: Option<Reading>,
    pub windowed_average: Option<f64>,
    pub trend: Option<Regression>,
    /// Fitted value for each table row; empty without a trend
    pub trend_line: Vec<f64>,
}

impl DerivedView {
    pub fn build(snapshot: &[Reading], now: DateTime<Utc>, window: Duration) -> Self {
        let table: Vec<HistoryRow> = snapshot.iter().enumerate().map(HistoryRow::from).collect();
        let values: Vec<f64> = snapshot.iter().map(Reading::value).collect();
        let trend = stats::linear_regression(&values);
        let trend_line = trend
            .map(|fit| fit.fitted(values.len()))
            .unwrap_or_default();

        Self {
            table,
            latest: snapshot.last().copied(),
            windowed_average: stats::windowed_average(snapshot, now, window),
            trend,
            trend_line,
        }
    }

    /// `(index, fitted value)` pairs for the chart
    pub fn trend_series(&self) -> Vec<(usize, f64)> {
        self.trend_line.iter().copied().enumerate().collect()
    }

    pub fn current_reading_text(&self) -> String {
        self.latest
            .map(|r| r.to_string())
            .unwrap_or_else(|| NO_DATA.to_string())
    }

    pub fn current_time_text(&self) -> String {
        self.latest
            .map(|r| r.time_text())
            .unwrap_or_else(|| NO_DATA.to_string())
    }

    pub fn windowed_average_text(&self) -> String {
        self.windowed_average
            .map(format_temperature)
            .unwrap_or_else(|| NO_DATA.to_string())
    }
}

pub fn format_temperature(value: f64) -> String {
    format!("{:.2} °C", value)
}

/// Earliest moment a reading currently in the window drops out of it
fn window_expiry(
    snapshot: &[Reading],
    now: DateTime<Utc>,
    window: Duration,
) -> Option<DateTime<Utc>> {
    let delta = TimeDelta::from_std(window).ok()?;
    snapshot
        .iter()
        .filter(|r| stats::in_window(r, now, window))
        .filter_map(|r| r.timestamp().checked_add_signed(delta))
        .min()
}

struct CachedView {
    generation: u64,
    expires_at: Option<DateTime<Utc>>,
    view: Arc<DerivedView>,
}

impl CachedView {
    fn is_fresh(&self, generation: u64, now: DateTime<Utc>) -> bool {
        self.generation == generation && self.expires_at.is_none_or(|t| now <= t)
    }
}

/// Pull-based accessor that rebuilds the derived view only when stale
pub struct ViewCache {
    state: StateHandle,
    clock: Arc<dyn Clock>,
    window: Duration,
    cached: Mutex<Option<CachedView>>,
}

impl ViewCache {
    pub fn new(state: StateHandle, clock: Arc<dyn Clock>, window: Duration) -> Self {
        Self {
            state,
            clock,
            window,
            cached: Mutex::new(None),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn state(&self) -> &StateHandle {
        &self.state
    }

    /// Current view, rebuilt from a fresh snapshot if the cached one is stale
    pub async fn current(&self) -> Arc<DerivedView> {
        let now = self.clock.now();
        let mut cached = self.cached.lock().await;

        let state = self.state.read().await;
        let generation = state.generation();
        if let Some(entry) = cached.as_ref() {
            if entry.is_fresh(generation, now) {
                return Arc::clone(&entry.view);
            }
        }
        let snapshot = state.snapshot();
        drop(state);

        tracing::debug!(
            "Rebuilding derived view at generation {} from {} readings",
            generation,
            snapshot.len()
        );
        let view = Arc::new(DerivedView::build(&snapshot, now, self.window));
        *cached = Some(CachedView {
            generation,
            expires_at: window_expiry(&snapshot, now, self.window),
            view: Arc::clone(&view),
        });
        view
    }

    pub async fn current_reading(&self) -> Option<Reading> {
        self.current().await.latest
    }

    pub async fn history_table(&self) -> Vec<HistoryRow> {
        self.current().await.table.clone()
    }

    pub async fn windowed_average_text(&self) -> String {
        self.current().await.windowed_average_text()
    }

    pub async fn trend_series(&self) -> Vec<(usize, f64)> {
        self.current().await.trend_series()
    }
}

impl fmt::Debug for ViewCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewCache")
            .field("window", &self.window)
            .finish_non_exhaustive()
    }
}
