//! Temperature reading value type

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Display format for reading timestamps
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A single temperature reading. Immutable once created.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    value: f64,
    timestamp: DateTime<Utc>,
}

impl Reading {
    pub fn new(value: f64, timestamp: DateTime<Utc>) -> Self {
        Self { value, timestamp }
    }

    /// Temperature in degrees Celsius
    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Timestamp rendered with [`TIME_FORMAT`]
    pub fn time_text(&self) -> String {
        self.timestamp.format(TIME_FORMAT).to_string()
    }
}

impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}°C", self.value)
    }
}
