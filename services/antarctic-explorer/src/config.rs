//! Configuration types for the antarctic explorer service

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::ExplorerError;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub generator: GeneratorConfig,
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub dashboard: DashboardConfig,
}

/// Synthetic reading generator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    #[serde(default = "default_min_value")]
    pub min_value: f64,
    #[serde(default = "default_max_value")]
    pub max_value: f64,
    #[serde(default = "default_decimal_places")]
    pub decimal_places: u32,
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_seconds: u64,
    /// Fixed RNG seed for reproducible runs; seeded from the OS when absent
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            min_value: default_min_value(),
            max_value: default_max_value(),
            decimal_places: default_decimal_places(),
            refresh_interval_seconds: default_refresh_interval(),
            seed: None,
        }
    }
}

impl GeneratorConfig {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_seconds)
    }
}

/// Bounded history configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    #[serde(default = "default_capacity")]
    pub capacity: usize,
    #[serde(default = "default_average_window")]
    pub average_window_seconds: u64,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
            average_window_seconds: default_average_window(),
        }
    }
}

impl HistoryConfig {
    pub fn average_window(&self) -> Duration {
        Duration::from_secs(self.average_window_seconds)
    }
}

/// Dashboard configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_dashboard_port")]
    pub port: u16,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            port: default_dashboard_port(),
        }
    }
}

fn default_min_value() -> f64 {
    -18.0
}

fn default_max_value() -> f64 {
    -16.0
}

fn default_decimal_places() -> u32 {
    2
}

fn default_refresh_interval() -> u64 {
    3
}

fn default_capacity() -> usize {
    5
}

fn default_average_window() -> u64 {
    24 * 60 * 60
}

fn default_true() -> bool {
    true
}

fn default_dashboard_port() -> u16 {
    11116
}

/// Settings taken from the command line or the environment.
/// Each one that is set replaces the value from the config file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    pub dashboard_port: Option<u16>,
    pub refresh_interval_seconds: Option<u64>,
    pub capacity: Option<usize>,
    pub min_value: Option<f64>,
    pub max_value: Option<f64>,
}

impl Config {
    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(port) = overrides.dashboard_port {
            self.dashboard.port = port;
        }
        if let Some(seconds) = overrides.refresh_interval_seconds {
            self.generator.refresh_interval_seconds = seconds;
        }
        if let Some(capacity) = overrides.capacity {
            self.history.capacity = capacity;
        }
        if let Some(min_value) = overrides.min_value {
            self.generator.min_value = min_value;
        }
        if let Some(max_value) = overrides.max_value {
            self.generator.max_value = max_value;
        }
    }

    /// Reject settings the pipeline cannot run with
    pub fn validate(&self) -> crate::Result<()> {
        let generator = &self.generator;
        if !generator.min_value.is_finite() || !generator.max_value.is_finite() {
            return Err(ExplorerError::Config(format!(
                "Generator bounds must be finite, got [{}, {}]",
                generator.min_value, generator.max_value
            )));
        }
        if generator.min_value > generator.max_value {
            return Err(ExplorerError::Config(format!(
                "Generator min_value {} is greater than max_value {}",
                generator.min_value, generator.max_value
            )));
        }
        if generator.decimal_places > 10 {
            return Err(ExplorerError::Config(format!(
                "decimal_places must be at most 10, got {}",
                generator.decimal_places
            )));
        }
        if generator.refresh_interval_seconds == 0 {
            return Err(ExplorerError::Config(
                "refresh_interval_seconds must be greater than 0".to_string(),
            ));
        }
        if self.history.capacity == 0 {
            return Err(ExplorerError::Config(
                "History capacity must be greater than 0".to_string(),
            ));
        }
        if self.history.average_window_seconds == 0 {
            return Err(ExplorerError::Config(
                "average_window_seconds must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Load configuration from a JSON file
pub fn load_config(path: &Path) -> crate::Result<Config> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        ExplorerError::Config(format!("Failed to read config file {:?}: {}", path, e))
    })?;
    let config: Config = serde_json::from_str(&content)?;
    Ok(config)
}
