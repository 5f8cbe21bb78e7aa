//! Synthetic reading generator
//!
//! Produces one reading per tick: a uniformly distributed value within the
//! configured bounds, rounded to a fixed number of decimal places, stamped
//! with the current wall-clock time. Both the random source and the clock
//! are traits so tests can drive the generator deterministically.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::GeneratorConfig;
use crate::reading::Reading;

/// Source of wall-clock time
#[cfg_attr(test, mockall::automock)]
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Clock backed by the system time
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Source of raw (unrounded) values within a closed interval
#[cfg_attr(test, mockall::automock)]
pub trait ValueSource: Send + Sync {
    /// Sample a value in `[min, max]`
    fn sample(&self, min: f64, max: f64) -> f64;
}

/// Uniform random values from a [`StdRng`]
#[derive(Debug)]
pub struct RandomSource {
    rng: Mutex<StdRng>,
}

impl RandomSource {
    /// Seed from the operating system
    pub fn from_os() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_os_rng()),
        }
    }

    /// Deterministic sequence for a given seed
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl ValueSource for RandomSource {
    fn sample(&self, min: f64, max: f64) -> f64 {
        if min >= max {
            return min;
        }
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        rng.random_range(min..=max)
    }
}

/// Generates synthetic temperature readings
pub struct ReadingGenerator {
    source: Box<dyn ValueSource>,
    clock: Arc<dyn Clock>,
    min: f64,
    max: f64,
    decimal_places: u32,
}

impl ReadingGenerator {
    pub fn new(
        config: &GeneratorConfig,
        source: Box<dyn ValueSource>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            source,
            clock,
            min: config.min_value,
            max: config.max_value,
            decimal_places: config.decimal_places,
        }
    }

    /// Build a generator backed by [`RandomSource`], seeded when the config asks for it
    pub fn from_config(config: &GeneratorConfig, clock: Arc<dyn Clock>) -> Self {
        let source = match config.seed {
            Some(seed) => {
                tracing::debug!("Seeding reading generator with {}", seed);
                RandomSource::seeded(seed)
            }
            None => RandomSource::from_os(),
        };
        Self::new(config, Box::new(source), clock)
    }

    /// Produce one reading stamped with the current time
    pub fn generate(&self) -> Reading {
        let raw = self.source.sample(self.min, self.max);
        let value = round_to(raw, self.decimal_places)
            .max(self.min)
            .min(self.max);
        Reading::new(value, self.clock.now())
    }
}

impl fmt::Debug for ReadingGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadingGenerator")
            .field("min", &self.min)
            .field("max", &self.max)
            .field("decimal_places", &self.decimal_places)
            .finish_non_exhaustive()
    }
}

/// Round `value` to `places` decimal places, half away from zero
pub fn round_to(value: f64, places: u32) -> f64 {
    let factor = 10f64.powi(places as i32);
    (value * factor).round() / factor
}
