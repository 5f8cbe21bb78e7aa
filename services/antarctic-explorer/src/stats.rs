//! Summary statistics over reading snapshots
//!
//! Time-windowed mean and an ordinary least-squares fit of value against
//! sequential index. Both return `None` instead of failing when there is not
//! enough data.

use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::reading::Reading;

/// Start of the trailing window ending at `now`.
///
/// Returns `None` when the window reaches back past the representable range,
/// meaning every reading is inside it.
pub fn window_start(now: DateTime<Utc>, window: Duration) -> Option<DateTime<Utc>> {
    TimeDelta::from_std(window)
        .ok()
        .and_then(|delta| now.checked_sub_signed(delta))
}

/// Whether a reading falls inside the trailing window ending at `now`
pub fn in_window(reading: &Reading, now: DateTime<Utc>, window: Duration) -> bool {
    match window_start(now, window) {
        Some(cutoff) => reading.timestamp() >= cutoff,
        None => true,
    }
}

/// Mean value of the readings within the trailing window
///
/// Returns None if no reading falls inside the window.
pub fn windowed_average(readings: &[Reading], now: DateTime<Utc>, window: Duration) -> Option<f64> {
    let (sum, count) = readings
        .iter()
        .filter(|r| in_window(r, now, window))
        .fold((0.0, 0usize), |(sum, count), r| (sum + r.value(), count + 1));

    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

/// Result of a least-squares line fit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Regression {
    pub slope: f64,
    pub intercept: f64,
    /// Coefficient of determination; undefined when every y is identical
    pub r_squared: Option<f64>,
}

impl Regression {
    /// Fitted value at `x`
    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }

    /// Fitted values at indices `0..len`
    pub fn fitted(&self, len: usize) -> Vec<f64> {
        (0..len).map(|x| self.predict(x as f64)).collect()
    }
}

/// Fit `y = slope * x + intercept` with `x` being the index of each value
///
/// Returns None for fewer than two points.
pub fn linear_regression(ys: &[f64]) -> Option<Regression> {
    let n = ys.len();
    if n < 2 {
        return None;
    }

    let mean_x = (n - 1) as f64 / 2.0;
    let mean_y = ys.iter().sum::<f64>() / n as f64;

    let mut sxx = 0.0;
    let mut sxy = 0.0;
    let mut syy = 0.0;
    for (i, y) in ys.iter().enumerate() {
        let dx = i as f64 - mean_x;
        let dy = y - mean_y;
        sxx += dx * dx;
        sxy += dx * dy;
        syy += dy * dy;
    }

    // sxx > 0 for n >= 2 since indices are distinct
    let slope = sxy / sxx;
    let intercept = mean_y - slope * mean_x;
    let r_squared = if syy > 0.0 {
        Some((sxy * sxy) / (sxx * syy))
    } else {
        None
    };

    Some(Regression {
        slope,
        intercept,
        r_squared,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const DAY: Duration = Duration::from_secs(24 * 60 * 60);

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap()
    }

    fn reading_aged(value: f64, age_secs: i64) -> Reading {
        Reading::new(value, now() - TimeDelta::seconds(age_secs))
    }

    #[test]
    fn perfect_line_is_exact() {
        let fit = linear_regression(&[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        assert_eq!(fit.slope, 1.0);
        assert_eq!(fit.intercept, 1.0);
        assert_eq!(fit.r_squared, Some(1.0));
        assert_eq!(fit.fitted(5), vec![1.0, 2.0, 3.0, 4.0, 5.0]);
    }

    #[test]
    fn fewer_than_two_points_is_insufficient() {
        assert_eq!(linear_regression(&[]), None);
        assert_eq!(linear_regression(&[-17.0]), None);
    }

    #[test]
    fn two_points_define_the_line() {
        let fit = linear_regression(&[-17.0, -16.0]).unwrap();
        assert_eq!(fit.slope, 1.0);
        assert_eq!(fit.intercept, -17.0);
    }

    #[test]
    fn flat_values_give_zero_slope() {
        let fit = linear_regression(&[-17.0, -17.0, -17.0]).unwrap();
        assert_eq!(fit.slope, 0.0);
        assert_eq!(fit.intercept, -17.0);
        assert_eq!(fit.r_squared, None);
    }

    #[test]
    fn noisy_values_fit_least_squares() {
        let fit = linear_regression(&[-17.0, -17.5, -16.8, -17.2, -16.9]).unwrap();
        // mean = -17.08, sxy = 0.5, sxx = 10
        assert!((fit.slope - 0.05).abs() < 1e-12, "{}", fit.slope);
        assert!((fit.intercept - (-17.18)).abs() < 1e-12, "{}", fit.intercept);
        let r2 = fit.r_squared.unwrap();
        assert!((0.0..=1.0).contains(&r2));
    }

    #[test]
    fn average_of_recent_readings() {
        let readings = vec![reading_aged(-17.0, 9), reading_aged(-18.0, 6), reading_aged(-16.0, 3)];
        assert_eq!(windowed_average(&readings, now(), DAY), Some(-17.0));
    }

    #[test]
    fn average_of_empty_is_none() {
        assert_eq!(windowed_average(&[], now(), DAY), None);
    }

    #[test]
    fn stale_readings_are_not_averaged() {
        let readings = vec![
            reading_aged(-17.0, 25 * 3600),
            reading_aged(-16.0, 48 * 3600),
        ];
        assert_eq!(windowed_average(&readings, now(), DAY), None);
    }

    #[test]
    fn only_in_window_readings_are_averaged() {
        let readings = vec![
            reading_aged(-10.0, 2 * 24 * 3600),
            reading_aged(-17.0, 60),
            reading_aged(-18.0, 30),
        ];
        assert_eq!(windowed_average(&readings, now(), DAY), Some(-17.5));
    }

    #[test]
    fn window_boundary_is_inclusive() {
        let readings = vec![reading_aged(-17.0, 24 * 3600)];
        assert_eq!(windowed_average(&readings, now(), DAY), Some(-17.0));
    }

    #[test]
    fn huge_window_includes_everything() {
        let readings = vec![reading_aged(-17.0, 10 * 365 * 24 * 3600)];
        assert_eq!(
            windowed_average(&readings, now(), Duration::from_secs(u64::MAX)),
            Some(-17.0)
        );
    }
}
