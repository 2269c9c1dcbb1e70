//! Change point detection with a sliding two-window mean comparison.

use crate::error::{ensure_finite, ForecastError, Result};
use crate::stats::{mean, population_std_dev, relative_percent};

/// Largest half-window compared on each side of a candidate index.
const MAX_WINDOW: usize = 10;

/// An index where the local mean shifts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChangePoint {
    /// First index of the "after" window
    pub index: usize,
    pub mean_before: f64,
    pub mean_after: f64,
    /// `mean_after − mean_before`
    pub delta: f64,
    /// Delta as a percentage of `mean_before`, `None` when that mean is 0
    pub relative_delta_percent: Option<f64>,
}

/// Window size used for a series of length `n`: `min(10, n / 4)`.
pub fn window_size(n: usize) -> usize {
    MAX_WINDOW.min(n / 4)
}

/// Flag indices where the mean of the following window differs from the
/// mean of the preceding window by more than `threshold` times their
/// average standard deviation.
///
/// # Arguments
/// * `series` - The time series values
/// * `threshold` - Multiplier on the average window standard deviation
///
/// # Errors
/// * `InvalidParameter` for a negative or non-finite threshold
/// * `InsufficientData` when the window would hold fewer than 2 values
pub fn detect_change_points(series: &[f64], threshold: f64) -> Result<Vec<ChangePoint>> {
    if !threshold.is_finite() || threshold < 0.0 {
        return Err(ForecastError::invalid_parameter(
            "threshold",
            threshold,
            "must be a non-negative number",
        ));
    }

    let n = series.len();
    let w = window_size(n);
    if w < 2 {
        return Err(ForecastError::InsufficientData { needed: 8, got: n });
    }
    ensure_finite(series)?;

    let points = (w..=n - w)
        .filter_map(|i| {
            let before = &series[i - w..i];
            let after = &series[i..i + w];

            let mean_before = mean(before);
            let mean_after = mean(after);
            let delta = mean_after - mean_before;
            let spread = (population_std_dev(before) + population_std_dev(after)) / 2.0;

            (delta.abs() > threshold * spread).then(|| ChangePoint {
                index: i,
                mean_before,
                mean_after,
                delta,
                relative_delta_percent: relative_percent(mean_after, mean_before),
            })
        })
        .collect();

    Ok(points)
}
