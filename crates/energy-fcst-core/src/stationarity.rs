//! Stationarity heuristics, differencing and integration.

use crate::error::{ensure_finite, ensure_len, Result};
use crate::stats::{mean, ZERO_TOLERANCE};
use anofox_forecast::validation::adf_test;

/// Relative mean shift between halves at which a series counts as
/// non-stationary.
pub const STATIONARITY_THRESHOLD: f64 = 0.2;

/// Augmented Dickey-Fuller evidence reported next to the heuristic verdict.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdfEvidence {
    pub statistic: f64,
    pub p_value: f64,
    /// Whether the unit-root hypothesis is rejected
    pub rejects_unit_root: bool,
}

/// Result of [`test_stationarity`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StationarityReport {
    pub first_half_mean: f64,
    pub second_half_mean: f64,
    /// `|m₂ − m₁| / |m₁|`, `None` when the first-half mean is zero
    pub relative_change: Option<f64>,
    pub is_stationary: bool,
    /// First differencing is recommended for non-stationary series
    pub recommend_differencing: bool,
    /// ADF test result, `None` when the test is not computable
    pub adf: Option<AdfEvidence>,
}

/// Compare the means of the first and second half of the series.
///
/// The series is flagged non-stationary when the relative change of the
/// mean reaches [`STATIONARITY_THRESHOLD`].
pub fn test_stationarity(series: &[f64]) -> Result<StationarityReport> {
    ensure_len(series, 4)?;
    ensure_finite(series)?;

    let mid = series.len() / 2;
    let first_half_mean = mean(&series[..mid]);
    let second_half_mean = mean(&series[mid..]);

    let relative_change = if first_half_mean.abs() < ZERO_TOLERANCE {
        None
    } else {
        Some((second_half_mean - first_half_mean).abs() / first_half_mean.abs())
    };

    let is_stationary = match relative_change {
        Some(change) => change < STATIONARITY_THRESHOLD,
        None => second_half_mean.abs() < ZERO_TOLERANCE,
    };

    let adf_result = adf_test(series, None);
    let adf = (adf_result.statistic.is_finite() && adf_result.p_value.is_finite()).then_some(
        AdfEvidence {
            statistic: adf_result.statistic,
            p_value: adf_result.p_value,
            rejects_unit_root: adf_result.is_stationary,
        },
    );

    Ok(StationarityReport {
        first_half_mean,
        second_half_mean,
        relative_change,
        is_stationary,
        recommend_differencing: !is_stationary,
        adf,
    })
}

/// Apply the forward difference `order` times.
///
/// Order 0 returns the series unchanged. Each pass shortens the series by
/// one element; a series exhausted before `order` passes yields an empty
/// vector.
pub fn difference(series: &[f64], order: usize) -> Result<Vec<f64>> {
    ensure_finite(series)?;

    let mut result = series.to_vec();
    for _ in 0..order {
        if result.len() < 2 {
            return Ok(vec![]);
        }
        result = result.windows(2).map(|w| w[1] - w[0]).collect();
    }
    Ok(result)
}

/// Invert a first difference: cumulative sum starting from `initial_value`.
///
/// The output is one element longer than the input, so
/// `integrate(&difference(s, 1)?, s[0])` reproduces `s`.
pub fn integrate(differenced: &[f64], initial_value: f64) -> Result<Vec<f64>> {
    ensure_finite(differenced)?;
    ensure_finite(&[initial_value])?;

    let mut result = Vec::with_capacity(differenced.len() + 1);
    let mut acc = initial_value;
    result.push(acc);
    for d in differenced {
        acc += d;
        result.push(acc);
    }
    Ok(result)
}
