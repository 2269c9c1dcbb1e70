//! Accuracy metrics shared by the forecaster and the decomposer.
//!
//! - **Scale-dependent metrics**: MAE, MSE, RMSE
//! - **Percentage metrics**: MAPE
//! - **Explained variance**: R²
//!
//! Percentage and explained-variance metrics can be undefined: MAPE when
//! every actual value is zero, R² when the actual series is constant. Both
//! are then reported as `None`.

use crate::error::{ensure_finite, ensure_same_len, ForecastError, Result};
use crate::stats::{is_negligible, mean, sum_of_squares};

/// Accuracy of a predicted sequence against the observed one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AccuracyReport {
    /// Mean absolute error
    pub mae: f64,
    /// Mean squared error
    pub mse: f64,
    /// Root mean squared error
    pub rmse: f64,
    /// Mean absolute percentage error (0-100+), `None` if all actuals are zero
    pub mape: Option<f64>,
    /// Coefficient of determination, `None` if the actuals have no variance
    pub r2: Option<f64>,
}

/// Calculates Mean Absolute Error between actual and predicted values.
///
/// # Formula
/// MAE = (1/n) * Σ|actual_i - predicted_i|
///
/// # Example
/// ```
/// use energy_fcst_core::metrics::mae;
/// let actual = vec![1.0, 2.0, 3.0];
/// let predicted = vec![1.1, 2.2, 2.8];
/// let error = mae(&actual, &predicted).unwrap();
/// assert!((error - 0.166).abs() < 0.01);
/// ```
pub fn mae(actual: &[f64], predicted: &[f64]) -> Result<f64> {
    validate_inputs(actual, predicted)?;
    let sum: f64 = actual
        .iter()
        .zip(predicted.iter())
        .map(|(a, p)| (a - p).abs())
        .sum();
    Ok(sum / actual.len() as f64)
}

/// Calculates Mean Squared Error between actual and predicted values.
///
/// # Formula
/// MSE = (1/n) * Σ(actual_i - predicted_i)²
pub fn mse(actual: &[f64], predicted: &[f64]) -> Result<f64> {
    validate_inputs(actual, predicted)?;
    let sum: f64 = actual
        .iter()
        .zip(predicted.iter())
        .map(|(a, p)| (a - p).powi(2))
        .sum();
    Ok(sum / actual.len() as f64)
}

/// Calculates Root Mean Squared Error between actual and predicted values.
///
/// # Formula
/// RMSE = √MSE
pub fn rmse(actual: &[f64], predicted: &[f64]) -> Result<f64> {
    Ok(mse(actual, predicted)?.sqrt())
}

/// Calculates Mean Absolute Percentage Error.
///
/// Terms whose actual value is zero are skipped. If no term remains the
/// metric is undefined and `None` is returned.
///
/// # Formula
/// MAPE = (100/k) * Σ|actual_i - predicted_i| / |actual_i|, over the k non-zero actuals
pub fn mape(actual: &[f64], predicted: &[f64]) -> Result<Option<f64>> {
    validate_inputs(actual, predicted)?;
    let (sum, count) = actual
        .iter()
        .zip(predicted.iter())
        .filter(|(a, _)| a.abs() > f64::EPSILON)
        .fold((0.0, 0usize), |(s, c), (a, p)| {
            (s + ((a - p) / a).abs(), c + 1)
        });
    if count == 0 {
        return Ok(None);
    }
    Ok(Some(sum / count as f64 * 100.0))
}

/// R-squared (coefficient of determination).
///
/// `None` when the actual series is constant (SS_tot = 0).
///
/// # Formula
/// R² = 1 - SS_res / SS_tot
pub fn r2(actual: &[f64], predicted: &[f64]) -> Result<Option<f64>> {
    validate_inputs(actual, predicted)?;

    let m = mean(actual);
    let ss_res: f64 = actual
        .iter()
        .zip(predicted.iter())
        .map(|(a, p)| (a - p).powi(2))
        .sum();
    let ss_tot: f64 = actual.iter().map(|a| (a - m).powi(2)).sum();

    if is_negligible(ss_tot, sum_of_squares(actual)) {
        return Ok(None);
    }

    Ok(Some(1.0 - ss_res / ss_tot))
}

/// Compute every accuracy metric at once.
pub fn evaluate(actual: &[f64], predicted: &[f64]) -> Result<AccuracyReport> {
    let mse = mse(actual, predicted)?;
    Ok(AccuracyReport {
        mae: mae(actual, predicted)?,
        mse,
        rmse: mse.sqrt(),
        mape: mape(actual, predicted)?,
        r2: r2(actual, predicted)?,
    })
}

fn validate_inputs(actual: &[f64], predicted: &[f64]) -> Result<()> {
    ensure_same_len(actual, predicted)?;
    if actual.is_empty() {
        return Err(ForecastError::InsufficientData { needed: 1, got: 0 });
    }
    ensure_finite(actual)?;
    ensure_finite(predicted)
}
