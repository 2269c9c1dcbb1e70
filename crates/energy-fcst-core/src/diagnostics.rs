//! Model diagnostics: error metrics, residual analysis and train/test
//! splitting.

use crate::autocorrelation::{acf_unchecked, significance_bound};
use crate::error::{ensure_finite, ensure_len, ForecastError, Result};
use crate::metrics::{self, AccuracyReport};
use crate::stats::{moments, ZERO_TOLERANCE};
use anofox_forecast::validation::ljung_box;

/// Largest lag inspected by [`analyze_residuals`].
const RESIDUAL_MAX_LAG: usize = 3;

/// Share of the residual standard deviation the mean may reach and still
/// count as unbiased.
const BIAS_TOLERANCE: f64 = 0.1;

/// Overall verdict on a set of residuals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResidualQuality {
    /// Unbiased and free of short-lag autocorrelation
    Good,
    /// One of the two checks fails
    Acceptable,
    /// Biased and autocorrelated
    Poor,
}

/// Ljung-Box whiteness test over the residuals.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LjungBoxEvidence {
    pub statistic: f64,
    pub p_value: f64,
    pub lags: usize,
    /// p-value above 5%
    pub is_white_noise: bool,
}

/// Result of [`analyze_residuals`].
#[derive(Debug, Clone, PartialEq)]
pub struct ResidualAnalysis {
    pub mean: f64,
    /// Population variance
    pub variance: f64,
    /// `None` at zero variance
    pub skewness: Option<f64>,
    /// Excess kurtosis, `None` at zero variance
    pub kurtosis: Option<f64>,
    /// Autocorrelation at lags 1, 2, 3 (fewer for very short inputs)
    pub acf: Vec<Option<f64>>,
    /// Lags whose autocorrelation exceeds the 95% significance bound
    pub significant_lags: Vec<usize>,
    pub ljung_box: Option<LjungBoxEvidence>,
    pub quality: ResidualQuality,
}

/// Chronological train/test split.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainTestSplit {
    /// Leading observations
    pub train: Vec<f64>,
    /// Trailing observations
    pub test: Vec<f64>,
}

/// MAE, MSE, RMSE, MAPE and R² between actual and predicted values.
pub fn compute_errors(actual: &[f64], predicted: &[f64]) -> Result<AccuracyReport> {
    metrics::evaluate(actual, predicted)
}

/// Summarize residual moments and short-lag autocorrelation.
///
/// Quality is `Good` when `|mean| ≤ 0.1·std` and no lag in 1..=3 is
/// significant, `Poor` when both checks fail, and `Acceptable` otherwise.
pub fn analyze_residuals(residuals: &[f64]) -> Result<ResidualAnalysis> {
    ensure_len(residuals, 3)?;
    ensure_finite(residuals)?;

    let n = residuals.len();
    let m = moments(residuals);
    let bound = significance_bound(n);

    let acf: Vec<Option<f64>> = (1..=RESIDUAL_MAX_LAG.min(n - 1))
        .map(|k| acf_unchecked(residuals, k))
        .collect();
    let significant_lags: Vec<usize> = acf
        .iter()
        .enumerate()
        .filter_map(|(i, r)| r.filter(|r| r.abs() > bound).map(|_| i + 1))
        .collect();

    let unbiased = m.mean.abs() <= BIAS_TOLERANCE * m.variance.sqrt() + ZERO_TOLERANCE;
    let uncorrelated = significant_lags.is_empty();
    let quality = match (unbiased, uncorrelated) {
        (true, true) => ResidualQuality::Good,
        (false, false) => ResidualQuality::Poor,
        _ => ResidualQuality::Acceptable,
    };

    let lb = ljung_box(residuals, None, 0);
    let ljung_box = (lb.statistic.is_finite() && lb.p_value.is_finite()).then(|| {
        LjungBoxEvidence {
            statistic: lb.statistic,
            p_value: lb.p_value,
            lags: lb.lags,
            is_white_noise: lb.is_white_noise(0.05),
        }
    });

    Ok(ResidualAnalysis {
        mean: m.mean,
        variance: m.variance,
        skewness: m.skewness,
        kurtosis: m.kurtosis,
        acf,
        significant_lags,
        ljung_box,
        quality,
    })
}

/// Split a series into a training prefix and a test suffix without
/// shuffling.
///
/// The split index is `round(n × train_fraction)`, kept inside `[1, n − 1]`
/// so both parts are non-empty.
pub fn chronological_split(series: &[f64], train_fraction: f64) -> Result<TrainTestSplit> {
    if !(train_fraction > 0.0 && train_fraction < 1.0) {
        return Err(ForecastError::invalid_parameter(
            "train_fraction",
            train_fraction,
            "must be strictly between 0 and 1",
        ));
    }
    ensure_len(series, 2)?;

    let n = series.len();
    let split = ((n as f64 * train_fraction).round() as usize).clamp(1, n - 1);
    Ok(TrainTestSplit {
        train: series[..split].to_vec(),
        test: series[split..].to_vec(),
    })
}
