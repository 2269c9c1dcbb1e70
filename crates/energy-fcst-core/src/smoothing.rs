//! Exponential smoothing: single, double (Holt) and triple (Holt-Winters).
//!
//! # Recursions
//!
//! ```text
//! SES:          s_t = α x_t + (1 - α) s_{t-1}
//! Holt level:   L_t = α x_t + (1 - α)(L_{t-1} + T_{t-1})
//! Holt trend:   T_t = β (L_t - L_{t-1}) + (1 - β) T_{t-1}
//! HW level:     L_t = α (x_t / S_{t-m}) + (1 - α)(L_{t-1} + T_{t-1})
//! HW season:    S_t = γ (x_t / L_t) + (1 - γ) S_{t-m}
//! HW forecast:  F_{t+h} = (L_t + h T_t) S_{t-m+h_m}
//! ```
//!
//! Every forecast produced here is clamped to be non-negative.

use crate::error::{ensure_finite, ensure_len, ensure_unit_interval, ForecastError, Result};
use crate::stats::ZERO_TOLERANCE;

/// Smoothing weights for level (alpha), trend (beta) and season (gamma).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmoothingParams {
    pub alpha: f64,
    pub beta: f64,
    pub gamma: f64,
}

impl Default for SmoothingParams {
    fn default() -> Self {
        Self {
            alpha: 0.3,
            beta: 0.1,
            gamma: 0.1,
        }
    }
}

impl SmoothingParams {
    /// Check that every weight lies in [0, 1].
    pub fn validate(&self) -> Result<()> {
        ensure_unit_interval("alpha", self.alpha)?;
        ensure_unit_interval("beta", self.beta)?;
        ensure_unit_interval("gamma", self.gamma)
    }
}

/// Single exponential smoothing.
///
/// `s[0] = series[0]`, then `s[i] = α·series[i] + (1 − α)·s[i−1]`.
pub fn simple_exponential_smoothing(series: &[f64], alpha: f64) -> Result<Vec<f64>> {
    ensure_unit_interval("alpha", alpha)?;
    ensure_len(series, 1)?;
    ensure_finite(series)?;

    let mut smoothed = Vec::with_capacity(series.len());
    let mut level = series[0];
    smoothed.push(level);
    for &v in &series[1..] {
        level = alpha * v + (1.0 - alpha) * level;
        smoothed.push(level);
    }
    Ok(smoothed)
}

/// In-sample state of a Holt (double exponential) fit.
#[derive(Debug, Clone, PartialEq)]
pub struct HoltFit {
    /// Level estimates, one per observation
    pub level: Vec<f64>,
    /// Trend estimates, one per observation
    pub trend: Vec<f64>,
    /// One-step-ahead in-sample forecasts (`fitted[0]` is the first value)
    pub fitted: Vec<f64>,
}

impl HoltFit {
    fn last_state(&self) -> (f64, f64) {
        // A fit always holds at least two observations
        let n = self.level.len();
        (self.level[n - 1], self.trend[n - 1])
    }

    /// Forecast one step past the last observation: `level + trend`.
    pub fn one_step_forecast(&self) -> f64 {
        let (level, trend) = self.last_state();
        (level + trend).max(0.0)
    }

    /// Forecast `steps` values past the last observation.
    pub fn forecast(&self, steps: usize) -> Vec<f64> {
        let (level, trend) = self.last_state();
        (1..=steps)
            .map(|h| (level + h as f64 * trend).max(0.0))
            .collect()
    }
}

/// Double exponential smoothing with level and additive trend.
///
/// Starts from `level = series[0]` and `trend = series[1] − series[0]`.
pub fn holt_smoothing(series: &[f64], alpha: f64, beta: f64) -> Result<HoltFit> {
    ensure_unit_interval("alpha", alpha)?;
    ensure_unit_interval("beta", beta)?;
    ensure_len(series, 2)?;
    ensure_finite(series)?;

    let n = series.len();
    let mut level = Vec::with_capacity(n);
    let mut trend = Vec::with_capacity(n);
    let mut fitted = Vec::with_capacity(n);

    level.push(series[0]);
    trend.push(series[1] - series[0]);
    fitted.push(series[0]);

    for t in 1..n {
        let (l_prev, b_prev) = (level[t - 1], trend[t - 1]);
        fitted.push(l_prev + b_prev);
        let l = alpha * series[t] + (1.0 - alpha) * (l_prev + b_prev);
        trend.push(beta * (l - l_prev) + (1.0 - beta) * b_prev);
        level.push(l);
    }

    Ok(HoltFit {
        level,
        trend,
        fitted,
    })
}

/// In-sample state of a multiplicative Holt-Winters fit.
#[derive(Debug, Clone, PartialEq)]
pub struct HoltWintersFit {
    /// Seasonal period m
    pub period: usize,
    /// Level estimates, one per observation
    pub level: Vec<f64>,
    /// Trend estimates, one per observation
    pub trend: Vec<f64>,
    /// Seasonal index in effect at each observation
    pub seasonal: Vec<f64>,
    /// One-step-ahead in-sample forecasts; the first `period` entries
    /// reproduce the initialization cycle
    pub fitted: Vec<f64>,
}

impl HoltWintersFit {
    /// Forecast `steps` values past the last observation, cycling through
    /// the last `period` seasonal indices.
    pub fn forecast(&self, steps: usize) -> Vec<f64> {
        let n = self.level.len();
        let (level, trend) = (self.level[n - 1], self.trend[n - 1]);
        let last_cycle = &self.seasonal[n - self.period..];

        (1..=steps)
            .map(|h| {
                let season = last_cycle[(h - 1) % self.period];
                ((level + h as f64 * trend) * season).max(0.0)
            })
            .collect()
    }
}

/// Triple exponential smoothing with multiplicative seasonality.
///
/// # Initialization
/// * level = mean of the first cycle
/// * trend = mean of `(x[m+i] − x[i]) / m` over the first two cycles
/// * seasonal[i] = `x[i] / level` for the first cycle
///
/// # Errors
/// * `InvalidParameter` for a weight outside [0, 1] or `period < 2`
/// * `InsufficientData` for fewer than `2 × period` observations
/// * `Domain` for non-positive observations
/// * `NumericalInstability` if the level collapses to zero
pub fn holt_winters_smoothing(
    series: &[f64],
    period: usize,
    params: SmoothingParams,
) -> Result<HoltWintersFit> {
    params.validate()?;
    if period < 2 {
        return Err(ForecastError::invalid_parameter(
            "period",
            period,
            "must be at least 2",
        ));
    }
    ensure_len(series, 2 * period)?;
    ensure_finite(series)?;
    if let Some(i) = series.iter().position(|&v| v <= 0.0) {
        return Err(ForecastError::Domain(format!(
            "multiplicative seasonality requires positive values, got {} at index {}",
            series[i], i
        )));
    }

    let SmoothingParams { alpha, beta, gamma } = params;
    let m = period;
    let n = series.len();

    let l0 = series[..m].iter().sum::<f64>() / m as f64;
    let t0 = (0..m)
        .map(|i| (series[m + i] - series[i]) / m as f64)
        .sum::<f64>()
        / m as f64;

    let mut level = vec![l0; m];
    let mut trend = vec![t0; m];
    let mut seasonal: Vec<f64> = series[..m].iter().map(|v| v / l0).collect();
    let mut fitted: Vec<f64> = series[..m].to_vec();

    level.reserve(n - m);
    trend.reserve(n - m);
    seasonal.reserve(n - m);
    fitted.reserve(n - m);

    for t in m..n {
        let (l_prev, b_prev) = (level[t - 1], trend[t - 1]);
        let s_prev = seasonal[t - m];

        fitted.push((l_prev + b_prev) * s_prev);

        let l = alpha * (series[t] / s_prev) + (1.0 - alpha) * (l_prev + b_prev);
        if l.abs() < ZERO_TOLERANCE || !l.is_finite() {
            return Err(ForecastError::NumericalInstability(format!(
                "Holt-Winters level collapsed at index {}",
                t
            )));
        }
        let b = beta * (l - l_prev) + (1.0 - beta) * b_prev;
        let s = gamma * (series[t] / l) + (1.0 - gamma) * s_prev;

        level.push(l);
        trend.push(b);
        seasonal.push(s);
    }

    Ok(HoltWintersFit {
        period,
        level,
        trend,
        seasonal,
        fitted,
    })
}
