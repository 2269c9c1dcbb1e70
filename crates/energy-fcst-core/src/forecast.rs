//! Point forecasts with confidence intervals.
//!
//! Forecasts are trend projections from a linear fit over x = 1..n, either
//! on their own or scaled by a seasonal profile, plus interval forecasts
//! from the smoothing models. Forecast values and lower bounds are clamped
//! at zero because consumption cannot be negative.

use crate::decomposition::ratio_to_trend_profile;
use crate::error::{ensure_finite, ensure_len, ForecastError, Result};
use crate::metrics::{self, AccuracyReport};
use crate::regression::{fit_linear, FittedModel};
use crate::smoothing::{
    holt_smoothing, holt_winters_smoothing, simple_exponential_smoothing, SmoothingParams,
};
use statrs::distribution::{ContinuousCDF, Normal};
use std::str::FromStr;
use tracing::debug;

/// A confidence level strictly between 0 and 1, with its two-sided z value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConfidenceLevel {
    level: f64,
    z: f64,
}

impl ConfidenceLevel {
    /// Validate `level` and compute its standard normal quantile.
    pub fn new(level: f64) -> Result<ConfidenceLevel> {
        if !(level > 0.0 && level < 1.0) {
            return Err(ForecastError::invalid_parameter(
                "confidence_level",
                level,
                "must be strictly between 0 and 1",
            ));
        }
        let normal = Normal::new(0.0, 1.0)
            .map_err(|e| ForecastError::NumericalInstability(e.to_string()))?;
        Ok(ConfidenceLevel {
            level,
            z: normal.inverse_cdf(0.5 + level / 2.0),
        })
    }

    pub fn level(&self) -> f64 {
        self.level
    }

    /// Two-sided z value (1.959964… for 95%).
    pub fn z(&self) -> f64 {
        self.z
    }
}

impl Default for ConfidenceLevel {
    fn default() -> Self {
        ConfidenceLevel {
            level: 0.95,
            z: 1.959_963_984_540_054,
        }
    }
}

/// How the interval half-width evolves over the forecast horizon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IntervalWidening {
    /// Same half-width `z·se` at every step
    #[default]
    Constant,
    /// Half-width `z·se·√step`, growing with the horizon
    SqrtHorizon,
}

impl IntervalWidening {
    fn factor(self, step: usize) -> f64 {
        match self {
            IntervalWidening::Constant => 1.0,
            IntervalWidening::SqrtHorizon => (step as f64).sqrt(),
        }
    }
}

impl FromStr for IntervalWidening {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s.to_lowercase().as_str() {
            "sqrt" | "sqrt_horizon" | "widening" => Self::SqrtHorizon,
            _ => Self::Constant,
        })
    }
}

/// Forecast options.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ForecastOptions {
    /// Confidence level of the interval (default 95%)
    pub confidence: ConfidenceLevel,
    /// Interval growth over the horizon (default constant)
    pub widening: IntervalWidening,
}

/// A single forecast step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForecastPoint {
    /// 1-based step past the last observation
    pub horizon_step: usize,
    /// Point forecast, never negative
    pub value: f64,
    /// Lower interval bound, never negative
    pub lower_bound: f64,
    /// Upper interval bound, never below `value`
    pub upper_bound: f64,
    pub confidence: ConfidenceLevel,
}

/// Model used by [`forecast_with_interval`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SmoothingMethod {
    /// Linear trend over x = 1..n
    Linear,
    /// Single exponential smoothing (flat forecast)
    Simple { alpha: f64 },
    /// Holt's double exponential smoothing
    Holt { alpha: f64, beta: f64 },
    /// Multiplicative Holt-Winters
    HoltWinters {
        period: usize,
        params: SmoothingParams,
    },
}

fn ensure_horizon(horizon: usize) -> Result<()> {
    if horizon == 0 {
        return Err(ForecastError::invalid_parameter(
            "horizon",
            horizon,
            "must be at least 1",
        ));
    }
    Ok(())
}

/// Turn raw projections into clamped forecast points.
fn build_points(
    raw: &[f64],
    std_error: f64,
    options: &ForecastOptions,
) -> Vec<ForecastPoint> {
    raw.iter()
        .enumerate()
        .map(|(i, &projection)| {
            let step = i + 1;
            let half_width = options.confidence.z() * std_error * options.widening.factor(step);
            let value = projection.max(0.0);
            ForecastPoint {
                horizon_step: step,
                value,
                lower_bound: (projection - half_width).max(0.0),
                upper_bound: (projection + half_width).max(value),
                confidence: options.confidence,
            }
        })
        .collect()
}

/// Standard error of residuals with `params` fitted parameters.
fn residual_std_error(residuals: &[f64], params: usize) -> f64 {
    let dof = residuals.len().saturating_sub(params).max(1);
    (residuals.iter().map(|r| r * r).sum::<f64>() / dof as f64).sqrt()
}

/// Linear trend over x = 1..n together with its in-sample fit.
fn fit_trend(series: &[f64]) -> Result<(FittedModel, Vec<f64>)> {
    let x: Vec<f64> = (1..=series.len()).map(|i| i as f64).collect();
    let model = fit_linear(&x, series)?;
    Ok((model, model.predict_many(&x)))
}

/// Linear trend forecast with a constant-width 95% interval.
///
/// # Errors
/// * `InsufficientData` for fewer than 3 observations
/// * `InvalidParameter` for a zero horizon
///
/// # Example
/// ```
/// use energy_fcst_core::forecast::forecast;
/// let points = forecast(&[10.0, 20.0, 30.0, 40.0, 50.0], 3).unwrap();
/// assert!((points[0].value - 60.0).abs() < 1e-9);
/// assert!((points[2].value - 80.0).abs() < 1e-9);
/// ```
pub fn forecast(series: &[f64], horizon: usize) -> Result<Vec<ForecastPoint>> {
    forecast_with_options(series, horizon, &ForecastOptions::default())
}

/// Linear trend forecast with explicit interval options.
pub fn forecast_with_options(
    series: &[f64],
    horizon: usize,
    options: &ForecastOptions,
) -> Result<Vec<ForecastPoint>> {
    ensure_len(series, 3)?;
    ensure_finite(series)?;
    ensure_horizon(horizon)?;

    let n = series.len();
    let (model, fitted) = fit_trend(series)?;
    let residuals: Vec<f64> = series.iter().zip(&fitted).map(|(y, f)| y - f).collect();
    let std_error = residual_std_error(&residuals, 2);

    let raw: Vec<f64> = (1..=horizon).map(|h| model.predict((n + h) as f64)).collect();
    Ok(build_points(&raw, std_error, options))
}

/// Linear trend forecast scaled by a seasonal profile.
///
/// The profile is the ratio of each observation to its trend value,
/// averaged per phase and normalized to mean 1. Series shorter than
/// `2 × period`, or holding non-positive values, fall back to [`forecast`].
pub fn forecast_with_seasonality(
    series: &[f64],
    horizon: usize,
    period: usize,
) -> Result<Vec<ForecastPoint>> {
    forecast_with_seasonality_options(series, horizon, period, &ForecastOptions::default())
}

/// Seasonal trend forecast with explicit interval options.
pub fn forecast_with_seasonality_options(
    series: &[f64],
    horizon: usize,
    period: usize,
    options: &ForecastOptions,
) -> Result<Vec<ForecastPoint>> {
    if period == 0 {
        return Err(ForecastError::invalid_parameter(
            "period",
            period,
            "must be positive",
        ));
    }
    if series.len() < 2 * period {
        debug!(
            n = series.len(),
            period, "too short for seasonal forecast, using linear trend"
        );
        return forecast_with_options(series, horizon, options);
    }
    ensure_len(series, 3)?;
    ensure_finite(series)?;
    ensure_horizon(horizon)?;
    if series.iter().any(|&v| v <= 0.0) {
        debug!("non-positive observations, using linear trend");
        return forecast_with_options(series, horizon, options);
    }

    let n = series.len();
    let (model, trend) = fit_trend(series)?;
    let profile = ratio_to_trend_profile(series, &trend, 0, period);

    let residuals: Vec<f64> = series
        .iter()
        .zip(&trend)
        .enumerate()
        .map(|(i, (y, t))| y - t * profile.factor_at(i))
        .collect();
    let std_error = residual_std_error(&residuals, 2);

    let raw: Vec<f64> = (1..=horizon)
        .map(|h| model.predict((n + h) as f64) * profile.factor_at(n + h - 1))
        .collect();
    Ok(build_points(&raw, std_error, options))
}

/// Forecast with an interval that widens with `√step`.
///
/// The standard error is taken from the model's one-step-ahead in-sample
/// residuals.
pub fn forecast_with_interval(
    series: &[f64],
    steps: usize,
    method: SmoothingMethod,
    confidence: ConfidenceLevel,
) -> Result<Vec<ForecastPoint>> {
    ensure_horizon(steps)?;
    ensure_finite(series)?;

    let (raw, std_error) = match method {
        SmoothingMethod::Linear => {
            ensure_len(series, 3)?;
            let n = series.len();
            let (model, fitted) = fit_trend(series)?;
            let residuals: Vec<f64> = series.iter().zip(&fitted).map(|(y, f)| y - f).collect();
            let raw = (1..=steps).map(|h| model.predict((n + h) as f64)).collect();
            (raw, residual_std_error(&residuals, 2))
        }
        SmoothingMethod::Simple { alpha } => {
            ensure_len(series, 2)?;
            let smoothed = simple_exponential_smoothing(series, alpha)?;
            let residuals: Vec<f64> = series[1..]
                .iter()
                .zip(&smoothed)
                .map(|(y, s)| y - s)
                .collect();
            let last = smoothed[smoothed.len() - 1];
            (vec![last; steps], residual_std_error(&residuals, 0))
        }
        SmoothingMethod::Holt { alpha, beta } => {
            let fit = holt_smoothing(series, alpha, beta)?;
            let residuals: Vec<f64> = series[1..]
                .iter()
                .zip(&fit.fitted[1..])
                .map(|(y, f)| y - f)
                .collect();
            (fit.forecast(steps), residual_std_error(&residuals, 0))
        }
        SmoothingMethod::HoltWinters { period, params } => {
            let fit = holt_winters_smoothing(series, period, params)?;
            let residuals: Vec<f64> = series[period..]
                .iter()
                .zip(&fit.fitted[period..])
                .map(|(y, f)| y - f)
                .collect();
            (fit.forecast(steps), residual_std_error(&residuals, 0))
        }
    };

    let options = ForecastOptions {
        confidence,
        widening: IntervalWidening::SqrtHorizon,
    };
    Ok(build_points(&raw, std_error, &options))
}

/// Compare observed values with predictions.
///
/// # Errors
/// * `DimensionMismatch` if the inputs differ in length
pub fn evaluate_accuracy(actual: &[f64], predicted: &[f64]) -> Result<AccuracyReport> {
    metrics::evaluate(actual, predicted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn seasonal_data(years: usize) -> Vec<f64> {
        let pattern = [1.2, 1.1, 1.0, 0.9, 0.8, 0.8, 0.9, 1.0, 1.0, 1.1, 1.1, 1.1];
        (0..years * 12)
            .map(|i| (200.0 + 2.0 * i as f64) * pattern[i % 12])
            .collect()
    }

    #[test]
    fn test_confidence_level_z() {
        let c = ConfidenceLevel::new(0.95).unwrap();
        assert_relative_eq!(c.z(), 1.96, epsilon = 1e-3);
        assert_relative_eq!(ConfidenceLevel::default().z(), c.z(), epsilon = 1e-9);
        assert_relative_eq!(ConfidenceLevel::new(0.80).unwrap().z(), 1.2816, epsilon = 1e-3);
    }

    #[test]
    fn test_confidence_level_rejects_out_of_range() {
        assert!(ConfidenceLevel::new(0.0).is_err());
        assert!(ConfidenceLevel::new(1.0).is_err());
        assert!(ConfidenceLevel::new(-0.5).is_err());
        assert!(ConfidenceLevel::new(f64::NAN).is_err());
    }

    #[test]
    fn test_interval_widening_from_str() {
        assert_eq!(
            "sqrt".parse::<IntervalWidening>().unwrap(),
            IntervalWidening::SqrtHorizon
        );
        assert_eq!(
            "constant".parse::<IntervalWidening>().unwrap(),
            IntervalWidening::Constant
        );
    }

    #[test]
    fn test_forecast_linear_exact() {
        let points = forecast(&[10.0, 20.0, 30.0, 40.0, 50.0], 3).unwrap();
        let values: Vec<f64> = points.iter().map(|p| p.value).collect();
        assert_relative_eq!(values[0], 60.0, epsilon = 1e-9);
        assert_relative_eq!(values[1], 70.0, epsilon = 1e-9);
        assert_relative_eq!(values[2], 80.0, epsilon = 1e-9);
        assert_eq!(points[2].horizon_step, 3);
        // Perfect fit: zero-width interval
        assert_relative_eq!(points[0].upper_bound, 60.0, epsilon = 1e-6);
    }

    #[test]
    fn test_forecast_constant_width() {
        let series = vec![10.0, 14.0, 11.0, 17.0, 15.0, 19.0];
        let points = forecast(&series, 4).unwrap();
        let widths: Vec<f64> = points.iter().map(|p| p.upper_bound - p.value).collect();
        for w in &widths {
            assert_relative_eq!(*w, widths[0], epsilon = 1e-9);
        }
        assert!(widths[0] > 0.0);
    }

    #[test]
    fn test_forecast_opt_in_widening() {
        let series = vec![10.0, 14.0, 11.0, 17.0, 15.0, 19.0];
        let options = ForecastOptions {
            widening: IntervalWidening::SqrtHorizon,
            ..Default::default()
        };
        let points = forecast_with_options(&series, 4, &options).unwrap();
        let w1 = points[0].upper_bound - points[0].value;
        let w4 = points[3].upper_bound - points[3].value;
        assert_relative_eq!(w4, 2.0 * w1, epsilon = 1e-9);
    }

    #[test]
    fn test_forecast_clamps_decreasing_series() {
        let series = vec![100.0, 70.0, 40.0, 10.0];
        let points = forecast(&series, 5).unwrap();
        for p in &points {
            assert!(p.value >= 0.0);
            assert!(p.lower_bound >= 0.0);
            assert!(p.upper_bound >= p.value);
        }
        assert_eq!(points[4].value, 0.0);
    }

    #[test]
    fn test_forecast_insufficient_data() {
        assert!(matches!(
            forecast(&[1.0, 2.0], 3),
            Err(ForecastError::InsufficientData { needed: 3, got: 2 })
        ));
        assert!(forecast(&[1.0, 2.0, 3.0], 0).is_err());
    }

    #[test]
    fn test_forecast_with_seasonality_pattern() {
        let series = seasonal_data(3);
        let points = forecast_with_seasonality(&series, 12, 12).unwrap();
        assert_eq!(points.len(), 12);
        // Step 1 is January (phase 0, high), step 5 is May (phase 4, low)
        assert!(points[0].value > points[4].value);
    }

    #[test]
    fn test_forecast_with_seasonality_phase_continues_past_partial_cycle() {
        // 27 points: two full years plus three months, so step 1 is phase 3
        let mut pattern = [1.0; 12];
        pattern[3] = 0.5;
        let series: Vec<f64> = (0..27).map(|i| 100.0 * pattern[i % 12]).collect();

        let points = forecast_with_seasonality(&series, 3, 12).unwrap();
        assert!(points[0].value < 0.6 * points[1].value);
        assert_relative_eq!(points[1].value, points[2].value, max_relative = 0.05);
    }

    #[test]
    fn test_forecast_with_seasonality_non_positive_falls_back() {
        let series: Vec<f64> = (0..24).map(|i| if i % 4 == 0 { 0.0 } else { 10.0 }).collect();
        let seasonal = forecast_with_seasonality(&series, 3, 4).unwrap();
        let plain = forecast(&series, 3).unwrap();
        assert_eq!(seasonal, plain);
    }

    #[test]
    fn test_forecast_with_seasonality_falls_back() {
        let series: Vec<f64> = (0..10).map(|i| 10.0 + i as f64).collect();
        let seasonal = forecast_with_seasonality(&series, 3, 12).unwrap();
        let plain = forecast(&series, 3).unwrap();
        assert_eq!(seasonal, plain);
    }

    #[test]
    fn test_forecast_with_interval_widens() {
        let series = vec![10.0, 14.0, 11.0, 17.0, 15.0, 19.0, 18.0, 22.0];
        for method in [
            SmoothingMethod::Linear,
            SmoothingMethod::Simple { alpha: 0.5 },
            SmoothingMethod::Holt {
                alpha: 0.5,
                beta: 0.2,
            },
        ] {
            let points =
                forecast_with_interval(&series, 4, method, ConfidenceLevel::default()).unwrap();
            let w1 = points[0].upper_bound - points[0].value;
            let w4 = points[3].upper_bound - points[3].value;
            assert!(w4 > w1, "{:?} did not widen", method);
        }
    }

    #[test]
    fn test_forecast_with_interval_holt_winters() {
        let series = seasonal_data(3);
        let method = SmoothingMethod::HoltWinters {
            period: 12,
            params: SmoothingParams::default(),
        };
        let points =
            forecast_with_interval(&series, 12, method, ConfidenceLevel::default()).unwrap();
        assert_eq!(points.len(), 12);
        assert!(points.iter().all(|p| p.lower_bound <= p.value && p.value <= p.upper_bound));
    }

    #[test]
    fn test_evaluate_accuracy() {
        let report = evaluate_accuracy(&[10.0, 20.0, 30.0], &[10.0, 20.0, 30.0]).unwrap();
        assert_eq!(report.mae, 0.0);
        assert_eq!(report.rmse, 0.0);
        assert_eq!(report.mape, Some(0.0));
        assert_relative_eq!(report.r2.unwrap(), 1.0, epsilon = 1e-12);

        assert!(matches!(
            evaluate_accuracy(&[1.0, 2.0, 3.0], &[1.0, 2.0]),
            Err(ForecastError::DimensionMismatch { left: 3, right: 2 })
        ));
    }
}
