//! Classical multiplicative decomposition into trend, seasonal and residual.

use crate::error::{ensure_finite, ForecastError, Result};
use crate::stats::{mean, ZERO_TOLERANCE};
use tracing::debug;

/// Per-phase multiplicative seasonal factors with mean 1.
///
/// Every factor is strictly positive. Multiplicative seasonality is only
/// defined for positive observations, so [`decompose`] rejects series with
/// non-positive values and the profile never sees a zero ratio.
#[derive(Debug, Clone, PartialEq)]
pub struct SeasonalProfile {
    factors: Vec<f64>,
}

impl SeasonalProfile {
    /// Build a profile from raw per-phase factors, normalizing them so their
    /// arithmetic mean is 1.
    ///
    /// Returns `None` for an empty input or when any raw factor is not a
    /// positive finite number.
    pub fn normalized(raw: Vec<f64>) -> Option<SeasonalProfile> {
        if raw.is_empty() || raw.iter().any(|f| !f.is_finite() || *f <= 0.0) {
            return None;
        }
        let m = mean(&raw);
        if !m.is_finite() || m <= ZERO_TOLERANCE {
            return None;
        }
        Some(SeasonalProfile {
            factors: raw.into_iter().map(|f| f / m).collect(),
        })
    }

    /// A neutral profile: every factor is 1.
    pub fn flat(period: usize) -> SeasonalProfile {
        SeasonalProfile {
            factors: vec![1.0; period],
        }
    }

    pub fn period(&self) -> usize {
        self.factors.len()
    }

    /// Factor for the observation at `index`.
    pub fn factor_at(&self, index: usize) -> f64 {
        self.factors[index % self.factors.len()]
    }

    pub fn factors(&self) -> &[f64] {
        &self.factors
    }
}

/// Result of [`decompose`].
#[derive(Debug, Clone, PartialEq)]
pub struct Decomposition {
    /// Centered moving average trend, same length as the input
    pub trend: Vec<f64>,
    /// Normalized seasonal factors, one per phase
    pub seasonal: SeasonalProfile,
    /// `original − trend × seasonal`
    pub residual: Vec<f64>,
    /// The decomposed series
    pub original: Vec<f64>,
}

/// Centered moving average with window `period`.
///
/// Even periods use the 2×m average (half weight on both window ends).
/// Returns the interior averages and the index of the first one; the
/// result is empty when the window does not fit.
pub fn centered_moving_average(series: &[f64], period: usize) -> (Vec<f64>, usize) {
    let n = series.len();
    let half = period / 2;
    if period == 0 || n < 2 * half + 1 {
        return (Vec::new(), 0);
    }

    let values = (half..n - half)
        .map(|i| {
            if period % 2 == 1 {
                series[i - half..=i + half].iter().sum::<f64>() / period as f64
            } else {
                let inner: f64 = series[i - half + 1..i + half].iter().sum();
                (inner + 0.5 * (series[i - half] + series[i + half])) / period as f64
            }
        })
        .collect();

    (values, half)
}

/// Average `value / trend` per phase over the indices where the trend is
/// known and positive, then normalize the profile to mean 1.
///
/// Expects positive observations. Phases without a usable ratio keep a
/// neutral factor of 1.
pub(crate) fn ratio_to_trend_profile(
    series: &[f64],
    trend: &[f64],
    offset: usize,
    period: usize,
) -> SeasonalProfile {
    let mut sums = vec![0.0; period];
    let mut counts = vec![0usize; period];
    let scale = series.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()));

    for (k, &t) in trend.iter().enumerate() {
        if t <= ZERO_TOLERANCE * scale {
            continue;
        }
        let i = offset + k;
        sums[i % period] += series[i] / t;
        counts[i % period] += 1;
    }

    let raw: Vec<f64> = sums
        .iter()
        .zip(&counts)
        .map(|(&s, &c)| if c > 0 { s / c as f64 } else { 1.0 })
        .collect();

    SeasonalProfile::normalized(raw).unwrap_or_else(|| SeasonalProfile::flat(period))
}

fn ensure_positive(series: &[f64]) -> Result<()> {
    match series.iter().position(|&v| v <= 0.0) {
        Some(i) => Err(ForecastError::Domain(format!(
            "multiplicative decomposition requires positive values, got {} at index {}",
            series[i], i
        ))),
        None => Ok(()),
    }
}

/// Decompose a series into trend, seasonal and residual components.
///
/// Decomposition is advisory: a series shorter than `2 × period` yields
/// `Ok(None)` rather than an error.
///
/// # Errors
/// * `InvalidParameter` if `period` is 0
/// * `Domain` for non-finite or non-positive observations
pub fn decompose(series: &[f64], period: usize) -> Result<Option<Decomposition>> {
    if period == 0 {
        return Err(ForecastError::invalid_parameter(
            "period",
            period,
            "must be positive",
        ));
    }
    ensure_finite(series)?;
    ensure_positive(series)?;

    let n = series.len();
    if n < 2 * period {
        debug!(n, period, "series too short to decompose");
        return Ok(None);
    }

    let (interior, offset) = centered_moving_average(series, period);
    let seasonal = ratio_to_trend_profile(series, &interior, offset, period);

    // Edges repeat the nearest interior trend value
    let first = interior[0];
    let last = interior[interior.len() - 1];
    let mut trend = Vec::with_capacity(n);
    trend.extend(std::iter::repeat(first).take(offset));
    trend.extend_from_slice(&interior);
    trend.resize(n, last);

    let residual = series
        .iter()
        .zip(&trend)
        .enumerate()
        .map(|(i, (&x, &t))| x - t * seasonal.factor_at(i))
        .collect();

    Ok(Some(Decomposition {
        trend,
        seasonal,
        residual,
        original: series.to_vec(),
    }))
}
