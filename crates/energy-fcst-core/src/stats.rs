//! Descriptive statistics shared by the engine modules.
//!
//! All functions here expect a non-empty slice; callers validate length
//! before reaching for them.

/// Magnitude below which a denominator is treated as zero.
pub(crate) const ZERO_TOLERANCE: f64 = 1e-12;

/// Whether `value` vanishes next to `scale`, where both are measured in
/// the same units (a sum of squared deviations against the sum of squares
/// of the data, for example). Exact zeros are negligible at any scale.
pub(crate) fn is_negligible(value: f64, scale: f64) -> bool {
    value.abs() <= ZERO_TOLERANCE * scale.abs()
}

/// Sum of squared values.
pub(crate) fn sum_of_squares(values: &[f64]) -> f64 {
    values.iter().map(|v| v * v).sum()
}

/// Arithmetic mean.
pub fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population variance (divides by n).
pub fn population_variance(values: &[f64]) -> f64 {
    let m = mean(values);
    values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64
}

/// Population standard deviation (divides by n).
pub fn population_std_dev(values: &[f64]) -> f64 {
    population_variance(values).sqrt()
}

/// Percentage difference of `value` relative to `base`.
///
/// Undefined (`None`) when the base is zero.
pub fn relative_percent(value: f64, base: f64) -> Option<f64> {
    if base.abs() < ZERO_TOLERANCE {
        None
    } else {
        Some((value - base) / base.abs() * 100.0)
    }
}

/// Least-squares slope of `values` against their index 0..n-1.
///
/// Returns 0 for fewer than two points.
pub fn index_slope(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }

    let x_mean = (n as f64 - 1.0) / 2.0;
    let y_mean = mean(values);

    let (ss_xy, ss_xx) = values
        .iter()
        .enumerate()
        .fold((0.0, 0.0), |(xy, xx), (i, &y)| {
            let dx = i as f64 - x_mean;
            (xy + dx * (y - y_mean), xx + dx * dx)
        });

    ss_xy / ss_xx
}

/// Third and fourth standardized population moments.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Moments {
    pub mean: f64,
    pub variance: f64,
    /// Population skewness, `None` at zero variance
    pub skewness: Option<f64>,
    /// Population excess kurtosis, `None` at zero variance
    pub kurtosis: Option<f64>,
}

/// Compute mean, variance, skewness and excess kurtosis in one pass over
/// the centered values.
pub fn moments(values: &[f64]) -> Moments {
    let n = values.len() as f64;
    let m = mean(values);

    let (m2, m3, m4) = values.iter().fold((0.0, 0.0, 0.0), |(s2, s3, s4), v| {
        let d = v - m;
        let d2 = d * d;
        (s2 + d2, s3 + d2 * d, s4 + d2 * d2)
    });
    let variance = m2 / n;

    if is_negligible(m2, sum_of_squares(values)) {
        return Moments {
            mean: m,
            variance,
            skewness: None,
            kurtosis: None,
        };
    }

    let std_dev = variance.sqrt();
    Moments {
        mean: m,
        variance,
        skewness: Some(m3 / n / std_dev.powi(3)),
        kurtosis: Some(m4 / n / variance.powi(2) - 3.0),
    }
}
