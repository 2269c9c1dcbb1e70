//! Autocorrelation (ACF) and partial autocorrelation (PACF).

use crate::error::{ensure_finite, ForecastError, Result};
use crate::stats::{is_negligible, mean, sum_of_squares, ZERO_TOLERANCE};

fn validate_lag(series: &[f64], lag: usize) -> Result<()> {
    if series.len() <= lag {
        return Err(ForecastError::InsufficientData {
            needed: lag + 1,
            got: series.len(),
        });
    }
    ensure_finite(series)
}

/// Sample autocorrelation at `lag`.
///
/// r_k = Σ(x_t − x̄)(x_{t+k} − x̄) / Σ(x_t − x̄)²
///
/// Undefined (`None`) for a series with zero variance.
pub fn autocorrelation(series: &[f64], lag: usize) -> Result<Option<f64>> {
    validate_lag(series, lag)?;
    Ok(acf_unchecked(series, lag))
}

/// Autocorrelations for lags `0..=max_lag`.
pub fn acf(series: &[f64], max_lag: usize) -> Result<Vec<Option<f64>>> {
    validate_lag(series, max_lag)?;
    Ok((0..=max_lag).map(|k| acf_unchecked(series, k)).collect())
}

pub(crate) fn acf_unchecked(series: &[f64], lag: usize) -> Option<f64> {
    let m = mean(series);
    let denominator: f64 = series.iter().map(|v| (v - m).powi(2)).sum();
    if is_negligible(denominator, sum_of_squares(series)) {
        return None;
    }

    let numerator: f64 = series
        .iter()
        .zip(series.iter().skip(lag))
        .map(|(a, b)| (a - m) * (b - m))
        .sum();

    Some(numerator / denominator)
}

/// Partial autocorrelations for lags `1..=max_lag` via the Durbin–Levinson
/// recursion.
///
/// Element `k - 1` holds the PACF at lag `k`. Once the recursion's
/// denominator vanishes every remaining lag is `None`; a zero-variance
/// series yields `None` at every lag.
pub fn partial_autocorrelation(series: &[f64], max_lag: usize) -> Result<Vec<Option<f64>>> {
    if max_lag == 0 {
        return Err(ForecastError::invalid_parameter(
            "max_lag",
            max_lag,
            "must be at least 1",
        ));
    }
    validate_lag(series, max_lag)?;

    let rho: Vec<f64> = match (0..=max_lag)
        .map(|k| acf_unchecked(series, k))
        .collect::<Option<Vec<f64>>>()
    {
        Some(r) => r,
        None => return Ok(vec![None; max_lag]),
    };

    let mut pacf = Vec::with_capacity(max_lag);
    // phi[j] holds the AR coefficients of the order-(k-1) fit
    let mut phi = vec![0.0; max_lag + 1];
    phi[1] = rho[1];
    pacf.push(Some(rho[1]));

    for k in 2..=max_lag {
        let num = rho[k] - (1..k).map(|j| phi[j] * rho[k - j]).sum::<f64>();
        let denom = 1.0 - (1..k).map(|j| phi[j] * rho[j]).sum::<f64>();

        if denom.abs() < ZERO_TOLERANCE {
            pacf.resize(max_lag, None);
            return Ok(pacf);
        }

        let phi_kk = num / denom;
        let previous = phi.clone();
        for j in 1..k {
            phi[j] = previous[j] - phi_kk * previous[k - j];
        }
        phi[k] = phi_kk;
        pacf.push(Some(phi_kk));
    }

    Ok(pacf)
}

/// Two-sided 95% significance bound for a sample autocorrelation.
pub fn significance_bound(n: usize) -> f64 {
    1.96 / (n as f64).sqrt()
}
