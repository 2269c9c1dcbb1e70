//! Batch processing of many independent series.
//!
//! With the `native` feature each series runs as its own task on the rayon
//! pool; without it the series are processed in turn. Results always come
//! back in input order and each series keeps its own `Result`.

use crate::decomposition::{decompose, Decomposition};
use crate::error::Result;
use crate::forecast::{forecast_with_options, ForecastOptions, ForecastPoint};
use tracing::debug;

#[cfg(feature = "native")]
use rayon::prelude::*;

#[cfg(feature = "native")]
fn map_series<S, T, F>(series: &[S], f: F) -> Vec<T>
where
    S: AsRef<[f64]> + Sync,
    T: Send,
    F: Fn(&[f64]) -> T + Sync + Send,
{
    series.par_iter().map(|s| f(s.as_ref())).collect()
}

#[cfg(not(feature = "native"))]
fn map_series<S, T, F>(series: &[S], f: F) -> Vec<T>
where
    S: AsRef<[f64]> + Sync,
    T: Send,
    F: Fn(&[f64]) -> T + Sync + Send,
{
    series.iter().map(|s| f(s.as_ref())).collect()
}

/// Forecast every series `horizon` steps ahead.
///
/// # Example
/// ```
/// use energy_fcst_core::batch::forecast_many;
/// use energy_fcst_core::forecast::ForecastOptions;
///
/// let series = vec![vec![10.0, 20.0, 30.0], vec![1.0, 2.0]];
/// let results = forecast_many(&series, 2, &ForecastOptions::default());
/// assert!(results[0].is_ok());
/// assert!(results[1].is_err());
/// ```
pub fn forecast_many<S>(
    series: &[S],
    horizon: usize,
    options: &ForecastOptions,
) -> Vec<Result<Vec<ForecastPoint>>>
where
    S: AsRef<[f64]> + Sync,
{
    debug!(count = series.len(), horizon, "forecasting batch");
    map_series(series, |s| forecast_with_options(s, horizon, options))
}

/// Decompose every series with the same period.
pub fn decompose_many<S>(series: &[S], period: usize) -> Vec<Result<Option<Decomposition>>>
where
    S: AsRef<[f64]> + Sync,
{
    debug!(count = series.len(), period, "decomposing batch");
    map_series(series, |s| decompose(s, period))
}
