//! Peak detection for consumption series.
//!
//! Observations further than a multiple of the population standard deviation
//! from the mean are reported as high or low peaks.

use crate::error::{ensure_finite, ensure_len, ForecastError, Result};
use crate::stats::{is_negligible, mean, population_variance, sum_of_squares};

/// Default number of standard deviations an observation must exceed.
pub const DEFAULT_PEAK_THRESHOLD: f64 = 1.5;

/// Direction of a detected peak.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutlierKind {
    /// Above `mean + threshold × std`
    HighPeak,
    /// Below `mean − threshold × std`
    LowPeak,
}

/// A detected peak in the series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Outlier {
    /// Index (time point) at which the peak occurs
    pub index: usize,
    /// Value at the peak
    pub value: f64,
    /// Signed distance from the mean in standard deviations
    pub deviation_score: f64,
    pub kind: OutlierKind,
}

/// Detect peaks in a series.
///
/// # Arguments
/// * `values` - Series values
/// * `threshold` - Standard deviations from the mean an observation must exceed
///
/// # Returns
/// Peaks in index order. A constant series has none.
pub fn detect_peaks(values: &[f64], threshold: f64) -> Result<Vec<Outlier>> {
    if !threshold.is_finite() || threshold < 0.0 {
        return Err(ForecastError::invalid_parameter(
            "threshold",
            threshold,
            "must be a non-negative number",
        ));
    }
    ensure_len(values, 1)?;
    ensure_finite(values)?;

    let mu = mean(values);
    let variance = population_variance(values);
    if is_negligible(variance * values.len() as f64, sum_of_squares(values)) {
        return Ok(Vec::new());
    }
    let sigma = variance.sqrt();

    let upper = mu + threshold * sigma;
    let lower = mu - threshold * sigma;

    let peaks = values
        .iter()
        .enumerate()
        .filter_map(|(index, &value)| {
            let kind = if value > upper {
                OutlierKind::HighPeak
            } else if value < lower {
                OutlierKind::LowPeak
            } else {
                return None;
            };
            Some(Outlier {
                index,
                value,
                deviation_score: (value - mu) / sigma,
                kind,
            })
        })
        .collect();

    Ok(peaks)
}

/// Detect peaks with [`DEFAULT_PEAK_THRESHOLD`].
pub fn detect_peaks_default(values: &[f64]) -> Result<Vec<Outlier>> {
    detect_peaks(values, DEFAULT_PEAK_THRESHOLD)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_detect_high_and_low() {
        let mut values = vec![100.0; 20];
        values[5] = 200.0;
        values[12] = 10.0;

        let peaks = detect_peaks_default(&values).unwrap();
        assert_eq!(peaks.len(), 2);
        assert_eq!(peaks[0].index, 5);
        assert_eq!(peaks[0].kind, OutlierKind::HighPeak);
        assert!(peaks[0].deviation_score > 1.5);
        assert_eq!(peaks[1].index, 12);
        assert_eq!(peaks[1].kind, OutlierKind::LowPeak);
        assert!(peaks[1].deviation_score < -1.5);
    }

    #[test]
    fn test_deviation_score() {
        // mean 2, population std 1
        let values = vec![1.0, 3.0, 1.0, 3.0];
        let peaks = detect_peaks(&values, 0.5).unwrap();
        assert_eq!(peaks.len(), 4);
        assert_relative_eq!(peaks[0].deviation_score, -1.0, epsilon = 1e-12);
        assert_relative_eq!(peaks[1].deviation_score, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_constant_series_has_no_peaks() {
        assert!(detect_peaks_default(&[42.0; 10]).unwrap().is_empty());
    }

    #[test]
    fn test_small_units() {
        let mut values = vec![1e-7; 20];
        values[4] = 5e-7;
        let peaks = detect_peaks_default(&values).unwrap();
        assert_eq!(peaks.len(), 1);
        assert_eq!(peaks[0].index, 4);
        assert_eq!(peaks[0].kind, OutlierKind::HighPeak);
    }

    #[test]
    fn test_invalid_input() {
        assert!(matches!(
            detect_peaks_default(&[]),
            Err(ForecastError::InsufficientData { needed: 1, got: 0 })
        ));
        assert!(detect_peaks(&[1.0, 2.0], -1.0).is_err());
    }
}
