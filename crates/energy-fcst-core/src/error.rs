//! Error types for the forecasting engine.

use thiserror::Error;

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, ForecastError>;

/// Error types for engine operations.
///
/// Validation happens before any computation starts, so an error never
/// carries a partially computed result.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ForecastError {
    #[error("Insufficient data: need at least {needed} observations, got {got}")]
    InsufficientData { needed: usize, got: usize },

    #[error("Dimension mismatch: {left} vs {right} elements")]
    DimensionMismatch { left: usize, right: usize },

    #[error("Domain error: {0}")]
    Domain(String),

    #[error("Invalid parameter '{param}' = '{value}': {reason}")]
    InvalidParameter {
        param: String,
        value: String,
        reason: String,
    },

    #[error("Numerical instability: {0}")]
    NumericalInstability(String),
}

impl ForecastError {
    pub(crate) fn invalid_parameter(
        param: &str,
        value: impl ToString,
        reason: &str,
    ) -> ForecastError {
        ForecastError::InvalidParameter {
            param: param.to_string(),
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Require at least `needed` observations.
pub(crate) fn ensure_len(values: &[f64], needed: usize) -> Result<()> {
    if values.len() < needed {
        return Err(ForecastError::InsufficientData {
            needed,
            got: values.len(),
        });
    }
    Ok(())
}

/// Require two sequences of equal length.
pub(crate) fn ensure_same_len(left: &[f64], right: &[f64]) -> Result<()> {
    if left.len() != right.len() {
        return Err(ForecastError::DimensionMismatch {
            left: left.len(),
            right: right.len(),
        });
    }
    Ok(())
}

/// Reject NaN and infinite observations.
pub(crate) fn ensure_finite(values: &[f64]) -> Result<()> {
    match values.iter().position(|v| !v.is_finite()) {
        Some(i) => Err(ForecastError::Domain(format!(
            "value at index {} is not finite: {}",
            i, values[i]
        ))),
        None => Ok(()),
    }
}

/// Require a smoothing weight inside [0, 1].
pub(crate) fn ensure_unit_interval(param: &str, value: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&value) {
        return Err(ForecastError::invalid_parameter(
            param,
            value,
            "must be between 0 and 1",
        ));
    }
    Ok(())
}
