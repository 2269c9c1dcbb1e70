//! Trend model fitting for (x, y) pairs.
//!
//! Four model families are supported: linear, quadratic, exponential and
//! logarithmic. Linear, exponential and logarithmic fits are closed-form
//! least squares; the quadratic fit is solved as an OLS problem over the
//! design matrix `[x, x²]` with anofox-regression.

use crate::error::{ensure_finite, ensure_len, ensure_same_len, ForecastError, Result};
use crate::metrics;
use crate::stats::{mean, ZERO_TOLERANCE};
use anofox_regression::prelude::*;
use std::fmt;
use tracing::debug;

/// R² margin the quadratic model must exceed the linear one by to be selected.
const SELECTION_MARGIN: f64 = 1e-9;

/// A fitted trend model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FittedModel {
    /// y = slope·x + intercept
    Linear { slope: f64, intercept: f64 },
    /// y = a·x² + b·x + c
    Quadratic { a: f64, b: f64, c: f64 },
    /// y = a·e^(b·x)
    Exponential { a: f64, b: f64 },
    /// y = a + b·ln(x), defined for x > 0
    Logarithmic { a: f64, b: f64 },
}

impl FittedModel {
    /// Evaluate the model at `x`.
    pub fn predict(&self, x: f64) -> f64 {
        match *self {
            FittedModel::Linear { slope, intercept } => slope * x + intercept,
            FittedModel::Quadratic { a, b, c } => a * x * x + b * x + c,
            FittedModel::Exponential { a, b } => a * (b * x).exp(),
            FittedModel::Logarithmic { a, b } => a + b * x.ln(),
        }
    }

    /// Evaluate the model at every point of `x`.
    pub fn predict_many(&self, x: &[f64]) -> Vec<f64> {
        x.iter().map(|&xi| self.predict(xi)).collect()
    }

    /// Coefficient of determination of this model on the given data.
    ///
    /// `None` when `y` is constant.
    pub fn r_squared(&self, x: &[f64], y: &[f64]) -> Result<Option<f64>> {
        ensure_same_len(x, y)?;
        metrics::r2(y, &self.predict_many(x))
    }

    pub fn name(&self) -> &'static str {
        match self {
            FittedModel::Linear { .. } => "linear",
            FittedModel::Quadratic { .. } => "quadratic",
            FittedModel::Exponential { .. } => "exponential",
            FittedModel::Logarithmic { .. } => "logarithmic",
        }
    }
}

impl fmt::Display for FittedModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            FittedModel::Linear { slope, intercept } => {
                write!(f, "y = {:.4}x + {:.4}", slope, intercept)
            }
            FittedModel::Quadratic { a, b, c } => {
                write!(f, "y = {:.4}x² + {:.4}x + {:.4}", a, b, c)
            }
            FittedModel::Exponential { a, b } => write!(f, "y = {:.4}e^({:.4}x)", a, b),
            FittedModel::Logarithmic { a, b } => write!(f, "y = {:.4} + {:.4}ln(x)", a, b),
        }
    }
}

/// Outcome of comparing the linear and quadratic fits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BestModel {
    /// The selected model
    pub model: FittedModel,
    /// R² of the selected model (`None` when y is constant)
    pub r2: Option<f64>,
    /// R² expressed as a percentage
    pub precision: Option<f64>,
}

fn validate_pairs(x: &[f64], y: &[f64], needed: usize) -> Result<()> {
    ensure_same_len(x, y)?;
    ensure_len(x, needed)?;
    ensure_finite(x)?;
    ensure_finite(y)
}

/// Closed-form least squares on already-validated data.
fn least_squares(x: &[f64], y: &[f64]) -> Result<(f64, f64)> {
    let n = x.len() as f64;
    let sum_x: f64 = x.iter().sum();
    let sum_y: f64 = y.iter().sum();
    let sum_xy: f64 = x.iter().zip(y).map(|(a, b)| a * b).sum();
    let sum_x2: f64 = x.iter().map(|a| a * a).sum();

    let denom = n * sum_x2 - sum_x * sum_x;
    if denom.abs() <= ZERO_TOLERANCE * (n * sum_x2).max(1.0) {
        return Err(ForecastError::NumericalInstability(
            "x values have no spread; slope is undefined".to_string(),
        ));
    }

    let slope = (n * sum_xy - sum_x * sum_y) / denom;
    let intercept = (sum_y - slope * sum_x) / n;
    Ok((slope, intercept))
}

/// Fit `y = slope·x + intercept` by ordinary least squares.
///
/// # Errors
/// * `DimensionMismatch` if `x` and `y` differ in length
/// * `InsufficientData` for fewer than 2 points
/// * `NumericalInstability` if all x values are equal
///
/// # Example
/// ```
/// use energy_fcst_core::regression::{fit_linear, FittedModel};
/// let x = [0.0, 1.0, 2.0, 3.0, 4.0];
/// let y = [10.0, 20.0, 30.0, 40.0, 50.0];
/// let model = fit_linear(&x, &y).unwrap();
/// assert!((model.predict(5.0) - 60.0).abs() < 1e-9);
/// ```
pub fn fit_linear(x: &[f64], y: &[f64]) -> Result<FittedModel> {
    validate_pairs(x, y, 2)?;
    let (slope, intercept) = least_squares(x, y)?;
    Ok(FittedModel::Linear { slope, intercept })
}

/// Fit `y = a·x² + b·x + c` by least squares.
///
/// x is centered before solving and the coefficients are mapped back, which
/// keeps the normal equations well scaled for large x offsets.
///
/// # Errors
/// * `InsufficientData` for fewer than 3 points
/// * `NumericalInstability` for fewer than 3 distinct x values or a
///   non-finite solution
pub fn fit_quadratic(x: &[f64], y: &[f64]) -> Result<FittedModel> {
    validate_pairs(x, y, 3)?;

    let mut distinct = x.to_vec();
    distinct.sort_by(|a, b| a.total_cmp(b));
    distinct.dedup_by(|a, b| (*a - *b).abs() <= ZERO_TOLERANCE * b.abs().max(1.0));
    if distinct.len() < 3 {
        return Err(ForecastError::NumericalInstability(format!(
            "quadratic fit needs 3 distinct x values, got {}",
            distinct.len()
        )));
    }

    let n = x.len();
    let center = mean(x);

    // Design matrix: n_obs rows × [x - m, (x - m)²]
    let x_mat = faer::Mat::from_fn(n, 2, |i, j| {
        let dx = x[i] - center;
        if j == 0 {
            dx
        } else {
            dx * dx
        }
    });
    let y_col = faer::Col::from_fn(n, |i| y[i]);

    let fitted = match OlsRegressor::builder()
        .with_intercept(true)
        .build()
        .fit(&x_mat, &y_col)
    {
        Ok(f) => f,
        Err(_) => {
            return Err(ForecastError::NumericalInstability(
                "quadratic normal equations are singular".to_string(),
            ))
        }
    };

    let c0 = fitted.intercept().unwrap_or(0.0);
    let coeffs = fitted.coefficients();
    let (b0, a) = (coeffs[0], coeffs[1]);

    // Undo the centering
    let b = b0 - 2.0 * a * center;
    let c = a * center * center - b0 * center + c0;

    if ![a, b, c].iter().all(|v| v.is_finite()) {
        return Err(ForecastError::NumericalInstability(
            "quadratic fit produced non-finite coefficients".to_string(),
        ));
    }

    Ok(FittedModel::Quadratic { a, b, c })
}

/// Fit `y = a·e^(b·x)` by least squares on `ln y`.
///
/// # Errors
/// * `Domain` if any y is not strictly positive
pub fn fit_exponential(x: &[f64], y: &[f64]) -> Result<FittedModel> {
    validate_pairs(x, y, 2)?;
    if let Some(i) = y.iter().position(|&v| v <= 0.0) {
        return Err(ForecastError::Domain(format!(
            "exponential fit requires y > 0, got {} at index {}",
            y[i], i
        )));
    }

    let ln_y: Vec<f64> = y.iter().map(|v| v.ln()).collect();
    let (b, ln_a) = least_squares(x, &ln_y)?;
    Ok(FittedModel::Exponential { a: ln_a.exp(), b })
}

/// Fit `y = a + b·ln(x)` by least squares on `ln x`.
///
/// # Errors
/// * `Domain` if any x is not strictly positive
pub fn fit_logarithmic(x: &[f64], y: &[f64]) -> Result<FittedModel> {
    validate_pairs(x, y, 2)?;
    if let Some(i) = x.iter().position(|&v| v <= 0.0) {
        return Err(ForecastError::Domain(format!(
            "logarithmic fit requires x > 0, got {} at index {}",
            x[i], i
        )));
    }

    let ln_x: Vec<f64> = x.iter().map(|v| v.ln()).collect();
    let (b, a) = least_squares(&ln_x, y)?;
    Ok(FittedModel::Logarithmic { a, b })
}

/// Fit every model family whose domain the data satisfies.
///
/// Linear is always attempted and its failure is returned; the other
/// families are skipped when their preconditions do not hold.
pub fn fit_all(x: &[f64], y: &[f64]) -> Result<Vec<FittedModel>> {
    let mut models = vec![fit_linear(x, y)?];
    if let Ok(m) = fit_quadratic(x, y) {
        models.push(m);
    }
    if y.iter().all(|&v| v > 0.0) {
        models.push(fit_exponential(x, y)?);
    }
    if x.iter().all(|&v| v > 0.0) {
        models.push(fit_logarithmic(x, y)?);
    }
    Ok(models)
}

/// Fit linear and quadratic models and keep the one with the higher R².
///
/// For constant `y` both R² values are undefined; the linear model is
/// returned with `r2` and `precision` set to `None`. Otherwise the quadratic
/// model has to improve on the linear R² by more than a small margin, so
/// exactly linear data selects the linear model.
pub fn select_best_model(x: &[f64], y: &[f64]) -> Result<BestModel> {
    validate_pairs(x, y, 3)?;

    let linear = fit_linear(x, y)?;
    let linear_r2 = linear.r_squared(x, y)?;
    if linear_r2.is_none() {
        // Constant y: R² is undefined for every model
        return Ok(BestModel {
            model: linear,
            r2: None,
            precision: None,
        });
    }

    // Fewer than 3 distinct x values leave the linear model as the only fit
    let (quadratic, quadratic_r2) = match fit_quadratic(x, y) {
        Ok(q) => (Some(q), q.r_squared(x, y)?),
        Err(ForecastError::NumericalInstability(_)) => (None, None),
        Err(e) => return Err(e),
    };

    let (model, r2) = match (quadratic, linear_r2, quadratic_r2) {
        (Some(q), Some(l), Some(qr2)) if qr2 > l + SELECTION_MARGIN => (q, Some(qr2)),
        _ => (linear, linear_r2),
    };

    debug!(
        model = model.name(),
        linear_r2 = ?linear_r2,
        quadratic_r2 = ?quadratic_r2,
        "selected trend model"
    );

    Ok(BestModel {
        model,
        r2,
        precision: r2.map(|v| v * 100.0),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_fit_linear_exact() {
        let x = vec![0.0, 1.0, 2.0, 3.0, 4.0];
        let y = vec![10.0, 20.0, 30.0, 40.0, 50.0];
        match fit_linear(&x, &y).unwrap() {
            FittedModel::Linear { slope, intercept } => {
                assert_relative_eq!(slope, 10.0, epsilon = 1e-9);
                assert_relative_eq!(intercept, 10.0, epsilon = 1e-9);
            }
            other => panic!("Expected linear model, got {:?}", other),
        }
    }

    #[test]
    fn test_fit_linear_validation() {
        assert!(matches!(
            fit_linear(&[1.0], &[1.0]),
            Err(ForecastError::InsufficientData { needed: 2, got: 1 })
        ));
        assert!(matches!(
            fit_linear(&[1.0, 2.0, 3.0], &[1.0, 2.0]),
            Err(ForecastError::DimensionMismatch { left: 3, right: 2 })
        ));
        assert!(matches!(
            fit_linear(&[2.0, 2.0, 2.0], &[1.0, 2.0, 3.0]),
            Err(ForecastError::NumericalInstability(_))
        ));
    }

    #[test]
    fn test_fit_quadratic_exact() {
        let x: Vec<f64> = (0..8).map(|i| i as f64).collect();
        let y: Vec<f64> = x.iter().map(|v| 2.0 * v * v - 3.0 * v + 5.0).collect();
        match fit_quadratic(&x, &y).unwrap() {
            FittedModel::Quadratic { a, b, c } => {
                assert_relative_eq!(a, 2.0, epsilon = 1e-6);
                assert_relative_eq!(b, -3.0, epsilon = 1e-6);
                assert_relative_eq!(c, 5.0, epsilon = 1e-6);
            }
            other => panic!("Expected quadratic model, got {:?}", other),
        }
    }

    #[test]
    fn test_fit_quadratic_large_offset() {
        // Years as x values: raw moment sums would cancel badly here
        let x: Vec<f64> = (0..10).map(|i| 2010.0 + i as f64).collect();
        let y: Vec<f64> = x
            .iter()
            .map(|v| 0.5 * (v - 2010.0).powi(2) + 100.0)
            .collect();
        let model = fit_quadratic(&x, &y).unwrap();
        for (xi, yi) in x.iter().zip(&y) {
            assert_relative_eq!(model.predict(*xi), *yi, epsilon = 1e-4);
        }
    }

    #[test]
    fn test_fit_quadratic_collinear() {
        let x = vec![1.0, 1.0, 2.0, 2.0];
        let y = vec![3.0, 3.0, 4.0, 4.0];
        assert!(matches!(
            fit_quadratic(&x, &y),
            Err(ForecastError::NumericalInstability(_))
        ));
    }

    #[test]
    fn test_fit_exponential() {
        let x: Vec<f64> = (0..6).map(|i| i as f64).collect();
        let y: Vec<f64> = x.iter().map(|v| 3.0 * (0.5 * v).exp()).collect();
        match fit_exponential(&x, &y).unwrap() {
            FittedModel::Exponential { a, b } => {
                assert_relative_eq!(a, 3.0, epsilon = 1e-9);
                assert_relative_eq!(b, 0.5, epsilon = 1e-9);
            }
            other => panic!("Expected exponential model, got {:?}", other),
        }
    }

    #[test]
    fn test_fit_exponential_domain() {
        assert!(matches!(
            fit_exponential(&[0.0, 1.0, 2.0], &[1.0, 0.0, 2.0]),
            Err(ForecastError::Domain(_))
        ));
    }

    #[test]
    fn test_fit_logarithmic() {
        let x: Vec<f64> = (1..8).map(|i| i as f64).collect();
        let y: Vec<f64> = x.iter().map(|v| 4.0 + 2.0 * v.ln()).collect();
        match fit_logarithmic(&x, &y).unwrap() {
            FittedModel::Logarithmic { a, b } => {
                assert_relative_eq!(a, 4.0, epsilon = 1e-9);
                assert_relative_eq!(b, 2.0, epsilon = 1e-9);
            }
            other => panic!("Expected logarithmic model, got {:?}", other),
        }
        assert!(matches!(
            fit_logarithmic(&[0.0, 1.0, 2.0], &[1.0, 2.0, 3.0]),
            Err(ForecastError::Domain(_))
        ));
    }

    #[test]
    fn test_fit_all_respects_domains() {
        let x = vec![0.0, 1.0, 2.0, 3.0];
        let y = vec![1.0, 2.0, 4.0, 8.0];
        let names: Vec<&str> = fit_all(&x, &y).unwrap().iter().map(|m| m.name()).collect();
        // x contains 0, so no logarithmic model
        assert_eq!(names, vec!["linear", "quadratic", "exponential"]);
    }

    #[test]
    fn test_select_best_model_linear_data() {
        let x = vec![0.0, 1.0, 2.0, 3.0, 4.0];
        let y = vec![10.0, 20.0, 30.0, 40.0, 50.0];
        let best = select_best_model(&x, &y).unwrap();
        assert_eq!(best.model.name(), "linear");
        assert_relative_eq!(best.precision.unwrap(), 100.0, epsilon = 1e-9);
    }

    #[test]
    fn test_select_best_model_curved_data() {
        let x: Vec<f64> = (0..10).map(|i| i as f64).collect();
        let y: Vec<f64> = x.iter().map(|v| v * v).collect();
        let best = select_best_model(&x, &y).unwrap();
        assert_eq!(best.model.name(), "quadratic");
        assert!(best.r2.unwrap() > 0.999);
    }

    #[test]
    fn test_select_best_model_two_distinct_x() {
        let x = vec![1.0, 1.0, 2.0, 2.0];
        let y = vec![3.0, 3.5, 4.0, 4.5];
        let best = select_best_model(&x, &y).unwrap();
        assert_eq!(best.model.name(), "linear");
        assert!(best.r2.is_some());
    }

    #[test]
    fn test_select_best_model_constant_y() {
        let x = vec![0.0, 1.0, 2.0, 3.0];
        let y = vec![7.0, 7.0, 7.0, 7.0];
        let best = select_best_model(&x, &y).unwrap();
        assert_eq!(best.model.name(), "linear");
        assert_eq!(best.r2, None);
        assert_eq!(best.precision, None);
        assert_relative_eq!(best.model.predict(10.0), 7.0, epsilon = 1e-9);
    }

    #[test]
    fn test_display() {
        let model = FittedModel::Linear {
            slope: 2.0,
            intercept: 1.0,
        };
        assert_eq!(model.to_string(), "y = 2.0000x + 1.0000");
    }
}
