//! Pattern analysis over consumption series: trend direction, peak month,
//! recurring cycles, period comparison and consumption categorization.

use crate::autocorrelation::acf_unchecked;
use crate::calendar::MONTHS;
use crate::error::{ensure_finite, ForecastError, Result};
use crate::stats::{index_slope, mean, relative_percent, ZERO_TOLERANCE};
use chrono::Month;
use std::fmt;

/// Absolute per-step slope below which a trend counts as stable.
pub const STABLE_SLOPE_THRESHOLD: f64 = 0.1;

/// Default shortest cycle length searched by [`detect_cycles`].
pub const DEFAULT_MIN_CYCLE: usize = 3;

/// Default longest cycle length searched by [`detect_cycles`].
pub const DEFAULT_MAX_CYCLE: usize = 12;

/// Autocorrelation a lag needs to be reported as a cycle.
const CYCLE_THRESHOLD: f64 = 0.7;

/// Autocorrelation above which a cycle is flagged as strong.
const STRONG_CYCLE_THRESHOLD: f64 = 0.85;

/// Direction of a series' linear trend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrendKind {
    Increasing,
    Decreasing,
    Stable,
    /// Fewer than 3 observations
    Insufficient,
}

/// Result of [`detect_trend`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendAnalysis {
    pub kind: TrendKind,
    /// Least-squares slope per step
    pub slope: f64,
    /// Slope as a percentage of the series mean, `None` when the mean is 0
    pub percent_change: Option<f64>,
}

/// The month with the highest value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeakMonth {
    /// Zero-based month index, January is 0
    pub index: usize,
    pub month: Month,
    pub name: &'static str,
    pub value: f64,
}

/// A recurring cycle found by [`detect_cycles`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cycle {
    /// Cycle length in steps
    pub length: usize,
    /// Autocorrelation at that lag
    pub correlation: f64,
    /// Correlation above 0.85
    pub strong: bool,
}

/// Totals and averages of two periods, A compared against B.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeriodComparison {
    pub total_a: f64,
    pub total_b: f64,
    pub average_a: f64,
    pub average_b: f64,
    /// `None` when B's total is 0
    pub total_change_percent: Option<f64>,
    /// `None` when B's average is 0
    pub average_change_percent: Option<f64>,
}

/// Consumption level relative to a historical baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsumptionLevel {
    VeryHigh,
    High,
    Normal,
    Low,
    VeryLow,
}

impl ConsumptionLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConsumptionLevel::VeryHigh => "very_high",
            ConsumptionLevel::High => "high",
            ConsumptionLevel::Normal => "normal",
            ConsumptionLevel::Low => "low",
            ConsumptionLevel::VeryLow => "very_low",
        }
    }
}

impl fmt::Display for ConsumptionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Alert severity attached to a [`ConsumptionLevel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of [`categorize`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Categorization {
    pub level: ConsumptionLevel,
    pub severity: Severity,
    /// `(value / historical_average − 1) × 100`
    pub deviation_percent: f64,
}

/// Classify the direction of the series' least-squares trend.
///
/// Fewer than 3 observations yield [`TrendKind::Insufficient`] with a zero
/// slope rather than an error.
pub fn detect_trend(values: &[f64]) -> Result<TrendAnalysis> {
    ensure_finite(values)?;
    if values.len() < 3 {
        return Ok(TrendAnalysis {
            kind: TrendKind::Insufficient,
            slope: 0.0,
            percent_change: None,
        });
    }

    let slope = index_slope(values);
    let kind = if slope.abs() < STABLE_SLOPE_THRESHOLD {
        TrendKind::Stable
    } else if slope > 0.0 {
        TrendKind::Increasing
    } else {
        TrendKind::Decreasing
    };

    let m = mean(values);
    let percent_change = (m.abs() >= ZERO_TOLERANCE).then(|| slope / m * 100.0);

    Ok(TrendAnalysis {
        kind,
        slope,
        percent_change,
    })
}

/// Find the month with the highest value in a 12-element array.
///
/// Ties resolve to the earliest month.
///
/// # Errors
/// `DimensionMismatch` when the input does not hold exactly 12 values.
pub fn peak_month(monthly: &[f64]) -> Result<PeakMonth> {
    if monthly.len() != 12 {
        return Err(ForecastError::DimensionMismatch {
            left: monthly.len(),
            right: 12,
        });
    }
    ensure_finite(monthly)?;

    let mut index = 0;
    for (i, &v) in monthly.iter().enumerate().skip(1) {
        if v > monthly[index] {
            index = i;
        }
    }

    let month = MONTHS[index];
    Ok(PeakMonth {
        index,
        month,
        name: month.name(),
        value: monthly[index],
    })
}

/// Search cycle lengths `min_len..=max_len` for strong autocorrelation.
///
/// # Arguments
/// * `values` - Series values
/// * `min_len` - Shortest cycle length, at least 1
/// * `max_len` - Longest cycle length
///
/// # Returns
/// Cycles with correlation above 0.7, strongest first. Lags that do not fit
/// the series are skipped.
pub fn detect_cycles(values: &[f64], min_len: usize, max_len: usize) -> Result<Vec<Cycle>> {
    if min_len == 0 {
        return Err(ForecastError::invalid_parameter(
            "min_len",
            min_len,
            "must be at least 1",
        ));
    }
    if min_len > max_len {
        return Err(ForecastError::invalid_parameter(
            "max_len",
            max_len,
            "must not be smaller than min_len",
        ));
    }
    ensure_finite(values)?;

    let n = values.len();
    let mut cycles: Vec<Cycle> = (min_len..=max_len)
        .take_while(|&lag| lag < n)
        .filter_map(|length| {
            let correlation = acf_unchecked(values, length)?;
            (correlation > CYCLE_THRESHOLD).then_some(Cycle {
                length,
                correlation,
                strong: correlation > STRONG_CYCLE_THRESHOLD,
            })
        })
        .collect();

    cycles.sort_by(|a, b| b.correlation.total_cmp(&a.correlation));
    Ok(cycles)
}

/// Compare the totals and averages of period A against period B.
///
/// The periods may differ in length.
pub fn compare_periods(period_a: &[f64], period_b: &[f64]) -> Result<PeriodComparison> {
    for p in [period_a, period_b] {
        if p.is_empty() {
            return Err(ForecastError::InsufficientData { needed: 1, got: 0 });
        }
        ensure_finite(p)?;
    }

    let total_a: f64 = period_a.iter().sum();
    let total_b: f64 = period_b.iter().sum();
    let average_a = total_a / period_a.len() as f64;
    let average_b = total_b / period_b.len() as f64;

    Ok(PeriodComparison {
        total_a,
        total_b,
        average_a,
        average_b,
        total_change_percent: relative_percent(total_a, total_b),
        average_change_percent: relative_percent(average_a, average_b),
    })
}

/// Categorize a value by its percentage deviation from a historical average.
///
/// | deviation `d` | level | severity |
/// |---|---|---|
/// | `d > 50` | very high | critical |
/// | `25 < d ≤ 50` | high | high |
/// | `−10 < d ≤ 25` | normal | medium |
/// | `−25 < d ≤ −10` | low | low |
/// | `d ≤ −25` | very low | low |
///
/// # Errors
/// `Domain` when the historical average is not a positive number.
pub fn categorize(value: f64, historical_average: f64) -> Result<Categorization> {
    if !historical_average.is_finite() || historical_average <= 0.0 {
        return Err(ForecastError::Domain(format!(
            "historical average must be positive, got {historical_average}"
        )));
    }
    ensure_finite(&[value])?;

    let deviation_percent = (value - historical_average) / historical_average * 100.0;
    let (level, severity) = if deviation_percent > 50.0 {
        (ConsumptionLevel::VeryHigh, Severity::Critical)
    } else if deviation_percent > 25.0 {
        (ConsumptionLevel::High, Severity::High)
    } else if deviation_percent > -10.0 {
        (ConsumptionLevel::Normal, Severity::Medium)
    } else if deviation_percent > -25.0 {
        (ConsumptionLevel::Low, Severity::Low)
    } else {
        (ConsumptionLevel::VeryLow, Severity::Low)
    };

    Ok(Categorization {
        level,
        severity,
        deviation_percent,
    })
}
