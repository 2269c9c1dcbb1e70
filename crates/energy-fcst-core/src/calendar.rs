//! Calendar-tagged observations and per-month profiles.

use crate::error::{ensure_finite, ForecastError, Result};
use chrono::{Datelike, Month, NaiveDate};

/// Calendar months in order, January first.
pub(crate) const MONTHS: [Month; 12] = [
    Month::January,
    Month::February,
    Month::March,
    Month::April,
    Month::May,
    Month::June,
    Month::July,
    Month::August,
    Month::September,
    Month::October,
    Month::November,
    Month::December,
];

/// A single observation tagged with its year and month.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonthlyObservation {
    pub year: i32,
    pub month: Month,
    pub value: f64,
}

impl MonthlyObservation {
    /// Create an observation from a 1-based month number.
    ///
    /// # Errors
    /// `InvalidParameter` when `month` is outside 1..=12.
    pub fn new(year: i32, month: u8, value: f64) -> Result<MonthlyObservation> {
        let month = Month::try_from(month)
            .map_err(|_| ForecastError::invalid_parameter("month", month, "must be in 1..=12"))?;
        Ok(MonthlyObservation { year, month, value })
    }

    /// Create an observation for the month containing `date`.
    pub fn from_date(date: NaiveDate, value: f64) -> Result<MonthlyObservation> {
        // Datelike::month is always 1..=12
        MonthlyObservation::new(date.year(), date.month() as u8, value)
    }

    /// Zero-based position of the month within the year.
    pub fn month_index(&self) -> usize {
        self.month.number_from_month() as usize - 1
    }
}

/// Average the observations per calendar month, pooling all years.
///
/// The result has 12 entries, January first. Months without any observation
/// report 0.
pub fn monthly_profile(observations: &[MonthlyObservation]) -> Result<Vec<f64>> {
    if observations.is_empty() {
        return Err(ForecastError::InsufficientData { needed: 1, got: 0 });
    }
    let values: Vec<f64> = observations.iter().map(|o| o.value).collect();
    ensure_finite(&values)?;

    let mut sums = [0.0; 12];
    let mut counts = [0usize; 12];
    for obs in observations {
        let i = obs.month_index();
        sums[i] += obs.value;
        counts[i] += 1;
    }

    Ok(sums
        .iter()
        .zip(&counts)
        .map(|(&s, &c)| if c > 0 { s / c as f64 } else { 0.0 })
        .collect())
}
