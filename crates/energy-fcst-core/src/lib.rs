//! Forecasting and pattern-analysis engine for energy consumption series.
//!
//! Every function is a pure computation over its input slices: trend
//! regression, seasonal decomposition, exponential smoothing, interval
//! forecasts, accuracy and residual diagnostics, and pattern detection.

pub mod autocorrelation;
pub mod batch;
pub mod calendar;
pub mod changepoint;
pub mod decomposition;
pub mod diagnostics;
pub mod error;
pub mod forecast;
pub mod metrics;
pub mod patterns;
pub mod peaks;
pub mod regression;
pub mod smoothing;
pub mod stationarity;
pub mod stats;

// Re-exports for convenience
pub use autocorrelation::{acf, autocorrelation, partial_autocorrelation, significance_bound};
pub use batch::{decompose_many, forecast_many};
pub use calendar::{monthly_profile, MonthlyObservation};
pub use changepoint::{detect_change_points, window_size, ChangePoint};
pub use decomposition::{centered_moving_average, decompose, Decomposition, SeasonalProfile};
pub use diagnostics::{
    analyze_residuals, chronological_split, compute_errors, LjungBoxEvidence, ResidualAnalysis,
    ResidualQuality, TrainTestSplit,
};
pub use error::{ForecastError, Result};
pub use forecast::{
    evaluate_accuracy, forecast, forecast_with_interval, forecast_with_options,
    forecast_with_seasonality, forecast_with_seasonality_options, ConfidenceLevel,
    ForecastOptions, ForecastPoint, IntervalWidening, SmoothingMethod,
};
pub use metrics::{evaluate, mae, mape, mse, r2, rmse, AccuracyReport};
pub use patterns::{
    categorize, compare_periods, detect_cycles, detect_trend, peak_month, Categorization,
    ConsumptionLevel, Cycle, PeakMonth, PeriodComparison, Severity, TrendAnalysis, TrendKind,
    DEFAULT_MAX_CYCLE, DEFAULT_MIN_CYCLE, STABLE_SLOPE_THRESHOLD,
};
pub use peaks::{detect_peaks, detect_peaks_default, Outlier, OutlierKind, DEFAULT_PEAK_THRESHOLD};
pub use regression::{
    fit_all, fit_exponential, fit_linear, fit_logarithmic, fit_quadratic, select_best_model,
    BestModel, FittedModel,
};
pub use smoothing::{
    holt_smoothing, holt_winters_smoothing, simple_exponential_smoothing, HoltFit, HoltWintersFit,
    SmoothingParams,
};
pub use stationarity::{
    difference, integrate, test_stationarity, AdfEvidence, StationarityReport,
    STATIONARITY_THRESHOLD,
};
pub use stats::{mean, moments, population_std_dev, population_variance, Moments};
