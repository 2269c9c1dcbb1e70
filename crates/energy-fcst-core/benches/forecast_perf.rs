//! Performance benchmark for forecasting and decomposition over growing
//! series lengths and batch sizes.
//!
//! Run with: cargo bench --bench forecast_perf

use energy_fcst_core::{
    decompose, decompose_many, forecast, forecast_many, forecast_with_seasonality,
    holt_winters_smoothing, partial_autocorrelation, ForecastOptions, SmoothingParams,
};
use std::time::{Duration, Instant};

fn generate_consumption_series(n: usize, period: usize) -> Vec<f64> {
    (0..n)
        .map(|i| {
            let trend = 500.0 + 0.5 * i as f64;
            let seasonal =
                1.0 + 0.25 * (2.0 * std::f64::consts::PI * i as f64 / period as f64).sin();
            trend * seasonal + (i % 7) as f64 // small noise
        })
        .collect()
}

fn benchmark_fn<F, R>(name: &str, iterations: usize, mut f: F) -> Duration
where
    F: FnMut() -> R,
{
    // Warmup
    let _ = f();

    let start = Instant::now();
    for _ in 0..iterations {
        let _ = std::hint::black_box(f());
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / iterations as u32;
    println!(
        "{}: total={:?}, per_iter={:?}, iters={}",
        name, elapsed, per_iter, iterations
    );
    elapsed
}

fn main() {
    println!("=== Forecast Engine Performance Benchmark ===\n");

    let series_lengths = [120, 600, 1200, 6000, 12000];
    let period = 12;

    println!("--- 1. Single Series Benchmarks ---\n");

    for &n in &series_lengths {
        let values = generate_consumption_series(n, period);
        let iters = if n <= 1200 { 100 } else { 10 };

        benchmark_fn(&format!("forecast(n={})", n), iters, || forecast(&values, 12));
        benchmark_fn(&format!("forecast_with_seasonality(n={})", n), iters, || {
            forecast_with_seasonality(&values, 12, period)
        });
        benchmark_fn(&format!("decompose(n={})", n), iters, || {
            decompose(&values, period)
        });
        benchmark_fn(&format!("holt_winters_smoothing(n={})", n), iters, || {
            holt_winters_smoothing(&values, period, SmoothingParams::default())
        });
        benchmark_fn(&format!("partial_autocorrelation(n={}, lags=24)", n), iters, || {
            partial_autocorrelation(&values, 24)
        });
        println!();
    }

    println!("--- 2. Scalability Test (many series) ---\n");

    let series_counts = [100, 1000, 10000];
    let series_len = 60; // Five years of monthly readings

    for &n_series in &series_counts {
        let series_batch: Vec<Vec<f64>> = (0..n_series)
            .map(|seed| {
                generate_consumption_series(series_len, period)
                    .into_iter()
                    .map(|v| v + (seed % 100) as f64 * 0.01)
                    .collect()
            })
            .collect();

        println!("Processing {} series (len={} each):", n_series, series_len);

        benchmark_fn(&format!("  forecast x{} (sequential)", n_series), 1, || {
            series_batch
                .iter()
                .map(|s| forecast(s, 12))
                .collect::<Vec<_>>()
        });
        benchmark_fn(&format!("  forecast_many x{}", n_series), 1, || {
            forecast_many(&series_batch, 12, &ForecastOptions::default())
        });
        benchmark_fn(&format!("  decompose_many x{}", n_series), 1, || {
            decompose_many(&series_batch, period)
        });
        println!();
    }

    println!("=== Benchmark Complete ===");
}
