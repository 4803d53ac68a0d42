//! Alpha and beta of a return series against a benchmark.
//!
//! Beta is `Cov(returns, benchmark) / Var(benchmark)`. Only the benchmark
//! is centered: for `X_res = X - mean(X)`,
//!
//! ```text
//! mean(X_res * (Y - mean(Y))) = mean(X_res * Y) - mean(X_res) * mean(Y)
//!                             = mean(X_res * Y)
//! ```
//!
//! because `mean(X_res)` is zero. The centered benchmark is reused for its
//! own variance.
//!
//! Alpha is the mean of `(r - rf) - beta * (b - rf)` compounded over one
//! year: `(1 + mean)^factor - 1`.

use std::borrow::Cow;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::period::Period;
use super::series::{align, AlignedPair, TimeSeries};
use crate::error::{Result, StatsError};

/// Alpha and beta computed from one aligned pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlphaBeta {
    pub alpha: f64,
    pub beta: f64,
    /// Number of aligned observations used
    pub observations: usize,
}

/// Arithmetic mean; callers guarantee a non-empty slice
fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn check_inputs(returns: &[f64], benchmark: &[f64]) -> Result<()> {
    if returns.len() != benchmark.len() {
        return Err(StatsError::LengthMismatch {
            returns: returns.len(),
            benchmark: benchmark.len(),
        });
    }
    if returns.is_empty() {
        return Err(StatsError::EmptySeries);
    }
    Ok(())
}

/// Subtract the risk-free rate, borrowing the input untouched when it is zero
fn adjust_returns(returns: &[f64], risk_free: f64) -> Cow<'_, [f64]> {
    if risk_free == 0.0 {
        Cow::Borrowed(returns)
    } else {
        Cow::Owned(returns.iter().map(|r| r - risk_free).collect())
    }
}

/// Beta of `returns` against `benchmark`.
///
/// A constant benchmark has zero variance and yields `inf` or `NaN`; that
/// is returned as is.
pub fn beta(returns: &[f64], benchmark: &[f64]) -> Result<f64> {
    check_inputs(returns, benchmark)?;

    let benchmark_mean = mean(benchmark);
    let residuals: Vec<f64> = benchmark.iter().map(|b| b - benchmark_mean).collect();

    let products: Vec<f64> = residuals.iter().zip(returns).map(|(res, r)| res * r).collect();
    let covariance = mean(&products);

    let squares: Vec<f64> = residuals.iter().map(|res| res * res).collect();
    let variance = mean(&squares);

    Ok(covariance / variance)
}

/// Annualized alpha of `returns` against `benchmark`.
///
/// When `beta` is `None` it is computed from the unadjusted inputs.
pub fn alpha(
    returns: &[f64],
    benchmark: &[f64],
    beta_value: Option<f64>,
    risk_free: f64,
    period: Period,
) -> Result<f64> {
    check_inputs(returns, benchmark)?;

    let adjusted_returns = adjust_returns(returns, risk_free);
    let adjusted_benchmark = adjust_returns(benchmark, risk_free);

    let beta_value = match beta_value {
        Some(b) => b,
        None => beta(returns, benchmark)?,
    };

    let alpha_series: Vec<f64> = adjusted_returns
        .iter()
        .zip(adjusted_benchmark.iter())
        .map(|(r, b)| r - beta_value * b)
        .collect();

    let factor = period.annualization_factor() as f64;
    Ok((mean(&alpha_series) + 1.0).powf(factor) - 1.0)
}

/// Alpha and beta of two pre-aligned sequences, beta computed once
pub fn cal_alpha_beta(
    returns: &[f64],
    benchmark: &[f64],
    risk_free: f64,
    period: Period,
) -> Result<AlphaBeta> {
    let beta_value = beta(returns, benchmark)?;
    let alpha_value = alpha(returns, benchmark, Some(beta_value), risk_free, period)?;

    debug!(
        observations = returns.len(),
        alpha = alpha_value,
        beta = beta_value,
        %period,
        "computed alpha/beta"
    );

    Ok(AlphaBeta {
        alpha: alpha_value,
        beta: beta_value,
        observations: returns.len(),
    })
}

impl<K> AlignedPair<K> {
    /// Alpha and beta of this pair; an empty pair is rejected
    pub fn alpha_beta(&self, risk_free: f64, period: Period) -> Result<AlphaBeta> {
        cal_alpha_beta(self.returns(), self.benchmark(), risk_free, period)
    }
}

/// Align two raw series, then compute alpha and beta.
///
/// An empty intersection is reported as [`StatsError::NoOverlappingData`]
/// naming `symbol` and `benchmark_symbol`.
pub fn cal_alpha_beta_series<K: Ord + Clone>(
    symbol: &str,
    returns: &TimeSeries<K>,
    benchmark_symbol: &str,
    benchmark: &TimeSeries<K>,
    risk_free: f64,
    period: Period,
) -> Result<AlphaBeta> {
    let pair = align(returns, benchmark);
    if pair.is_empty() {
        return Err(StatsError::NoOverlappingData {
            symbol: symbol.to_string(),
            benchmark: benchmark_symbol.to_string(),
        });
    }

    debug!(
        symbol,
        benchmark = benchmark_symbol,
        raw = returns.len(),
        aligned = pair.len(),
        "aligned series"
    );
    pair.alpha_beta(risk_free, period)
}

/// Evaluate several independent series against one benchmark in parallel.
///
/// Results keep the order of `returns`; each entry fails or succeeds on
/// its own.
pub fn cal_alpha_beta_batch<K>(
    returns: &[(String, TimeSeries<K>)],
    benchmark_symbol: &str,
    benchmark: &TimeSeries<K>,
    risk_free: f64,
    period: Period,
) -> Vec<Result<AlphaBeta>>
where
    K: Ord + Clone + Send + Sync,
{
    returns
        .par_iter()
        .map(|(symbol, series)| {
            cal_alpha_beta_series(symbol, series, benchmark_symbol, benchmark, risk_free, period)
        })
        .collect()
}
