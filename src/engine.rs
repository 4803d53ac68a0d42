//! Engine wiring a datafeed, the statistics core and a reporter.

use std::sync::Arc;

use tracing::{info, warn};

use crate::datafeed::BaseDatafeed;
use crate::error::{Result, StatsError};
use crate::report::{Reporter, StatsReport};
use crate::setting::DEFAULT_LENGTH;
use crate::stats::{cal_alpha_beta_batch, Period, TimeSeries};

/// What to compute: several securities against one benchmark
#[derive(Debug, Clone, PartialEq)]
pub struct StatsRequest {
    pub symbols: Vec<String>,
    pub benchmark: String,
    pub risk_free: f64,
    pub period: Period,
    /// Records fetched per symbol, `0` for all
    pub length: usize,
}

impl StatsRequest {
    pub fn new(symbols: Vec<String>, benchmark: impl Into<String>) -> Self {
        Self {
            symbols,
            benchmark: benchmark.into(),
            risk_free: 0.0,
            period: Period::default(),
            length: DEFAULT_LENGTH as usize,
        }
    }

    pub fn with_risk_free(mut self, risk_free: f64) -> Self {
        self.risk_free = risk_free;
        self
    }

    pub fn with_period(mut self, period: Period) -> Self {
        self.period = period;
        self
    }

    pub fn with_length(mut self, length: usize) -> Self {
        self.length = length;
        self
    }
}

/// Fetches series, computes alpha/beta and hands the rows to a reporter
pub struct StatsEngine<R> {
    datafeed: Arc<dyn BaseDatafeed>,
    reporter: R,
}

impl<R: Reporter> StatsEngine<R> {
    pub fn new(datafeed: Arc<dyn BaseDatafeed>, reporter: R) -> Self {
        Self { datafeed, reporter }
    }

    pub fn into_reporter(self) -> R {
        self.reporter
    }

    /// Fetch and compute without reporting.
    ///
    /// Securities that cannot be fetched or share no data with the
    /// benchmark are logged and left out. Fails when the benchmark cannot
    /// be fetched or no security produced a row.
    pub async fn compute(&self, request: &StatsRequest) -> Result<Vec<StatsReport>> {
        if request.symbols.is_empty() {
            return Err(StatsError::Setting("no stock symbol given".to_string()));
        }

        let benchmark = self
            .datafeed
            .fetch_returns(&request.benchmark, request.length)
            .await?;

        let mut first_error = None;
        let mut fetched: Vec<(String, TimeSeries)> = Vec::with_capacity(request.symbols.len());
        for symbol in &request.symbols {
            match self.datafeed.fetch_returns(symbol, request.length).await {
                Ok(series) => fetched.push((symbol.clone(), series)),
                Err(e) => {
                    warn!(symbol = %symbol, "skipping: {}", e);
                    first_error.get_or_insert(e);
                }
            }
        }

        let results = cal_alpha_beta_batch(
            &fetched,
            &request.benchmark,
            &benchmark,
            request.risk_free,
            request.period,
        );

        let mut rows = Vec::with_capacity(results.len());
        for ((symbol, _), result) in fetched.iter().zip(results) {
            match result {
                Ok(stats) => rows.push(StatsReport::new(symbol.as_str(), request.benchmark.as_str(), stats)),
                Err(e) => {
                    warn!(symbol = %symbol, "skipping: {}", e);
                    first_error.get_or_insert(e);
                }
            }
        }

        match first_error {
            Some(e) if rows.is_empty() => Err(e),
            _ => Ok(rows),
        }
    }

    /// Compute and pass the rows to the reporter
    pub async fn run(&mut self, request: &StatsRequest) -> Result<Vec<StatsReport>> {
        info!(
            stocks = request.symbols.len(),
            benchmark = %request.benchmark,
            period = %request.period,
            risk_free = request.risk_free,
            "computing alpha/beta"
        );
        let rows = self.compute(request).await?;
        self.reporter.report(&rows)?;
        info!(rows = rows.len(), "report written");
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datafeed::{EmptyDatafeed, MemoryDatafeed};
    use crate::report::ConsoleReporter;
    use crate::stats::fixtures;

    fn datafeed() -> Arc<dyn BaseDatafeed> {
        Arc::new(
            MemoryDatafeed::new()
                .with_series("mixed", fixtures::mixed_returns())
                .with_series("negative", fixtures::negative_returns())
                .with_series("positive", fixtures::positive_returns()),
        )
    }

    #[tokio::test]
    async fn test_run_reports_each_stock() {
        let mut engine = StatsEngine::new(datafeed(), ConsoleReporter::new(Vec::new()));
        let request = StatsRequest::new(vec!["mixed".into(), "negative".into()], "positive");

        let rows = engine.run(&request).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].symbol, "mixed");
        assert!((rows[0].beta + 0.011049723756906134).abs() < 1.5e-8);
        assert!((rows[1].alpha + 0.9971673541849576).abs() < 1.5e-8);

        let output = String::from_utf8(engine.into_reporter().into_inner()).unwrap();
        assert_eq!(output.lines().count(), 3);
    }

    #[tokio::test]
    async fn test_unknown_stock_skipped() {
        let engine = StatsEngine::new(datafeed(), ConsoleReporter::new(Vec::new()));
        let request = StatsRequest::new(vec!["ghost".into(), "mixed".into()], "positive");

        let rows = engine.compute(&request).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].symbol, "mixed");
    }

    #[tokio::test]
    async fn test_no_overlap_fails_when_nothing_computed() {
        let feed = MemoryDatafeed::new()
            .with_series("positive", fixtures::positive_returns())
            .with_series("later", std::iter::once((fixtures::day(400), 0.01)).collect());
        let engine = StatsEngine::new(Arc::new(feed), ConsoleReporter::new(Vec::new()));
        let request = StatsRequest::new(vec!["later".into()], "positive");

        let err = engine.compute(&request).await.unwrap_err();
        assert!(matches!(err, StatsError::NoOverlappingData { .. }));
    }

    #[tokio::test]
    async fn test_length_limits_observations() {
        let engine = StatsEngine::new(datafeed(), ConsoleReporter::new(Vec::new()));
        let request = StatsRequest::new(vec!["mixed".into()], "positive").with_length(5);

        let rows = engine.compute(&request).await.unwrap();
        assert_eq!(rows[0].observations, 5);
    }

    #[tokio::test]
    async fn test_missing_benchmark_and_empty_request() {
        let engine = StatsEngine::new(Arc::new(EmptyDatafeed::new()), ConsoleReporter::new(Vec::new()));
        let request = StatsRequest::new(vec!["mixed".into()], "positive");
        assert!(matches!(engine.compute(&request).await, Err(StatsError::Datafeed(_))));

        let request = StatsRequest::new(Vec::new(), "positive");
        assert!(matches!(engine.compute(&request).await, Err(StatsError::Setting(_))));
    }
}
