//! Datafeed module for obtaining return series.
//!
//! A datafeed hands out the most recent `length` observations of a symbol
//! as a [`TimeSeries`]. Datafeeds are passed explicitly to the engine;
//! [`create_datafeed`] picks one from the settings.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};
use tracing::{debug, warn};

use crate::error::{Result, StatsError};
use crate::setting::Settings;
use crate::stats::TimeSeries;

/// Source of return series
#[async_trait]
pub trait BaseDatafeed: Send + Sync {
    /// Initialize datafeed service connection
    async fn init(&self) -> Result<bool> {
        Ok(true)
    }

    /// Most recent `length` returns of `symbol`; `0` means all available
    async fn fetch_returns(&self, symbol: &str, length: usize) -> Result<TimeSeries>;
}

/// Empty datafeed implementation for when no datafeed is configured
pub struct EmptyDatafeed;

impl EmptyDatafeed {
    pub fn new() -> Self {
        Self
    }
}

impl Default for EmptyDatafeed {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseDatafeed for EmptyDatafeed {
    async fn init(&self) -> Result<bool> {
        warn!("no datafeed configured, set datafeed.name in the settings file");
        Ok(false)
    }

    async fn fetch_returns(&self, symbol: &str, _length: usize) -> Result<TimeSeries> {
        Err(StatsError::Datafeed(format!(
            "cannot fetch {}: no datafeed configured",
            symbol
        )))
    }
}

/// Datafeed over series held in memory
#[derive(Default)]
pub struct MemoryDatafeed {
    series: RwLock<HashMap<String, TimeSeries>>,
}

impl MemoryDatafeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or replace the series of `symbol`
    pub fn insert(&self, symbol: impl Into<String>, series: TimeSeries) {
        if let Ok(mut map) = self.series.write() {
            map.insert(symbol.into(), series);
        }
    }

    /// Builder-style [`MemoryDatafeed::insert`]
    pub fn with_series(self, symbol: impl Into<String>, series: TimeSeries) -> Self {
        self.insert(symbol, series);
        self
    }
}

#[async_trait]
impl BaseDatafeed for MemoryDatafeed {
    async fn fetch_returns(&self, symbol: &str, length: usize) -> Result<TimeSeries> {
        let map = self
            .series
            .read()
            .map_err(|e| StatsError::Datafeed(e.to_string()))?;
        let mut series = map
            .get(symbol)
            .cloned()
            .ok_or_else(|| StatsError::Datafeed(format!("unknown symbol {}", symbol)))?;
        series.truncate_front(length);
        Ok(series)
    }
}

/// One record of a series file.
///
/// The outer `Option` tells whether the field is present, the inner one
/// whether it is `null`.
#[derive(Debug, Deserialize)]
struct SeriesRecord {
    day: NaiveDate,
    /// Closing price of a daily bar, `null` on a suspended day
    #[serde(default, deserialize_with = "present")]
    close: Option<Option<f64>>,
    /// Precomputed return, `null` when missing
    #[serde(default, rename = "return", deserialize_with = "present")]
    value: Option<Option<f64>>,
}

fn present<'de, D>(deserializer: D) -> std::result::Result<Option<Option<f64>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<f64>::deserialize(deserializer).map(Some)
}

/// Datafeed reading `<dir>/<symbol>.json` files.
///
/// A file is a JSON array, either of `{"day": "2024-01-02", "return": 0.01}`
/// records or of `{"day": "2024-01-02", "close": 10.5}` bars. Bars become
/// simple returns `close / previous_close - 1`; the first bar has none. A
/// `null` close leaves both that day and the next one without a return.
pub struct JsonDatafeed {
    dir: PathBuf,
}

impl JsonDatafeed {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn symbol_path(&self, symbol: &str) -> Result<PathBuf> {
        let valid = !symbol.is_empty()
            && symbol
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-' | '^'))
            && !symbol.starts_with('.');
        if !valid {
            return Err(StatsError::Datafeed(format!("invalid symbol '{}'", symbol)));
        }
        Ok(self.dir.join(format!("{}.json", symbol)))
    }
}

/// Turn the last `length` records into a return series
fn records_to_series(mut records: Vec<SeriesRecord>, length: usize) -> Result<TimeSeries> {
    if length > 0 && records.len() > length {
        records.drain(..records.len() - length);
    }

    for record in &records {
        match (record.close, record.value) {
            (Some(_), Some(_)) => {
                return Err(StatsError::Datafeed(format!(
                    "record on {} has both close and return",
                    record.day
                )))
            }
            (None, None) => {
                return Err(StatsError::Datafeed(format!(
                    "record on {} has neither close nor return",
                    record.day
                )))
            }
            _ => {}
        }
    }

    let bars = records.iter().filter(|r| r.close.is_some()).count();
    if bars != 0 && bars != records.len() {
        return Err(StatsError::Datafeed(
            "series file mixes close bars and return records".to_string(),
        ));
    }

    let mut previous_close: Option<f64> = None;
    let points = records.iter().map(|record| {
        let value = match record.close {
            Some(close) => {
                let value = previous_close.zip(close).map(|(prev, close)| close / prev - 1.0);
                previous_close = close;
                value
            }
            None => record.value.flatten(),
        };
        (record.day, value)
    });
    TimeSeries::try_from_points(points.collect::<Vec<_>>())
}

#[async_trait]
impl BaseDatafeed for JsonDatafeed {
    async fn init(&self) -> Result<bool> {
        let exists = tokio::fs::try_exists(&self.dir).await?;
        if !exists {
            warn!("datafeed directory {} does not exist", self.dir.display());
        }
        Ok(exists)
    }

    async fn fetch_returns(&self, symbol: &str, length: usize) -> Result<TimeSeries> {
        let path = self.symbol_path(symbol)?;
        let content = tokio::fs::read_to_string(&path).await.map_err(|e| {
            StatsError::Datafeed(format!("cannot read {}: {}", path.display(), e))
        })?;
        let records: Vec<SeriesRecord> = serde_json::from_str(&content)?;
        let series = records_to_series(records, length)?;
        debug!(symbol, points = series.len(), missing = series.missing_count(), "loaded series");
        Ok(series)
    }
}

/// Datafeed named by `datafeed.name`: `json` (rooted at `data_dir` or
/// `datafeed.path`) or `none`/empty
pub fn create_datafeed(settings: &Settings, data_dir: Option<&Path>) -> Result<Arc<dyn BaseDatafeed>> {
    let name = settings.get_string("datafeed.name").unwrap_or_default();
    match name.as_str() {
        "json" => {
            let dir = match data_dir {
                Some(dir) => dir.to_path_buf(),
                None => PathBuf::from(settings.get_string("datafeed.path").unwrap_or_default()),
            };
            Ok(Arc::new(JsonDatafeed::new(dir)))
        }
        "" | "none" => Ok(Arc::new(EmptyDatafeed::new())),
        other => Err(StatsError::Setting(format!("unknown datafeed '{}'", other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::setting::SettingValue;

    fn write_series(dir: &Path, symbol: &str, json: &str) {
        std::fs::write(dir.join(format!("{}.json", symbol)), json).unwrap();
    }

    #[tokio::test]
    async fn test_empty_datafeed() {
        let datafeed = EmptyDatafeed::new();

        let result = datafeed.init().await;
        assert!(!result.unwrap());

        let result = datafeed.fetch_returns("sh600519", 10).await;
        assert!(matches!(result, Err(StatsError::Datafeed(_))));
    }

    #[tokio::test]
    async fn test_memory_datafeed_truncates() {
        let series: TimeSeries = (1..=5)
            .map(|d| (NaiveDate::from_ymd_opt(2024, 1, d).unwrap(), d as f64 / 100.0))
            .collect();
        let datafeed = MemoryDatafeed::new().with_series("AAA", series);

        assert_eq!(datafeed.fetch_returns("AAA", 0).await.unwrap().len(), 5);
        let last_two = datafeed.fetch_returns("AAA", 2).await.unwrap();
        assert_eq!(last_two.values().collect::<Vec<_>>(), vec![0.04, 0.05]);
        assert!(datafeed.fetch_returns("BBB", 2).await.is_err());
    }

    #[tokio::test]
    async fn test_json_datafeed_returns() {
        let dir = tempfile::tempdir().unwrap();
        write_series(
            dir.path(),
            "sh000300",
            r#"[
                {"day": "2024-01-02", "return": 0.01},
                {"day": "2024-01-03", "return": null},
                {"day": "2024-01-04", "return": -0.02}
            ]"#,
        );

        let datafeed = JsonDatafeed::new(dir.path());
        assert!(datafeed.init().await.unwrap());

        let series = datafeed.fetch_returns("sh000300", 0).await.unwrap();
        assert_eq!(series.len(), 3);
        assert_eq!(series.missing_count(), 1);
        assert_eq!(series.get(&NaiveDate::from_ymd_opt(2024, 1, 4).unwrap()), Some(-0.02));
    }

    #[tokio::test]
    async fn test_json_datafeed_derives_returns_from_closes() {
        let dir = tempfile::tempdir().unwrap();
        write_series(
            dir.path(),
            "sh600519",
            r#"[
                {"day": "2024-01-02", "close": 100.0},
                {"day": "2024-01-03", "close": 110.0},
                {"day": "2024-01-04", "close": 99.0},
                {"day": "2024-01-05", "close": 99.0}
            ]"#,
        );

        let datafeed = JsonDatafeed::new(dir.path());
        let series = datafeed.fetch_returns("sh600519", 0).await.unwrap();
        let values: Vec<f64> = series.values().collect();
        assert!(values[0].is_nan());
        assert!((values[1] - 0.1).abs() < 1e-12);
        assert!((values[2] + 0.1).abs() < 1e-12);
        assert_eq!(values[3], 0.0);

        // Only the last three bars are kept, so the first of them has no return
        let tail = datafeed.fetch_returns("sh600519", 3).await.unwrap();
        assert_eq!(tail.len(), 3);
        assert_eq!(tail.missing_count(), 1);
    }

    #[tokio::test]
    async fn test_json_datafeed_suspended_day() {
        let dir = tempfile::tempdir().unwrap();
        write_series(
            dir.path(),
            "sz000001",
            r#"[
                {"day": "2024-01-02", "close": 100.0},
                {"day": "2024-01-03", "close": null},
                {"day": "2024-01-04", "close": 110.0},
                {"day": "2024-01-05", "close": 121.0}
            ]"#,
        );

        let datafeed = JsonDatafeed::new(dir.path());
        let series = datafeed.fetch_returns("sz000001", 0).await.unwrap();
        assert_eq!(series.len(), 4);
        assert_eq!(series.missing_count(), 3);
        let last = series.get(&NaiveDate::from_ymd_opt(2024, 1, 5).unwrap()).unwrap();
        assert!((last - 0.1).abs() < 1e-12);
    }

    #[tokio::test]
    async fn test_json_datafeed_errors() {
        let dir = tempfile::tempdir().unwrap();
        write_series(dir.path(), "unsorted", r#"[{"day": "2024-01-03", "return": 0.1}, {"day": "2024-01-02", "return": 0.1}]"#);
        write_series(dir.path(), "mixed", r#"[{"day": "2024-01-02", "close": 1.0}, {"day": "2024-01-03", "return": 0.1}]"#);

        let datafeed = JsonDatafeed::new(dir.path());
        assert!(matches!(
            datafeed.fetch_returns("unsorted", 0).await,
            Err(StatsError::UnsortedSeries { index: 1 })
        ));
        write_series(dir.path(), "both", r#"[{"day": "2024-01-02", "close": 1.0, "return": 0.1}]"#);
        write_series(dir.path(), "neither", r#"[{"day": "2024-01-02", "open": 1.0}]"#);
        assert!(matches!(
            datafeed.fetch_returns("mixed", 0).await,
            Err(StatsError::Datafeed(msg)) if msg.contains("mixes")
        ));
        assert!(matches!(
            datafeed.fetch_returns("both", 0).await,
            Err(StatsError::Datafeed(msg)) if msg.contains("both close and return")
        ));
        assert!(matches!(
            datafeed.fetch_returns("neither", 0).await,
            Err(StatsError::Datafeed(msg)) if msg.contains("neither")
        ));
        assert!(matches!(datafeed.fetch_returns("missing", 0).await, Err(StatsError::Datafeed(_))));
        assert!(matches!(datafeed.fetch_returns("../etc", 0).await, Err(StatsError::Datafeed(_))));
    }

    #[test]
    fn test_create_datafeed_from_settings() {
        let settings = Settings::defaults();
        assert!(create_datafeed(&settings, None).is_ok());

        settings.set("datafeed.name", SettingValue::String("none".to_string()));
        let datafeed = create_datafeed(&settings, None).unwrap();
        let result = tokio_test::block_on(datafeed.init());
        assert!(!result.unwrap());

        settings.set("datafeed.name", SettingValue::String("sina".to_string()));
        assert!(matches!(create_datafeed(&settings, None), Err(StatsError::Setting(_))));
    }
}
