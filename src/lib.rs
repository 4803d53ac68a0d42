//! finstats - alpha and beta of a security against a benchmark
//!
//! This crate provides:
//!
//! - **stats**: return series, alignment on common dates, beta, annualized alpha
//! - **datafeed**: datafeed trait with in-memory and JSON file implementations
//! - **report**: reporter trait and a console table reporter
//! - **engine**: the datafeed → statistics → reporter pipeline
//! - **setting**: settings with defaults and a JSON override file
//! - **logger**: tracing subscriber setup
//! - **utility**: working folder resolution
//!
//! # Quick Start
//!
//! ```rust
//! use finstats::stats::{cal_alpha_beta, Period};
//!
//! let returns = [0.01, -0.01, 0.06, -0.05, 0.01, -0.03, 0.03, 0.02, -0.09, 0.07];
//! let benchmark = [0.03, 0.01, 0.05, 0.10, 0.01, 0.07, 0.04, 0.05, 0.02, 0.06];
//!
//! let stats = cal_alpha_beta(&returns, &benchmark, 0.0, Period::Daily).unwrap();
//! assert!((stats.beta + 0.011049723756906134).abs() < 1e-8);
//! assert!((stats.alpha - 0.8696323422235717).abs() < 1e-8);
//! ```

pub mod datafeed;
pub mod engine;
pub mod error;
pub mod logger;
pub mod report;
pub mod setting;
pub mod stats;
pub mod utility;

// Re-export commonly used types
pub use datafeed::{create_datafeed, BaseDatafeed, EmptyDatafeed, JsonDatafeed, MemoryDatafeed};
pub use engine::{StatsEngine, StatsRequest};
pub use error::{Result, StatsError};
pub use report::{ConsoleReporter, Reporter, StatsReport};
pub use setting::{SettingValue, Settings, SETTINGS};
pub use stats::{
    align, alpha, beta, cal_alpha_beta, cal_alpha_beta_series, AlignedPair, AlphaBeta, Period,
    TimeSeries,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
