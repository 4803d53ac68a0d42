//! Error type shared by the statistics core and its collaborators.

use thiserror::Error;

/// Crate-wide result alias
pub type Result<T> = std::result::Result<T, StatsError>;

/// Errors raised while fetching, aligning or evaluating return series
#[derive(Debug, Error)]
pub enum StatsError {
    /// Beta/alpha need at least one observation
    #[error("cannot compute statistics on an empty series")]
    EmptySeries,

    /// Inputs to beta/alpha must be index-synchronized
    #[error("series length mismatch: returns has {returns} points, benchmark has {benchmark}")]
    LengthMismatch { returns: usize, benchmark: usize },

    /// Alignment left nothing to compute on
    #[error("no overlapping data between {symbol} and {benchmark}")]
    NoOverlappingData { symbol: String, benchmark: String },

    /// Period label outside y/q/m/w/d
    #[error("unknown period '{0}', expected one of y, q, m, w, d")]
    UnknownPeriod(String),

    /// Timestamps must be strictly increasing
    #[error("series timestamps are not strictly increasing at index {index}")]
    UnsortedSeries { index: usize },

    #[error("datafeed error: {0}")]
    Datafeed(String),

    #[error("setting error: {0}")]
    Setting(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}
