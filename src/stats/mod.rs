//! Statistics core: return series, alignment and alpha/beta.
//!
//! Data flows one way: two raw [`TimeSeries`] are inner-joined by
//! [`align`] into an [`AlignedPair`], which [`cal_alpha_beta`] turns into
//! an [`AlphaBeta`]. Everything here is pure and synchronous.

pub mod alpha_beta;
pub mod period;
pub mod series;

pub use alpha_beta::{
    alpha, beta, cal_alpha_beta, cal_alpha_beta_batch, cal_alpha_beta_series, AlphaBeta,
};
pub use period::Period;
pub use series::{align, AlignedPair, TimeSeries};
