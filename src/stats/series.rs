//! Time-indexed return series and their alignment.
//!
//! A [`TimeSeries`] holds `(timestamp, return)` points with strictly
//! increasing timestamps. Missing observations are stored as `NaN`.
//! [`align`] inner-joins two series on the timestamps where both sides
//! carry a value, producing an index-synchronized [`AlignedPair`].

use std::cmp::Ordering;

use chrono::NaiveDate;

use crate::error::{Result, StatsError};

/// Ordered `(timestamp, value)` points of a single return series
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries<K = NaiveDate> {
    points: Vec<(K, f64)>,
}

impl<K> Default for TimeSeries<K> {
    fn default() -> Self {
        Self { points: Vec::new() }
    }
}

impl<K: Ord> TimeSeries<K> {
    /// Create an empty series
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty series with room for `capacity` points
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            points: Vec::with_capacity(capacity),
        }
    }

    /// Build a series from points, checking that timestamps strictly increase.
    ///
    /// `None` values are stored as missing.
    pub fn try_from_points<I>(points: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, Option<f64>)>,
    {
        let mut series = Self::new();
        for (index, (ts, value)) in points.into_iter().enumerate() {
            if let Some((last, _)) = series.points.last() {
                if *last >= ts {
                    return Err(StatsError::UnsortedSeries { index });
                }
            }
            series.points.push((ts, value.unwrap_or(f64::NAN)));
        }
        Ok(series)
    }

    /// Append a point. The timestamp must be later than the last one.
    pub fn push(&mut self, ts: K, value: f64) {
        debug_assert!(
            self.points.last().map_or(true, |(last, _)| *last < ts),
            "timestamps must be strictly increasing"
        );
        self.points.push((ts, value));
    }

    /// Append a missing observation
    pub fn push_missing(&mut self, ts: K) {
        self.push(ts, f64::NAN);
    }

    /// Value at `ts`, `None` if the timestamp is absent or the value missing
    pub fn get(&self, ts: &K) -> Option<f64> {
        self.points
            .binary_search_by(|(k, _)| k.cmp(ts))
            .ok()
            .map(|i| self.points[i].1)
            .filter(|v| !v.is_nan())
    }

    /// Number of points, missing ones included
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of missing observations
    pub fn missing_count(&self) -> usize {
        self.points.iter().filter(|(_, v)| v.is_nan()).count()
    }

    /// Iterate over `(timestamp, value)` points in time order
    pub fn iter(&self) -> impl Iterator<Item = (&K, f64)> + '_ {
        self.points.iter().map(|(k, v)| (k, *v))
    }

    pub fn timestamps(&self) -> impl Iterator<Item = &K> + '_ {
        self.points.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|(_, v)| *v)
    }

    /// Keep only the most recent `n` points. `0` keeps everything.
    pub fn truncate_front(&mut self, n: usize) {
        if n > 0 && self.points.len() > n {
            let excess = self.points.len() - n;
            self.points.drain(..excess);
        }
    }
}

impl<K: Ord> FromIterator<(K, f64)> for TimeSeries<K> {
    /// Collect points that are already in time order
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        let mut series = Self::new();
        for (ts, value) in iter {
            series.push(ts, value);
        }
        series
    }
}

/// Two index-synchronized sequences with no missing values
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedPair<K = NaiveDate> {
    timestamps: Vec<K>,
    returns: Vec<f64>,
    benchmark: Vec<f64>,
}

impl<K> AlignedPair<K> {
    /// Shared timestamps, ascending
    pub fn timestamps(&self) -> &[K] {
        &self.timestamps
    }

    pub fn returns(&self) -> &[f64] {
        &self.returns
    }

    pub fn benchmark(&self) -> &[f64] {
        &self.benchmark
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    /// Empty when the inputs had no common non-missing timestamp
    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// Split back into two series sharing the same timestamps
    pub fn into_series(self) -> (TimeSeries<K>, TimeSeries<K>)
    where
        K: Clone,
    {
        let returns = TimeSeries {
            points: self.timestamps.iter().cloned().zip(self.returns).collect(),
        };
        let benchmark = TimeSeries {
            points: self.timestamps.into_iter().zip(self.benchmark).collect(),
        };
        (returns, benchmark)
    }
}

/// Inner-join two series on timestamps where neither value is missing.
///
/// Both inputs must have strictly increasing timestamps; the result keeps
/// that order. An empty result means there is nothing to compute on.
pub fn align<K: Ord + Clone>(returns: &TimeSeries<K>, benchmark: &TimeSeries<K>) -> AlignedPair<K> {
    let capacity = returns.len().min(benchmark.len());
    let mut pair = AlignedPair {
        timestamps: Vec::with_capacity(capacity),
        returns: Vec::with_capacity(capacity),
        benchmark: Vec::with_capacity(capacity),
    };

    let (mut i, mut j) = (0, 0);
    while i < returns.points.len() && j < benchmark.points.len() {
        let (lk, lv) = &returns.points[i];
        let (rk, rv) = &benchmark.points[j];
        match lk.cmp(rk) {
            Ordering::Less => i += 1,
            Ordering::Greater => j += 1,
            Ordering::Equal => {
                if !lv.is_nan() && !rv.is_nan() {
                    pair.timestamps.push(lk.clone());
                    pair.returns.push(*lv);
                    pair.benchmark.push(*rv);
                }
                i += 1;
                j += 1;
            }
        }
    }

    pair
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::fixtures;

    #[test]
    fn test_try_from_points_rejects_unsorted() {
        let err = TimeSeries::try_from_points(vec![(1, Some(0.1)), (3, None), (2, Some(0.2))])
            .unwrap_err();
        assert!(matches!(err, StatsError::UnsortedSeries { index: 2 }));

        let err = TimeSeries::try_from_points(vec![(1, Some(0.1)), (1, Some(0.2))]).unwrap_err();
        assert!(matches!(err, StatsError::UnsortedSeries { index: 1 }));
    }

    #[test]
    fn test_missing_values() {
        let series = TimeSeries::try_from_points(vec![(1, Some(0.1)), (2, None), (3, Some(0.3))])
            .unwrap();
        assert_eq!(series.len(), 3);
        assert_eq!(series.missing_count(), 1);
        assert_eq!(series.get(&1), Some(0.1));
        assert_eq!(series.get(&2), None);
        assert_eq!(series.get(&4), None);
    }

    #[test]
    fn test_truncate_front() {
        let mut series: TimeSeries<i32> = (0..10).map(|i| (i, i as f64)).collect();
        series.truncate_front(0);
        assert_eq!(series.len(), 10);
        series.truncate_front(3);
        assert_eq!(series.timestamps().copied().collect::<Vec<_>>(), vec![7, 8, 9]);
        series.truncate_front(5);
        assert_eq!(series.len(), 3);
    }

    #[test]
    fn test_align_fixture_lengths() {
        let cases = [
            (fixtures::mixed_returns(), fixtures::positive_returns(), 10),
            (fixtures::mixed_returns(), fixtures::mixed_returns_with_nan(), 9),
            (fixtures::positive_returns_with_nan(), fixtures::mixed_returns_with_nan(), 8),
        ];

        for (returns, benchmark, expected) in cases {
            let pair = align(&returns, &benchmark);
            assert_eq!(pair.len(), expected);
            assert_eq!(pair.returns().len(), expected);
            assert_eq!(pair.benchmark().len(), expected);
        }
    }

    #[test]
    fn test_align_drops_either_side_missing() {
        let pair = align(&fixtures::positive_returns_with_nan(), &fixtures::mixed_returns_with_nan());
        // Day 0 missing in the benchmark, day 2 missing in the returns
        assert!(!pair.timestamps().contains(&fixtures::day(0)));
        assert!(!pair.timestamps().contains(&fixtures::day(2)));
        assert!(pair.returns().iter().chain(pair.benchmark()).all(|v| !v.is_nan()));
        assert_eq!(pair.returns()[0], 0.02);
        assert_eq!(pair.benchmark()[0], 0.01);
    }

    #[test]
    fn test_align_inner_join_on_timestamps() {
        let a: TimeSeries<i32> = vec![(1, 0.1), (2, 0.2), (4, 0.4), (6, 0.6)].into_iter().collect();
        let b: TimeSeries<i32> = vec![(0, 1.0), (2, 2.0), (3, 3.0), (4, 4.0), (7, 7.0)]
            .into_iter()
            .collect();

        let pair = align(&a, &b);
        assert_eq!(pair.timestamps(), &[2, 4]);
        assert_eq!(pair.returns(), &[0.2, 0.4]);
        assert_eq!(pair.benchmark(), &[2.0, 4.0]);
    }

    #[test]
    fn test_align_is_idempotent() {
        let first = align(&fixtures::positive_returns_with_nan(), &fixtures::mixed_returns_with_nan());
        let (returns, benchmark) = first.clone().into_series();
        let second = align(&returns, &benchmark);
        assert_eq!(first, second);
    }

    #[test]
    fn test_align_empty_intersection() {
        let a: TimeSeries<i32> = vec![(1, 0.1), (3, 0.3)].into_iter().collect();
        let b: TimeSeries<i32> = vec![(2, 0.2), (4, 0.4)].into_iter().collect();
        let pair = align(&a, &b);
        assert!(pair.is_empty());

        let mut c = TimeSeries::new();
        c.push_missing(1);
        c.push_missing(3);
        assert!(align(&a, &c).is_empty());
        assert!(align(&TimeSeries::<i32>::new(), &a).is_empty());
    }
}
