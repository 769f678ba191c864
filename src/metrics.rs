//! # Latency Statistics
//!
//! Post-aggregation statistics computed from a [`Summary`]:
//!
//! - **Percentiles**: nearest-rank, never interpolated, so every reported
//!   value is a latency that was actually observed
//! - **Histogram**: ten equal-width buckets between the fastest and slowest
//!   request, plus a final bucket pinned to the slowest value
//! - **Phase statistics**: mean, fastest and slowest per connection phase
//!
//! All inputs are seconds as `f64`. The functions that take a `sorted` slice
//! require it to be sorted ascending; [`sorted_copy`] produces such a slice
//! without touching the caller's data.

use crate::aggregator::Summary;
use crate::defaults;
use crate::results::Phase;
use serde::{Deserialize, Serialize};

/// Percentile targets reported for total request latency.
pub const PERCENTILES: [u8; 7] = [10, 25, 50, 75, 90, 95, 99];

/// A percentile target and the sample assigned to it, if any.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PercentileValue {
    pub percentile: u8,
    pub secs: Option<f64>,
}

/// One histogram bucket. `edge` is the inclusive upper bound.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bucket {
    pub edge: f64,
    pub count: usize,
}

/// Latency histogram over a sorted sample set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Histogram {
    pub buckets: Vec<Bucket>,
    pub max_count: usize,
}

/// Mean, fastest and slowest duration of one connection phase.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhaseStats {
    pub phase: Phase,
    pub mean: f64,
    pub fastest: f64,
    pub slowest: f64,
}

/// Statistics over the total latency of successful requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    pub fastest: f64,
    pub slowest: f64,
    pub percentiles: Vec<PercentileValue>,
    pub histogram: Histogram,
}

/// Return an ascending copy of `values`.
pub fn sorted_copy(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    sorted
}

/// Nearest-rank percentiles in one linear pass over `sorted`.
///
/// The rank of index `i` is `floor(i * 100 / n)`. Targets are taken in
/// ascending order and the cursor advances by at most one target per sample:
/// the next unfilled target gets the value at the first index whose rank
/// reaches it. Targets the pass never reaches stay `None`; that always
/// includes every target when `n` is 0 or 1, since index 0 has rank 0.
pub fn nearest_rank_percentiles(sorted: &[f64], targets: &[u8]) -> Vec<PercentileValue> {
    let mut values: Vec<PercentileValue> = targets
        .iter()
        .map(|&percentile| PercentileValue {
            percentile,
            secs: None,
        })
        .collect();

    let n = sorted.len();
    let mut j = 0;
    for (i, &value) in sorted.iter().enumerate() {
        if j >= values.len() {
            break;
        }
        let rank = i * 100 / n;
        if rank >= values[j].percentile as usize {
            values[j].secs = Some(value);
            j += 1;
        }
    }

    values
}

impl Histogram {
    /// Bucket an ascending sample set.
    ///
    /// Edges start at the fastest value and advance by a tenth of the range;
    /// the last edge is set to the slowest value itself so rounding never
    /// leaves the maximum outside the histogram. When every sample is equal
    /// the range is zero and all samples land in the first bucket.
    pub fn from_sorted(sorted: &[f64]) -> Self {
        let bc = defaults::HISTOGRAM_BUCKETS;
        let fastest = sorted.first().copied().unwrap_or(0.0);
        let slowest = sorted.last().copied().unwrap_or(0.0);
        let width = (slowest - fastest) / bc as f64;

        let mut edges: Vec<f64> = (0..bc).map(|i| fastest + width * i as f64).collect();
        edges.push(slowest);

        let mut counts = vec![0usize; edges.len()];
        let last = edges.len() - 1;
        let mut bi = 0;
        let mut i = 0;
        while i < sorted.len() {
            if sorted[i] <= edges[bi] {
                counts[bi] += 1;
                i += 1;
            } else if bi < last {
                bi += 1;
            } else {
                // only reachable with unsorted input
                counts[last] += 1;
                i += 1;
            }
        }

        let max_count = counts.iter().copied().max().unwrap_or(0);
        let buckets = edges
            .into_iter()
            .zip(counts)
            .map(|(edge, count)| Bucket { edge, count })
            .collect();

        Self { buckets, max_count }
    }

    /// Total number of samples across all buckets.
    pub fn total_count(&self) -> usize {
        self.buckets.iter().map(|b| b.count).sum()
    }

    /// Bar length for a bucket count, rounded to nearest and scaled so the
    /// fullest bucket spans [`defaults::BAR_WIDTH`] glyphs.
    pub fn bar_len(&self, count: usize) -> usize {
        if self.max_count == 0 {
            return 0;
        }
        (count * defaults::BAR_WIDTH + self.max_count / 2) / self.max_count
    }
}

impl PhaseStats {
    /// Compute min/max from a private sorted copy of `samples`.
    pub fn from_samples(phase: Phase, mean: f64, samples: &[f64]) -> Self {
        let sorted = sorted_copy(samples);
        Self {
            phase,
            mean,
            fastest: sorted.first().copied().unwrap_or(0.0),
            slowest: sorted.last().copied().unwrap_or(0.0),
        }
    }

    pub fn from_summary(summary: &Summary, phase: Phase) -> Self {
        Self::from_samples(
            phase,
            summary.phase_mean(phase),
            summary.phase_latencies(phase),
        )
    }
}

impl Statistics {
    /// Compute total-latency statistics; `None` when no request succeeded.
    pub fn compute(summary: &Summary) -> Option<Self> {
        if summary.success_count() == 0 {
            return None;
        }

        let sorted = sorted_copy(summary.latencies());
        let fastest = sorted[0];
        let slowest = sorted[sorted.len() - 1];

        Some(Self {
            fastest,
            slowest,
            percentiles: nearest_rank_percentiles(&sorted, &PERCENTILES),
            histogram: Histogram::from_sorted(&sorted),
        })
    }
}
