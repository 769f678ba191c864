//! # Result Aggregation
//!
//! The aggregator drains the result stream produced by the request-issuing
//! layer and accumulates everything the reporter needs:
//!
//! - Total and per-phase durations of successful requests, kept in arrival
//!   order so the CSV dump can replay them row by row
//! - Running sums for the per-phase averages
//! - Status-code and error distributions
//! - The total number of response bytes
//!
//! Failures never contribute to latency statistics; they are only tallied by
//! their display string.
//!
//! ## Lifecycle
//!
//! One [`Aggregator`] is created per run with the wall-clock duration of the
//! run. It is populated by a single drain pass and turned into an immutable
//! [`Summary`] by [`Aggregator::finish`], which consumes the aggregator.

use crate::results::{Phase, RequestResult, RequestTiming};
use std::collections::BTreeMap;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info};

/// Accumulated state of one load-test run.
///
/// Distributions are kept in `BTreeMap`s so every report lists status codes
/// and error messages in ascending key order.
#[derive(Debug, Clone, Default)]
pub struct Summary {
    total: Duration,
    lats: Vec<f64>,
    total_sum: f64,
    phase_lats: [Vec<f64>; 5],
    phase_sums: [f64; 5],
    status_codes: BTreeMap<u16, usize>,
    errors: BTreeMap<String, usize>,
    size_total: i64,
}

impl Summary {
    /// Wall-clock duration of the whole run.
    pub fn total(&self) -> Duration {
        self.total
    }

    /// Number of successful requests.
    pub fn success_count(&self) -> usize {
        self.lats.len()
    }

    /// Number of failed requests.
    pub fn error_count(&self) -> usize {
        self.errors.values().sum()
    }

    /// Number of results consumed from the stream.
    pub fn result_count(&self) -> usize {
        self.success_count() + self.error_count()
    }

    /// Total request durations in seconds, in arrival order.
    pub fn latencies(&self) -> &[f64] {
        &self.lats
    }

    /// Durations of one phase in seconds, in arrival order.
    pub fn phase_latencies(&self, phase: Phase) -> &[f64] {
        &self.phase_lats[phase.index()]
    }

    pub fn status_codes(&self) -> &BTreeMap<u16, usize> {
        &self.status_codes
    }

    pub fn errors(&self) -> &BTreeMap<String, usize> {
        &self.errors
    }

    /// Sum of all positive content lengths.
    pub fn size_total(&self) -> i64 {
        self.size_total
    }

    /// Average response size in bytes, remainder dropped.
    pub fn size_per_request(&self) -> i64 {
        match self.success_count() {
            0 => 0,
            n => self.size_total / n as i64,
        }
    }

    /// Successful requests per second of wall-clock time.
    ///
    /// Returns 0.0 when there were no successes or the run took no time.
    pub fn requests_per_sec(&self) -> f64 {
        let secs = self.total.as_secs_f64();
        if self.lats.is_empty() || secs <= 0.0 {
            return 0.0;
        }
        self.lats.len() as f64 / secs
    }

    /// Mean total duration of successful requests, 0.0 when there are none.
    pub fn average(&self) -> f64 {
        self.mean_of(self.total_sum)
    }

    /// Mean duration of one phase, 0.0 when there are no successes.
    pub fn phase_mean(&self, phase: Phase) -> f64 {
        self.mean_of(self.phase_sums[phase.index()])
    }

    fn mean_of(&self, sum: f64) -> f64 {
        if self.lats.is_empty() {
            0.0
        } else {
            sum / self.lats.len() as f64
        }
    }
}

/// Single-pass accumulator for a stream of [`RequestResult`]s.
#[derive(Debug)]
pub struct Aggregator {
    summary: Summary,
}

impl Aggregator {
    /// Create an aggregator for a run that took `total` wall-clock time.
    pub fn new(total: Duration) -> Self {
        Self {
            summary: Summary {
                total,
                ..Default::default()
            },
        }
    }

    /// Fold one result into the running state.
    pub fn consume(&mut self, result: RequestResult) {
        match result {
            RequestResult::Failure(err) => {
                *self.summary.errors.entry(err.to_string()).or_insert(0) += 1;
            }
            RequestResult::Success(timing) => self.record_success(&timing),
        }
    }

    fn record_success(&mut self, timing: &RequestTiming) {
        let s = &mut self.summary;

        let total = timing.duration.as_secs_f64();
        s.lats.push(total);
        s.total_sum += total;

        for phase in Phase::ALL {
            let secs = timing.phase(phase).as_secs_f64();
            s.phase_lats[phase.index()].push(secs);
            s.phase_sums[phase.index()] += secs;
        }

        *s.status_codes.entry(timing.status_code).or_insert(0) += 1;
        if timing.content_length > 0 {
            s.size_total += timing.content_length;
        }
    }

    /// Await results until every sender has been dropped and the channel
    /// is empty, then finish.
    pub async fn drain(mut self, mut results: mpsc::Receiver<RequestResult>) -> Summary {
        debug!("Draining result stream");
        while let Some(result) = results.recv().await {
            self.consume(result);
        }
        self.finish()
    }

    /// Finalise the run and hand over the accumulated [`Summary`].
    pub fn finish(self) -> Summary {
        let summary = self.summary;
        info!(
            "Aggregated {} results ({} succeeded, {} failed) over {:?}",
            summary.result_count(),
            summary.success_count(),
            summary.error_count(),
            summary.total
        );
        summary
    }
}
