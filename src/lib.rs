//! # HTTP Load-Test Reporting Library
//!
//! The aggregation and reporting stage of an HTTP load-testing tool. A
//! request-issuing layer runs the load and pushes one [`RequestResult`] per
//! request into a channel; this crate drains that channel and turns it into
//! throughput, latency percentiles, a histogram, per-phase breakdowns and
//! status/error distributions.
//!
//! ## Architecture Overview
//!
//! - `results`: per-request outcome types and their JSON-lines form
//! - `aggregator`: drains the result stream into a [`Summary`]
//! - `metrics`: nearest-rank percentiles, histogram and phase statistics
//! - `report`: text, CSV and JSON rendering to any `io::Write` sink
//! - `replay`: feeds a recorded JSON-lines capture into the result stream
//! - `cli`: argument parsing for the `hey-report` binary
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use hey_report::{Aggregator, OutputMode, Reporter, RequestResult, RequestTiming};
//! use std::time::Duration;
//! use tokio::sync::mpsc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let (tx, rx) = mpsc::channel(hey_report::defaults::CHANNEL_CAPACITY);
//!
//!     tokio::spawn(async move {
//!         let timing = RequestTiming::new(Duration::from_millis(12), 200, 512);
//!         let _ = tx.send(RequestResult::success(timing)).await;
//!     });
//!
//!     let summary = Aggregator::new(Duration::from_secs(1)).drain(rx).await;
//!     Reporter::new(std::io::stdout(), OutputMode::Text).print(&summary)?;
//!     Ok(())
//! }
//! ```

/// Per-request result types
///
/// `RequestResult` is what the request-issuing layer produces for every
/// request; `RecordedResult` is its serialised form for captures.
pub mod results;

/// Result stream aggregation
///
/// Drains the result channel into a `Summary` holding arrival-ordered
/// latency sequences, running sums and distributions.
pub mod aggregator;

/// Latency statistics
///
/// Percentiles, histogram buckets and per-phase min/mean/max computed
/// after aggregation.
pub mod metrics;

/// Report rendering
///
/// Text, CSV and JSON output of a `Summary`.
pub mod report;

pub mod cli;
pub mod error;
pub mod logging;
pub mod replay;
pub mod utils;

pub use aggregator::{Aggregator, Summary};
pub use error::{ReplayError, ReportError};
pub use metrics::{Histogram, PercentileValue, PhaseStats, Statistics, PERCENTILES};
pub use report::{JsonReport, OutputMode, Reporter};
pub use results::{Phase, RecordedResult, RequestResult, RequestTiming};

/// The current version of the crate, included in JSON reports.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default configuration values
pub mod defaults {
    /// Capacity of the result channel between producer and aggregator
    pub const CHANNEL_CAPACITY: usize = 1000;

    /// Number of equal-width histogram buckets; one more bucket is pinned
    /// to the slowest latency.
    pub const HISTOGRAM_BUCKETS: usize = 10;

    /// Length in glyphs of the fullest histogram bar
    pub const BAR_WIDTH: usize = 40;

    /// Glyph used to draw histogram bars
    pub const BAR_CHAR: char = '∎';

    /// Input path meaning "read from stdin"
    pub const STDIN_PATH: &str = "-";
}
