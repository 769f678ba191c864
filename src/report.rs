//! # Report Output
//!
//! Renders an aggregated [`Summary`] to any [`std::io::Write`] sink in one
//! of three mutually exclusive formats:
//!
//! - **Text**: the human-readable summary with histogram, latency
//!   distribution, per-phase details and status/error distributions
//! - **CSV**: one row per successful request in arrival order
//! - **JSON**: the computed statistics as a single document for tooling
//!
//! All durations are seconds with four decimal places. When no request
//! succeeded, the text report contains only the error distribution.

use crate::aggregator::Summary;
use crate::defaults;
use crate::error::ReportError;
use crate::metrics::{Histogram, PercentileValue, PhaseStats, Statistics};
use crate::results::Phase;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Write;
use tracing::{debug, warn};

/// Output format selected for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    #[default]
    Text,
    Csv,
    Json,
}

impl OutputMode {
    /// Map a user-supplied mode name to an [`OutputMode`].
    ///
    /// Unknown names fall back to [`OutputMode::Text`].
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "csv" => OutputMode::Csv,
            "json" => OutputMode::Json,
            "" | "text" => OutputMode::Text,
            other => {
                warn!("Unknown output mode '{}', using text summary", other);
                OutputMode::Text
            }
        }
    }
}

impl std::fmt::Display for OutputMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputMode::Text => write!(f, "text"),
            OutputMode::Csv => write!(f, "csv"),
            OutputMode::Json => write!(f, "json"),
        }
    }
}

/// Machine-readable form of a run's statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonReport {
    pub version: String,
    pub generated_at: chrono::DateTime<chrono::Utc>,
    pub total_secs: f64,
    pub successes: usize,
    pub failures: usize,
    pub requests_per_sec: f64,
    pub average_secs: f64,
    pub fastest_secs: Option<f64>,
    pub slowest_secs: Option<f64>,
    pub size_total: i64,
    pub size_per_request: i64,
    pub percentiles: Vec<PercentileValue>,
    pub histogram: Option<Histogram>,
    pub phases: Vec<PhaseStats>,
    pub status_codes: BTreeMap<u16, usize>,
    pub errors: BTreeMap<String, usize>,
}

impl JsonReport {
    pub fn new(summary: &Summary) -> Self {
        let stats = Statistics::compute(summary);
        let phases = if summary.success_count() > 0 {
            Phase::ALL
                .iter()
                .map(|&phase| PhaseStats::from_summary(summary, phase))
                .collect()
        } else {
            Vec::new()
        };

        Self {
            version: crate::VERSION.to_string(),
            generated_at: chrono::Utc::now(),
            total_secs: summary.total().as_secs_f64(),
            successes: summary.success_count(),
            failures: summary.error_count(),
            requests_per_sec: summary.requests_per_sec(),
            average_secs: summary.average(),
            fastest_secs: stats.as_ref().map(|s| s.fastest),
            slowest_secs: stats.as_ref().map(|s| s.slowest),
            size_total: summary.size_total(),
            size_per_request: summary.size_per_request(),
            percentiles: stats
                .as_ref()
                .map(|s| s.percentiles.clone())
                .unwrap_or_default(),
            histogram: stats.map(|s| s.histogram),
            phases,
            status_codes: summary.status_codes().clone(),
            errors: summary.errors().clone(),
        }
    }
}

/// Writes a [`Summary`] to a sink in the configured [`OutputMode`].
pub struct Reporter<W: Write> {
    w: W,
    mode: OutputMode,
}

impl<W: Write> Reporter<W> {
    pub fn new(w: W, mode: OutputMode) -> Self {
        Self { w, mode }
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    /// Give back the underlying sink.
    pub fn into_inner(self) -> W {
        self.w
    }

    /// Render the summary and flush the sink.
    pub fn print(&mut self, summary: &Summary) -> Result<(), ReportError> {
        debug!("Writing {} report", self.mode);
        match self.mode {
            OutputMode::Csv => self.print_csv(summary)?,
            OutputMode::Json => self.print_json(summary)?,
            OutputMode::Text => self.print_text(summary)?,
        }
        self.w.flush()?;
        Ok(())
    }

    fn print_csv(&mut self, summary: &Summary) -> Result<(), ReportError> {
        write!(self.w, "response-time")?;
        for phase in Phase::ALL {
            write!(self.w, ",{}", phase.csv_header())?;
        }
        writeln!(self.w)?;

        for (i, total) in summary.latencies().iter().enumerate() {
            write!(self.w, "{:4.4}", total)?;
            for phase in Phase::ALL {
                write!(self.w, ",{:4.4}", summary.phase_latencies(phase)[i])?;
            }
            writeln!(self.w)?;
        }
        Ok(())
    }

    fn print_json(&mut self, summary: &Summary) -> Result<(), ReportError> {
        let report = JsonReport::new(summary);
        serde_json::to_writer_pretty(&mut self.w, &report)?;
        writeln!(self.w)?;
        Ok(())
    }

    fn print_text(&mut self, summary: &Summary) -> Result<(), ReportError> {
        if let Some(stats) = Statistics::compute(summary) {
            writeln!(self.w, "Summary:")?;
            writeln!(self.w, "  Total:\t{:4.4} secs", summary.total().as_secs_f64())?;
            writeln!(self.w, "  Slowest:\t{:4.4} secs", stats.slowest)?;
            writeln!(self.w, "  Fastest:\t{:4.4} secs", stats.fastest)?;
            writeln!(self.w, "  Average:\t{:4.4} secs", summary.average())?;
            writeln!(self.w, "  Requests/sec:\t{:4.4}", summary.requests_per_sec())?;
            if summary.size_total() > 0 {
                writeln!(self.w, "  Total data:\t{} bytes", summary.size_total())?;
                writeln!(self.w, "  Size/request:\t{} bytes", summary.size_per_request())?;
            }

            self.print_histogram(&stats.histogram)?;
            self.print_latencies(&stats.percentiles)?;

            write!(self.w, "\nDetails (Average, Fastest, Slowest):")?;
            for phase in Phase::ALL {
                self.print_section(&PhaseStats::from_summary(summary, phase))?;
            }
            self.print_status_codes(summary.status_codes())?;
        }

        if !summary.errors().is_empty() {
            self.print_errors(summary.errors())?;
        }
        writeln!(self.w)?;
        Ok(())
    }

    fn print_histogram(&mut self, histogram: &Histogram) -> Result<(), ReportError> {
        writeln!(self.w, "\nResponse time histogram:")?;
        for bucket in &histogram.buckets {
            let bar: String = std::iter::repeat(defaults::BAR_CHAR)
                .take(histogram.bar_len(bucket.count))
                .collect();
            writeln!(
                self.w,
                "  {:4.3} [{}]\t|{}",
                bucket.edge, bucket.count, bar
            )?;
        }
        Ok(())
    }

    /// Percentile lines; targets that were never assigned are skipped.
    fn print_latencies(&mut self, percentiles: &[PercentileValue]) -> Result<(), ReportError> {
        writeln!(self.w, "\nLatency distribution:")?;
        for p in percentiles {
            if let Some(secs) = p.secs {
                writeln!(self.w, "  {}% in {:4.4} secs", p.percentile, secs)?;
            }
        }
        Ok(())
    }

    fn print_section(&mut self, stats: &PhaseStats) -> Result<(), ReportError> {
        write!(self.w, "\n  {}:\t", stats.phase.label())?;
        write!(
            self.w,
            " {:4.4} secs, {:4.4} secs, {:4.4} secs",
            stats.mean, stats.fastest, stats.slowest
        )?;
        Ok(())
    }

    fn print_status_codes(&mut self, codes: &BTreeMap<u16, usize>) -> Result<(), ReportError> {
        write!(self.w, "\n\nStatus code distribution:\n")?;
        for (code, count) in codes {
            writeln!(self.w, "  [{}]\t{} responses", code, count)?;
        }
        Ok(())
    }

    fn print_errors(&mut self, errors: &BTreeMap<String, usize>) -> Result<(), ReportError> {
        writeln!(self.w, "\nError distribution:")?;
        for (message, count) in errors {
            writeln!(self.w, "  [{}]\t{}", count, message)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::Aggregator;
    use crate::results::{RequestResult, RequestTiming};
    use std::time::Duration;

    fn render(summary: &Summary, mode: OutputMode) -> String {
        let mut reporter = Reporter::new(Vec::new(), mode);
        reporter.print(summary).unwrap();
        String::from_utf8(reporter.into_inner()).unwrap()
    }

    fn timing(ms: u64, status: u16) -> RequestTiming {
        RequestTiming::new(Duration::from_millis(ms), status, 100)
            .with_phase(Phase::Connect, Duration::from_millis(ms / 10))
            .with_phase(Phase::Dns, Duration::from_millis(ms / 20))
            .with_phase(Phase::ResponseWait, Duration::from_millis(ms / 2))
    }

    fn mixed_summary() -> Summary {
        let mut agg = Aggregator::new(Duration::from_secs(2));
        for ms in [300, 100, 200, 400] {
            agg.consume(RequestResult::success(timing(ms, 200)));
        }
        agg.consume(RequestResult::success(timing(500, 503)));
        agg.consume(RequestResult::failure(anyhow::anyhow!("connection reset")));
        agg.finish()
    }

    fn failures_only() -> Summary {
        let mut agg = Aggregator::new(Duration::from_secs(1));
        agg.consume(RequestResult::failure(anyhow::anyhow!("timeout")));
        agg.consume(RequestResult::failure(anyhow::anyhow!("timeout")));
        agg.consume(RequestResult::failure(anyhow::anyhow!("refused")));
        agg.finish()
    }

    #[test]
    fn test_output_mode_from_name() {
        assert_eq!(OutputMode::from_name("csv"), OutputMode::Csv);
        assert_eq!(OutputMode::from_name("CSV"), OutputMode::Csv);
        assert_eq!(OutputMode::from_name("json"), OutputMode::Json);
        assert_eq!(OutputMode::from_name(""), OutputMode::Text);
        assert_eq!(OutputMode::from_name("yaml"), OutputMode::Text);
    }

    #[test]
    fn test_csv_rows_in_arrival_order() {
        let out = render(&mixed_summary(), OutputMode::Csv);
        let lines: Vec<&str> = out.lines().collect();

        assert_eq!(
            lines[0],
            "response-time,DNS+dialup,DNS,Request-write,Response-delay,Response-read"
        );
        assert_eq!(lines.len(), 1 + 5);
        assert_eq!(lines[1], "0.3000,0.0300,0.0150,0.0000,0.1500,0.0000");
        assert_eq!(lines[2], "0.1000,0.0100,0.0050,0.0000,0.0500,0.0000");
        assert!(!out.contains("connection reset"));
    }

    #[test]
    fn test_csv_header_without_successes() {
        let out = render(&failures_only(), OutputMode::Csv);
        assert_eq!(out.lines().count(), 1);
        assert!(out.starts_with("response-time,"));
    }

    #[test]
    fn test_text_summary_sections() {
        let out = render(&mixed_summary(), OutputMode::Text);

        assert!(out.starts_with("Summary:\n  Total:\t2.0000 secs\n"));
        assert!(out.contains("  Slowest:\t0.5000 secs\n"));
        assert!(out.contains("  Fastest:\t0.1000 secs\n"));
        assert!(out.contains("  Average:\t0.3000 secs\n"));
        assert!(out.contains("  Requests/sec:\t2.5000\n"));
        assert!(out.contains("  Total data:\t500 bytes\n"));
        assert!(out.contains("  Size/request:\t100 bytes\n"));
        assert!(out.contains("\nResponse time histogram:\n"));
        assert!(out.contains("  0.100 [1]\t|"));
        // five samples have ranks 0, 20, 40, 60, 80
        assert!(out.contains("\nLatency distribution:\n  10% in 0.2000 secs\n"));
        assert!(out.contains("  25% in 0.3000 secs\n"));
        assert!(out.contains("  50% in 0.4000 secs\n"));
        assert!(out.contains("  75% in 0.5000 secs\n"));
        assert!(!out.contains("90% in"));
        assert!(!out.contains("99% in"));
        assert!(out.contains("\n  DNS+dialup:\t 0.0300 secs, 0.0100 secs, 0.0500 secs"));
        assert!(out.contains("\n  resp read:\t 0.0000 secs, 0.0000 secs, 0.0000 secs"));
        assert!(out.contains("\n\nStatus code distribution:\n  [200]\t4 responses\n  [503]\t1 responses\n"));
        assert!(out.contains("\nError distribution:\n  [1]\tconnection reset\n"));

        let order = [
            "Summary:",
            "Response time histogram:",
            "Latency distribution:",
            "Details (Average, Fastest, Slowest):",
            "DNS+dialup",
            "DNS-lookup",
            "req write",
            "resp wait",
            "resp read",
            "Status code distribution:",
            "Error distribution:",
        ];
        let positions: Vec<usize> = order.iter().map(|s| out.find(s).unwrap()).collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_text_histogram_bars() {
        let out = render(&mixed_summary(), OutputMode::Text);
        let full_bar: String = std::iter::repeat(defaults::BAR_CHAR).take(40).collect();
        // every bucket holds at most one sample, so each non-empty bar is full
        assert_eq!(out.matches(full_bar.as_str()).count(), 5);
    }

    #[test]
    fn test_text_all_failures_prints_only_errors() {
        let out = render(&failures_only(), OutputMode::Text);

        assert_eq!(
            out,
            "\nError distribution:\n  [1]\trefused\n  [2]\ttimeout\n\n"
        );
        assert!(!out.contains("NaN"));
        assert!(!out.contains("inf"));
    }

    #[test]
    fn test_text_prints_zero_latency_percentiles() {
        let mut agg = Aggregator::new(Duration::from_secs(1));
        for ms in [0, 0, 0, 7] {
            agg.consume(RequestResult::success(RequestTiming::new(
                Duration::from_millis(ms),
                200,
                0,
            )));
        }
        let out = render(&agg.finish(), OutputMode::Text);

        assert!(out.contains("\nLatency distribution:\n  10% in 0.0000 secs\n  25% in 0.0000 secs\n  50% in 0.0070 secs\n\nDetails"));
    }

    #[test]
    fn test_text_single_success_has_empty_latency_block() {
        let mut agg = Aggregator::new(Duration::from_secs(1));
        agg.consume(RequestResult::success(RequestTiming::new(
            Duration::from_millis(40),
            200,
            0,
        )));
        let out = render(&agg.finish(), OutputMode::Text);

        assert!(out.contains("\nLatency distribution:\n\nDetails"));
    }

    #[test]
    fn test_text_without_bytes_skips_size_lines() {
        let mut agg = Aggregator::new(Duration::from_secs(1));
        agg.consume(RequestResult::success(RequestTiming::new(
            Duration::from_millis(10),
            204,
            -1,
        )));
        let out = render(&agg.finish(), OutputMode::Text);

        assert!(!out.contains("Total data"));
        assert!(!out.contains("Error distribution"));
        assert!(out.contains("  [204]\t1 responses\n"));
    }

    #[test]
    fn test_json_report() {
        let out = render(&mixed_summary(), OutputMode::Json);
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();

        assert_eq!(value["successes"], 5);
        assert_eq!(value["failures"], 1);
        assert_eq!(value["requests_per_sec"], 2.5);
        assert_eq!(value["slowest_secs"], 0.5);
        assert_eq!(value["status_codes"]["200"], 4);
        assert_eq!(value["errors"]["connection reset"], 1);
        assert_eq!(value["phases"].as_array().unwrap().len(), 5);
        assert_eq!(value["histogram"]["buckets"].as_array().unwrap().len(), 11);
    }

    #[test]
    fn test_json_report_without_successes() {
        let report = JsonReport::new(&failures_only());

        assert_eq!(report.successes, 0);
        assert_eq!(report.failures, 3);
        assert_eq!(report.requests_per_sec, 0.0);
        assert!(report.fastest_secs.is_none());
        assert!(report.histogram.is_none());
        assert!(report.percentiles.is_empty());
        assert!(report.phases.is_empty());
    }
}
