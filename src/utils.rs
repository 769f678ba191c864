//! # Formatting Helpers
//!
//! Human-readable renderings of the run time and byte counts used in
//! diagnostic log lines. The report itself uses fixed-precision seconds and
//! raw byte counts; these helpers are only for the operator-facing log.

use std::time::Duration;

/// Format a run's wall-clock time for the startup log line.
///
/// Sub-second runs are shown in whole milliseconds, runs under a minute in
/// seconds with two decimals, anything longer as minutes and seconds.
///
/// ```rust
/// # use hey_report::utils::format_elapsed;
/// # use std::time::Duration;
/// assert_eq!(format_elapsed(Duration::from_millis(250)), "250ms");
/// assert_eq!(format_elapsed(Duration::from_secs(90)), "1m 30s");
/// ```
pub fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    if secs == 0 {
        format!("{}ms", elapsed.as_millis())
    } else if secs < 60 {
        format!("{:.2}s", elapsed.as_secs_f64())
    } else {
        format!("{}m {}s", secs / 60, secs % 60)
    }
}

/// Format a byte count with binary (1024-based) units.
///
/// Negative counts, which stand for "unknown", are shown as `n/a`.
pub fn format_bytes(bytes: i64) -> String {
    if bytes < 0 {
        return "n/a".to_string();
    }

    const UNITS: [&str; 4] = ["KB", "MB", "GB", "TB"];
    if bytes < 1024 {
        return format!("{} B", bytes);
    }

    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.2} {}", value, UNITS[unit])
}
