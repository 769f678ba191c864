use crate::report::OutputMode;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// hey-report - Summarise recorded HTTP load-test results
#[derive(Parser, Debug, Clone)]
#[clap(version, about, long_about = None)]
pub struct Args {
    /// JSON-lines capture of per-request results ("-" reads stdin)
    #[clap(short = 'i', long, default_value = crate::defaults::STDIN_PATH)]
    pub input: PathBuf,

    /// Wall-clock duration of the load-test run (e.g. "10s", "1.5m", "250ms")
    #[clap(short = 't', long, value_parser = parse_duration)]
    pub total: Duration,

    /// Output format: "csv", "json", anything else prints the text summary
    #[clap(short = 'o', long)]
    pub output: Option<String>,

    /// Write the report to this file instead of stdout
    #[clap(long)]
    pub output_file: Option<PathBuf>,

    /// Verbose output
    #[clap(short = 'v', long, default_value_t = false)]
    pub verbose: bool,
}

impl Args {
    /// Output mode selected by `--output`, text when unset or unknown.
    pub fn output_mode(&self) -> OutputMode {
        self.output
            .as_deref()
            .map_or(OutputMode::Text, OutputMode::from_name)
    }
}

/// Parse duration from string (e.g., "10s", "1.5m", "250ms", "1h")
pub fn parse_duration(s: &str) -> Result<Duration, String> {
    let s = s.trim();

    if s.is_empty() {
        return Err("Duration cannot be empty".to_string());
    }

    let (num_str, scale) = if let Some(stripped) = s.strip_suffix("ms") {
        (stripped, 0.001)
    } else if let Some(stripped) = s.strip_suffix('s') {
        (stripped, 1.0)
    } else if let Some(stripped) = s.strip_suffix('m') {
        (stripped, 60.0)
    } else if let Some(stripped) = s.strip_suffix('h') {
        (stripped, 3600.0)
    } else {
        (s, 1.0) // Default to seconds
    };

    let num: f64 = num_str
        .trim()
        .parse()
        .map_err(|_| format!("Invalid number in duration: {}", num_str))?;

    Duration::try_from_secs_f64(num * scale).map_err(|_| format!("Invalid duration: {}", s))
}
