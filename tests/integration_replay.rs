use anyhow::Result;
use hey_report::{defaults, replay, Aggregator, OutputMode, Reporter};
use std::io::Write;
use std::process::Command;
use std::time::Duration;
use tempfile::NamedTempFile;
use tokio::sync::mpsc;

const CAPTURE: &[&str] = &[
    r#"{"duration":0.120,"conn":0.010,"dns":0.004,"req":0.001,"delay":0.100,"res":0.005,"status_code":200,"content_length":2048}"#,
    r#"{"duration":0.080,"conn":0.000,"dns":0.000,"req":0.001,"delay":0.075,"res":0.004,"status_code":200,"content_length":2048}"#,
    r#"{"error":"Get \"http://127.0.0.1:8080\": context deadline exceeded"}"#,
    r#"{"duration":0.200,"conn":0.020,"dns":0.008,"req":0.002,"delay":0.160,"res":0.018,"status_code":502,"content_length":0}"#,
];

fn write_capture() -> Result<NamedTempFile> {
    let mut file = NamedTempFile::new()?;
    for line in CAPTURE {
        writeln!(file, "{}", line)?;
    }
    file.flush()?;
    Ok(file)
}

/// Replaying a capture file through the library produces the same numbers
/// that were recorded.
#[tokio::test]
async fn replay_capture_file() -> Result<()> {
    let capture = write_capture()?;

    let reader = replay::open(capture.path()).await?;
    let (tx, rx) = mpsc::channel(defaults::CHANNEL_CAPACITY);
    let producer = tokio::spawn(replay::replay(reader, tx));

    let summary = Aggregator::new(Duration::from_secs(2)).drain(rx).await;
    assert_eq!(producer.await??, 4);

    assert_eq!(summary.success_count(), 3);
    assert_eq!(summary.error_count(), 1);
    assert_eq!(summary.size_total(), 4096);
    assert_eq!(summary.size_per_request(), 1365);

    let mut reporter = Reporter::new(Vec::new(), OutputMode::Text);
    reporter.print(&summary)?;
    let text = String::from_utf8(reporter.into_inner())?;

    assert!(text.contains("  Slowest:\t0.2000 secs\n"));
    assert!(text.contains("  Fastest:\t0.0800 secs\n"));
    assert!(text.contains("  Requests/sec:\t1.5000\n"));
    assert!(text.contains("  Size/request:\t1365 bytes\n"));
    assert!(text.contains("  [502]\t1 responses\n"));
    assert!(text.contains("context deadline exceeded"));
    Ok(())
}

#[tokio::test]
async fn missing_capture_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = replay::open(&dir.path().join("absent.jsonl")).await;
    assert!(result.is_err());
}

/// End-to-end run of the binary writing CSV to a file.
#[test]
fn binary_writes_csv_report() -> Result<()> {
    let capture = write_capture()?;
    let out = NamedTempFile::new()?;

    let status = Command::new(env!("CARGO_BIN_EXE_hey-report"))
        .arg("--input")
        .arg(capture.path())
        .args(["--total", "2s", "--output", "csv", "--output-file"])
        .arg(out.path())
        .env("RUST_LOG", "off")
        .status()?;
    assert!(status.success());

    let csv = std::fs::read_to_string(out.path())?;
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[1], "0.1200,0.0100,0.0040,0.0010,0.1000,0.0050");
    assert_eq!(lines[3], "0.2000,0.0200,0.0080,0.0020,0.1600,0.0180");
    Ok(())
}

#[test]
fn binary_rejects_malformed_capture() -> Result<()> {
    let mut capture = NamedTempFile::new()?;
    writeln!(capture, "{}", CAPTURE[0])?;
    writeln!(capture, "{{\"duration\": \"slow\"}}")?;
    capture.flush()?;

    let output = Command::new(env!("CARGO_BIN_EXE_hey-report"))
        .arg("-i")
        .arg(capture.path())
        .args(["-t", "1s"])
        .output()?;

    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("line 2"), "stderr was: {}", stderr);
    Ok(())
}
