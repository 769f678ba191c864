//! # hey-report - Main Entry Point
//!
//! Replays a JSON-lines capture of per-request results through the
//! aggregation and reporting pipeline:
//!
//! 1. **Initialize logging**: diagnostics go to stderr via tracing
//! 2. **Parse arguments**: input capture, run duration, output mode
//! 3. **Start the producer**: a task decodes the capture into the result channel
//! 4. **Aggregate**: drain the channel until the producer closes it
//! 5. **Report**: render the summary to stdout or the output file
//!
//! A malformed capture line aborts the run before anything is printed.

use anyhow::{Context, Result};
use clap::Parser;
use hey_report::{
    aggregator::Aggregator,
    cli::Args,
    defaults, logging, replay,
    report::Reporter,
    utils::{format_bytes, format_elapsed},
};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use tokio::sync::mpsc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    logging::init(args.verbose);

    let mode = args.output_mode();
    info!(
        "Summarising {:?} over {} as {}",
        args.input,
        format_elapsed(args.total),
        mode
    );

    let reader = replay::open(&args.input)
        .await
        .with_context(|| format!("failed to open {:?}", args.input))?;

    let (tx, rx) = mpsc::channel(defaults::CHANNEL_CAPACITY);
    let producer = tokio::spawn(replay::replay(reader, tx));

    let summary = Aggregator::new(args.total).drain(rx).await;
    producer
        .await
        .context("replay task panicked")?
        .with_context(|| format!("failed to replay {:?}", args.input))?;

    info!(
        "{} responses, {} received",
        summary.success_count(),
        format_bytes(summary.size_total())
    );

    let sink: Box<dyn Write> = match &args.output_file {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("failed to create {:?}", path))?,
        )),
        None => Box::new(io::stdout().lock()),
    };

    Reporter::new(sink, mode)
        .print(&summary)
        .context("failed to write report")?;

    Ok(())
}
