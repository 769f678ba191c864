//! # Capture Replay
//!
//! Acts as the producer side of the result stream for recorded runs. A
//! capture is a JSON-lines file with one [`RecordedResult`] per line; each
//! decoded line is sent into the aggregator's channel, and the sender is
//! dropped at end of input, which closes the stream.
//!
//! Blank lines are skipped. The first malformed line stops the replay with
//! a line-numbered [`ReplayError`].

use crate::defaults;
use crate::error::ReplayError;
use crate::results::{RecordedResult, RequestResult};
use std::path::Path;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Boxed line source for a capture.
pub type CaptureReader = Box<dyn AsyncBufRead + Unpin + Send>;

/// Open a capture file, or stdin when `path` is `-`.
pub async fn open(path: &Path) -> Result<CaptureReader, ReplayError> {
    if path.as_os_str() == defaults::STDIN_PATH {
        debug!("Reading results from stdin");
        return Ok(Box::new(BufReader::new(tokio::io::stdin())));
    }

    debug!("Reading results from {:?}", path);
    let file = tokio::fs::File::open(path).await?;
    Ok(Box::new(BufReader::new(file)))
}

/// Decode one capture line. Returns `Ok(None)` for blank lines.
pub fn decode_line(line: &str, line_no: usize) -> Result<Option<RequestResult>, ReplayError> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let record: RecordedResult = serde_json::from_str(trimmed)
        .map_err(|source| ReplayError::InvalidRecord { line: line_no, source })?;
    record.into_result(line_no).map(Some)
}

/// Send every record from `reader` into `tx`, then drop `tx`.
///
/// Returns the number of results sent. Stops early without error if the
/// receiving side has gone away.
pub async fn replay<R>(reader: R, tx: mpsc::Sender<RequestResult>) -> Result<usize, ReplayError>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut line_no = 0;
    let mut sent = 0;

    while let Some(line) = lines.next_line().await? {
        line_no += 1;
        let Some(result) = decode_line(&line, line_no)? else {
            continue;
        };
        if tx.send(result).await.is_err() {
            warn!("Result stream closed by consumer after {} records", sent);
            break;
        }
        sent += 1;
    }

    debug!("Replayed {} results from {} lines", sent, line_no);
    Ok(sent)
}
