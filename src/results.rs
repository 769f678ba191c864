//! # Per-Request Results
//!
//! Types describing the outcome of a single HTTP request as produced by the
//! request-issuing layer. Every issued request yields exactly one
//! [`RequestResult`]; successful requests carry a [`RequestTiming`] with the
//! total duration and the breakdown into connection phases.
//!
//! The module also contains [`RecordedResult`], the serialised form used when
//! results are written to or replayed from a JSON-lines capture.

use crate::error::ReplayError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Connection phases tracked for every successful request.
///
/// The declaration order is the order used in CSV columns and in the
/// per-phase details block of the text summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// DNS lookup plus TCP dial
    Connect,
    /// DNS lookup only
    Dns,
    /// Writing the request to the connection
    RequestWrite,
    /// Waiting for the first response byte
    ResponseWait,
    /// Reading the response body
    ResponseRead,
}

impl Phase {
    /// All phases in reporting order.
    pub const ALL: [Phase; 5] = [
        Phase::Connect,
        Phase::Dns,
        Phase::RequestWrite,
        Phase::ResponseWait,
        Phase::ResponseRead,
    ];

    /// Position of this phase in [`Phase::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }

    /// Label used in the details block of the text summary.
    pub fn label(self) -> &'static str {
        match self {
            Phase::Connect => "DNS+dialup",
            Phase::Dns => "DNS-lookup",
            Phase::RequestWrite => "req write",
            Phase::ResponseWait => "resp wait",
            Phase::ResponseRead => "resp read",
        }
    }

    /// Column header used by the CSV dump.
    pub fn csv_header(self) -> &'static str {
        match self {
            Phase::Connect => "DNS+dialup",
            Phase::Dns => "DNS",
            Phase::RequestWrite => "Request-write",
            Phase::ResponseWait => "Response-delay",
            Phase::ResponseRead => "Response-read",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Timing breakdown of a request that received a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestTiming {
    /// Wall time from request start to end of response read
    pub duration: Duration,
    /// Per-phase durations, indexed by [`Phase::index`]
    pub phases: [Duration; 5],
    pub status_code: u16,
    /// Response content length; negative when the server did not report one
    pub content_length: i64,
}

impl RequestTiming {
    /// Create a timing with all phase durations set to zero.
    pub fn new(duration: Duration, status_code: u16, content_length: i64) -> Self {
        Self {
            duration,
            phases: [Duration::ZERO; 5],
            status_code,
            content_length,
        }
    }

    /// Builder-style setter for a single phase duration.
    pub fn with_phase(mut self, phase: Phase, duration: Duration) -> Self {
        self.phases[phase.index()] = duration;
        self
    }

    pub fn phase(&self, phase: Phase) -> Duration {
        self.phases[phase.index()]
    }
}

/// Outcome of one issued request.
///
/// Failures keep the error opaque: the reporting stage only ever looks at
/// its display string.
#[derive(Debug)]
pub enum RequestResult {
    Success(RequestTiming),
    Failure(anyhow::Error),
}

impl RequestResult {
    pub fn success(timing: RequestTiming) -> Self {
        RequestResult::Success(timing)
    }

    pub fn failure<E>(error: E) -> Self
    where
        E: Into<anyhow::Error>,
    {
        RequestResult::Failure(error.into())
    }

    pub fn is_success(&self) -> bool {
        matches!(self, RequestResult::Success(_))
    }
}

/// JSON-lines representation of a [`RequestResult`].
///
/// Durations are stored as seconds. A record with `error` set is a failure
/// and its timing fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordedResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default)]
    pub duration: f64,
    #[serde(default)]
    pub conn: f64,
    #[serde(default)]
    pub dns: f64,
    #[serde(default)]
    pub req: f64,
    #[serde(default)]
    pub delay: f64,
    #[serde(default)]
    pub res: f64,
    #[serde(default)]
    pub status_code: u16,
    #[serde(default)]
    pub content_length: i64,
}

impl RecordedResult {
    /// Convert a decoded record into a [`RequestResult`].
    ///
    /// `line` is only used to label errors.
    pub fn into_result(self, line: usize) -> Result<RequestResult, ReplayError> {
        if let Some(message) = self.error {
            return Ok(RequestResult::failure(anyhow::Error::msg(message)));
        }

        let secs = |field: &'static str, value: f64| {
            Duration::try_from_secs_f64(value).map_err(|_| ReplayError::InvalidDuration {
                line,
                field,
                value,
            })
        };

        let timing = RequestTiming::new(
            secs("duration", self.duration)?,
            self.status_code,
            self.content_length,
        )
        .with_phase(Phase::Connect, secs("conn", self.conn)?)
        .with_phase(Phase::Dns, secs("dns", self.dns)?)
        .with_phase(Phase::RequestWrite, secs("req", self.req)?)
        .with_phase(Phase::ResponseWait, secs("delay", self.delay)?)
        .with_phase(Phase::ResponseRead, secs("res", self.res)?);

        Ok(RequestResult::success(timing))
    }
}
