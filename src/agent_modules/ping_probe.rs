//! Reachability checks through the operating system's `ping` utility.
//!
//! The utility is run once per probe with a single echo request and its text
//! output is scraped for the round-trip time. Every way the invocation can go
//! wrong collapses to [`ProbeOutcome::Unreachable`]; the cause is only logged.
use async_trait::async_trait;
use std::process::Stdio;
use thiserror::Error;
use tokio::process::Command as TokioCommand;
use tracing::{debug, warn};

use crate::agent_modules::encoding::{decode_output, DecodeError};
use crate::db::enums::PingStatus;

/// Latency recorded when no round-trip time is available.
pub const NO_LATENCY: f64 = -1.0;

const LATENCY_MARKER: &str = "time=";

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProbeOutcome {
    /// The utility exited successfully. `latency_ms` is [`NO_LATENCY`] when
    /// its output carried no parseable round-trip time.
    Reachable { latency_ms: f64 },
    Unreachable,
}

impl ProbeOutcome {
    pub fn status(&self) -> PingStatus {
        match self {
            ProbeOutcome::Reachable { .. } => PingStatus::Up,
            ProbeOutcome::Unreachable => PingStatus::Down,
        }
    }

    pub fn latency_ms(&self) -> f64 {
        match self {
            ProbeOutcome::Reachable { latency_ms } => *latency_ms,
            ProbeOutcome::Unreachable => NO_LATENCY,
        }
    }
}

#[derive(Error, Debug)]
pub enum ProbeFailure {
    #[error("failed to spawn probe utility: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("probe utility exited with {0}")]
    NonZeroExit(std::process::ExitStatus),
    #[error("could not decode probe output: {0}")]
    Decode(#[from] DecodeError),
    #[error("probe output is cut off after `time=`")]
    TruncatedOutput,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum LatencyParseError {
    #[error("no line contains `time=`")]
    MissingMarker,
    #[error("nothing follows `time=`")]
    MissingToken,
    #[error("`{0}` is not a number")]
    InvalidNumber(String),
}

#[async_trait]
pub trait Prober: Send + Sync {
    async fn probe(&self, target: &str) -> ProbeOutcome;
}

/// Count flag selecting a single echo request.
pub fn count_flag() -> &'static str {
    if cfg!(windows) {
        "-n"
    } else {
        "-c"
    }
}

/// Finds the round-trip time on the first line mentioning `time=`.
///
/// Only the leading numeric part of the token is read, so both `time=23.4 ms`
/// and `time=17ms` are understood.
pub fn extract_latency(output: &str) -> Result<f64, LatencyParseError> {
    let line = output
        .lines()
        .find(|line| line.contains(LATENCY_MARKER))
        .ok_or(LatencyParseError::MissingMarker)?;

    let after_marker = line
        .split(LATENCY_MARKER)
        .nth(1)
        .ok_or(LatencyParseError::MissingToken)?;
    let token = after_marker
        .split_whitespace()
        .next()
        .ok_or(LatencyParseError::MissingToken)?;

    let numeric_len = token
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(token.len());
    token[..numeric_len]
        .parse::<f64>()
        .map_err(|_| LatencyParseError::InvalidNumber(token.to_string()))
}

/// Latency in milliseconds, or [`NO_LATENCY`] if none can be found.
pub fn parse_latency(output: &str) -> f64 {
    extract_latency(output).unwrap_or(NO_LATENCY)
}

/// Runs `<binary> -c 1 <target>` (`-n` on Windows).
pub struct SystemPingProber {
    binary: String,
}

impl Default for SystemPingProber {
    fn default() -> Self {
        Self::new("ping")
    }
}

impl SystemPingProber {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    fn command(&self, target: &str) -> TokioCommand {
        let mut cmd = TokioCommand::new(&self.binary);
        cmd.args([count_flag(), "1", target]);
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::null());
        cmd.kill_on_drop(true);
        cmd
    }

    async fn run_once(&self, target: &str) -> Result<String, ProbeFailure> {
        let output = self.command(target).output().await?;
        if !output.status.success() {
            return Err(ProbeFailure::NonZeroExit(output.status));
        }
        Ok(decode_output(&output.stdout)?)
    }
}

#[async_trait]
impl Prober for SystemPingProber {
    async fn probe(&self, target: &str) -> ProbeOutcome {
        let text = match self.run_once(target).await {
            Ok(text) => text,
            Err(e) => {
                warn!(target = %target, binary = %self.binary, error = %e, "Probe failed, target marked DOWN.");
                return ProbeOutcome::Unreachable;
            }
        };

        let latency_ms = match extract_latency(&text) {
            Ok(ms) => ms,
            // Marker with no value: the probe counts as failed.
            Err(LatencyParseError::MissingToken) => {
                let e = ProbeFailure::TruncatedOutput;
                warn!(target = %target, binary = %self.binary, error = %e, "Probe failed, target marked DOWN.");
                return ProbeOutcome::Unreachable;
            }
            Err(e) => {
                warn!(target = %target, error = %e, "Probe succeeded but latency could not be parsed.");
                NO_LATENCY
            }
        };
        debug!(target = %target, latency_ms, "Probe succeeded.");
        ProbeOutcome::Reachable { latency_ms }
    }
}
