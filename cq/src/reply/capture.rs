//! Automated reply capture
//!
//! Reads what the assistant printed after the last status probe and turns
//! it into an [`Observation`]. Only tmux panes are supported as a capture
//! source; quota exhaustion can only be detected in this mode.

use std::io;
use std::process::{ExitStatus, Stdio};

use async_trait::async_trait;
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, info, warn};

use super::{Observation, StatusOracle, StatusReply, extract_status_reply, is_quota_exhausted};
use crate::feeder::STATUS_PROBE;

/// Glyphs the assistant UI puts in front of its reply lines
const REPLY_BULLETS: &[char] = &['⏺', '●', '•', '>', '›', '-', '*'];

/// Errors raised while capturing the assistant's output
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("Failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("{program} exited with {status}: {stderr}")]
    Exit {
        program: String,
        status: ExitStatus,
        stderr: String,
    },
}

/// Raw text capture of the assistant's recent output
#[async_trait]
pub trait ReplyCapture: Send + Sync {
    async fn capture_reply(&self) -> Result<String, CaptureError>;
}

/// Capture the scrollback of a tmux pane
pub struct TmuxCapture {
    target: String,
    lines: u32,
}

impl TmuxCapture {
    pub fn new(target: String, lines: u32) -> Self {
        debug!(%target, lines, "TmuxCapture::new: called");
        Self { target, lines }
    }
}

#[async_trait]
impl ReplyCapture for TmuxCapture {
    async fn capture_reply(&self) -> Result<String, CaptureError> {
        debug!(target = %self.target, lines = self.lines, "TmuxCapture::capture_reply: called");
        let start = format!("-{}", self.lines);
        let output = Command::new("tmux")
            .args(["capture-pane", "-p", "-J", "-t", &self.target, "-S", &start])
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|source| CaptureError::Spawn {
                program: "tmux capture-pane".to_string(),
                source,
            })?;

        if !output.status.success() {
            return Err(CaptureError::Exit {
                program: "tmux capture-pane".to_string(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Oracle that reads the assistant's answer from a capture source
pub struct CaptureOracle<C> {
    capture: C,
}

impl<C: ReplyCapture> CaptureOracle<C> {
    pub fn new(capture: C) -> Self {
        Self { capture }
    }
}

#[async_trait]
impl<C: ReplyCapture> StatusOracle for CaptureOracle<C> {
    async fn observe(&mut self) -> eyre::Result<Observation> {
        debug!("CaptureOracle::observe: called");
        let captured = self.capture.capture_reply().await?;
        let observation = classify_capture(&captured);
        match &observation {
            Observation::QuotaExhausted { message } => warn!("Claude reports quota exhaustion: {}", message),
            Observation::Status(reply) => info!("Captured reply classified as {:?}", reply),
            Observation::Quit => {}
        }
        Ok(observation)
    }
}

/// Text printed after the last status probe, or everything if none is visible
fn after_last_probe(captured: &str) -> &str {
    let marker = STATUS_PROBE.split_once('?').map(|(question, _)| question).unwrap_or(STATUS_PROBE);
    match captured.rfind(marker) {
        Some(pos) => &captured[pos + marker.len()..],
        None => {
            debug!("after_last_probe: probe not visible in capture");
            captured
        }
    }
}

/// Classify captured pane text
///
/// Quota language wins over any yes/no found in the same reply; otherwise
/// the first line that reads as a bare yes or no decides.
pub fn classify_capture(captured: &str) -> Observation {
    let tail = after_last_probe(captured);
    debug!(tail_len = tail.len(), "classify_capture: called");

    if is_quota_exhausted(tail) {
        return Observation::QuotaExhausted {
            message: tail.trim().to_string(),
        };
    }

    for line in tail.lines() {
        let candidate = line.trim().trim_start_matches(REPLY_BULLETS).trim();
        if candidate.is_empty() {
            continue;
        }
        match extract_status_reply(candidate) {
            StatusReply::Unrecognized => continue,
            reply => return Observation::Status(reply),
        }
    }

    warn!("No yes/no answer found in captured output");
    Observation::Status(StatusReply::Unrecognized)
}
