//! tmux-based injection
//!
//! Pastes into a tmux pane with `set-buffer` + `paste-buffer -p` (bracketed
//! paste), waits for the TUI to ingest the paste, then sends Enter.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use super::{InjectError, InjectStrategy};

/// Buffer name used for pasted payloads
const PASTE_BUFFER: &str = "claude-queue";

/// Paste into a tmux pane, then submit
pub struct TmuxPaste {
    target: String,
    submit_delay: Duration,
}

impl TmuxPaste {
    pub fn new(target: String, submit_delay: Duration) -> Self {
        debug!(%target, ?submit_delay, "TmuxPaste::new: called");
        Self { target, submit_delay }
    }

    async fn tmux(&self, args: &[&str]) -> Result<(), InjectError> {
        debug!(?args, "TmuxPaste::tmux: called");
        let status = Command::new("tmux")
            .args(args)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map_err(|source| InjectError::Spawn {
                program: "tmux".to_string(),
                source,
            })?;

        if !status.success() {
            return Err(InjectError::Exit {
                program: format!("tmux {}", args.first().copied().unwrap_or_default()),
                status,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl InjectStrategy for TmuxPaste {
    fn name(&self) -> &'static str {
        "tmux"
    }

    async fn inject(&self, text: &str) -> Result<(), InjectError> {
        debug!(target = %self.target, text_len = text.len(), "TmuxPaste::inject: called");
        self.tmux(&["set-buffer", "-b", PASTE_BUFFER, "--", text]).await?;
        self.tmux(&["paste-buffer", "-b", PASTE_BUFFER, "-t", &self.target, "-p"])
            .await?;

        // Enter sent too early is swallowed while the paste is still being ingested
        tokio::time::sleep(self.submit_delay).await;

        self.tmux(&["send-keys", "-t", &self.target, "Enter"]).await
    }
}
