//! CLI definition and config overrides

use std::path::PathBuf;

use clap::Parser;
use tracing::debug;

use crate::config::{Config, ReplySourceKind};

/// ClaudeQueue - unattended task feeder for Claude Code
#[derive(Debug, Parser)]
#[command(
    name = "cq",
    about = "Feed a task queue to a Claude Code session and keep it working",
    version
)]
pub struct Cli {
    /// Repository holding the queue file; defaults to the current directory
    #[arg(value_name = "REPO_PATH")]
    pub repo_path: Option<PathBuf>,

    /// Path to config file
    #[arg(short, long, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(
        short = 'l',
        long = "log-level",
        help = "Log level (TRACE, DEBUG, INFO, WARN, ERROR)"
    )]
    pub log_level: Option<String>,

    /// Where status replies come from
    #[arg(long = "reply-source", value_enum)]
    pub reply_source: Option<ReplySourceKind>,

    /// tmux pane for injection and capture (e.g. `claude:0.0`)
    #[arg(long = "tmux-target", value_name = "TARGET")]
    pub tmux_target: Option<String>,

    /// Seconds between status checks
    #[arg(long = "check-interval", value_name = "SECS")]
    pub check_interval: Option<u64>,

    /// Print the initial message and exit without injecting anything
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

impl Cli {
    /// Repository path, falling back to the current directory
    pub fn repo(&self) -> eyre::Result<PathBuf> {
        match &self.repo_path {
            Some(path) => Ok(path.clone()),
            None => Ok(std::env::current_dir()?),
        }
    }

    /// Apply command-line values on top of a loaded config
    pub fn apply_overrides(&self, config: &mut Config) {
        debug!(reply_source = ?self.reply_source, tmux_target = ?self.tmux_target, check_interval = ?self.check_interval, "Cli::apply_overrides: called");
        if let Some(level) = &self.log_level {
            config.log_level = Some(level.clone());
        }
        if let Some(source) = self.reply_source {
            config.reply.source = source;
        }
        if let Some(target) = &self.tmux_target {
            config.injection.tmux.target = Some(target.clone());
        }
        if let Some(secs) = self.check_interval {
            config.feeder.check_interval_secs = secs;
        }
    }
}
