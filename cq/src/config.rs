//! ClaudeQueue configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Project-local config file name, looked up in the repo directory
pub const LOCAL_CONFIG_FILE: &str = ".claude-queue.yml";

/// Main ClaudeQueue configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Queue file, relative to the repo path
    #[serde(rename = "queue-file")]
    pub queue_file: PathBuf,

    /// Log file, relative to the repo path
    #[serde(rename = "log-file")]
    pub log_file: PathBuf,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[serde(rename = "log-level")]
    pub log_level: Option<String>,

    /// Feeding loop timing
    pub feeder: FeederConfig,

    /// Quota wait handling
    pub quota: QuotaConfig,

    /// Input injection strategies
    pub injection: InjectionConfig,

    /// Where status replies come from
    pub reply: ReplyConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            queue_file: PathBuf::from("queue.md"),
            log_file: PathBuf::from("claude_queue.log"),
            log_level: None,
            feeder: FeederConfig::default(),
            quota: QuotaConfig::default(),
            injection: InjectionConfig::default(),
            reply: ReplyConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration with fallback chain
    ///
    /// Explicit path, then `<repo>/.claude-queue.yml`, then
    /// `~/.config/claudequeue/claudequeue.yml`, then defaults.
    pub fn load(config_path: Option<&PathBuf>, repo: &Path) -> Result<Self> {
        // If explicit config path provided, it must load
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        let local_config = repo.join(LOCAL_CONFIG_FILE);
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("claudequeue").join("claudequeue.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        tracing::debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::debug!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    /// Queue file resolved against the repo path
    pub fn queue_path(&self, repo: &Path) -> PathBuf {
        repo.join(&self.queue_file)
    }

    /// Log file resolved against the repo path
    pub fn log_path(&self, repo: &Path) -> PathBuf {
        repo.join(&self.log_file)
    }
}

/// Feeding loop timing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeederConfig {
    /// Seconds between status checks
    #[serde(rename = "check-interval-secs")]
    pub check_interval_secs: u64,

    /// Seconds to wait after an unexpected loop fault
    #[serde(rename = "fault-cooldown-secs")]
    pub fault_cooldown_secs: u64,
}

impl Default for FeederConfig {
    fn default() -> Self {
        Self {
            check_interval_secs: 900,
            fault_cooldown_secs: 60,
        }
    }
}

/// Quota wait handling
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QuotaConfig {
    /// Wait used when no duration can be parsed from the reply
    #[serde(rename = "fallback-wait-secs")]
    pub fallback_wait_secs: u64,

    /// Longest single sleep while waiting for a quota reset (max 60)
    #[serde(rename = "poll-slice-secs")]
    pub poll_slice_secs: u64,
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self {
            fallback_wait_secs: 3 * 3600,
            poll_slice_secs: 60,
        }
    }
}

/// Available injection strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    /// Write the clipboard, then press the paste and submit keys
    Clipboard,
    /// Type the text with a keystroke helper program
    Keystroke,
    /// Paste into a tmux pane
    Tmux,
    /// No strategy (only valid as a fallback)
    None,
}

/// Input injection strategies and their commands
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InjectionConfig {
    /// Strategy tried first
    pub primary: StrategyKind,

    /// Strategy tried once when the primary fails
    pub fallback: StrategyKind,

    /// One-time grace delay before the first delivery
    #[serde(rename = "focus-delay-secs")]
    pub focus_delay_secs: u64,

    pub clipboard: ClipboardConfig,

    pub keystroke: KeystrokeConfig,

    pub tmux: TmuxConfig,
}

impl Default for InjectionConfig {
    fn default() -> Self {
        Self {
            primary: StrategyKind::Clipboard,
            fallback: StrategyKind::Keystroke,
            focus_delay_secs: 5,
            clipboard: ClipboardConfig::default(),
            keystroke: KeystrokeConfig::default(),
            tmux: TmuxConfig::default(),
        }
    }
}

/// Clipboard + paste keystroke commands
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClipboardConfig {
    /// Command that reads the text on stdin and stores it in the clipboard
    #[serde(rename = "copy-command")]
    pub copy_command: Vec<String>,

    /// Commands run in order to paste and submit
    #[serde(rename = "paste-commands")]
    pub paste_commands: Vec<Vec<String>>,
}

impl Default for ClipboardConfig {
    fn default() -> Self {
        if cfg!(target_os = "macos") {
            Self {
                copy_command: argv(&["pbcopy"]),
                paste_commands: vec![argv(&[
                    "osascript",
                    "-e",
                    "tell application \"System Events\"\n\
                     key code 9 using command down\n\
                     delay 0.1\n\
                     key code 36\n\
                     end tell",
                ])],
            }
        } else {
            Self {
                copy_command: argv(&["xclip", "-selection", "clipboard"]),
                paste_commands: vec![argv(&["xdotool", "key", "--clearmodifiers", "ctrl+shift+v", "Return"])],
            }
        }
    }
}

/// Keystroke helper commands; `{text}` is replaced by the payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KeystrokeConfig {
    pub commands: Vec<Vec<String>>,
}

impl Default for KeystrokeConfig {
    fn default() -> Self {
        let commands = if cfg!(target_os = "macos") {
            vec![argv(&["cliclick", "t:{text}"]), argv(&["cliclick", "kp:return"])]
        } else {
            vec![
                argv(&["xdotool", "type", "--delay", "1", "--", "{text}"]),
                argv(&["xdotool", "key", "Return"]),
            ]
        };
        Self { commands }
    }
}

/// tmux pane used for injection and reply capture
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TmuxConfig {
    /// Target pane (`session`, `session:window.pane`, ...)
    pub target: Option<String>,

    /// Pause between pasting and pressing Enter
    #[serde(rename = "submit-delay-ms")]
    pub submit_delay_ms: u64,
}

impl Default for TmuxConfig {
    fn default() -> Self {
        Self {
            target: None,
            submit_delay_ms: 1000,
        }
    }
}

/// Where status replies come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ReplySourceKind {
    /// Ask the operator what the assistant said
    Operator,
    /// Read the assistant's pane with `tmux capture-pane`
    Tmux,
}

/// Reply collection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplyConfig {
    pub source: ReplySourceKind,

    /// Seconds to give the assistant before collecting its reply
    #[serde(rename = "wait-secs")]
    pub wait_secs: u64,

    /// Scrollback lines captured from the pane
    #[serde(rename = "capture-lines")]
    pub capture_lines: u32,
}

impl Default for ReplyConfig {
    fn default() -> Self {
        Self {
            source: ReplySourceKind::Operator,
            wait_secs: 5,
            capture_lines: 200,
        }
    }
}

fn argv(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|p| p.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.queue_file, PathBuf::from("queue.md"));
        assert_eq!(config.log_file, PathBuf::from("claude_queue.log"));
        assert_eq!(config.feeder.check_interval_secs, 900);
        assert_eq!(config.feeder.fault_cooldown_secs, 60);
        assert_eq!(config.quota.fallback_wait_secs, 10800);
        assert_eq!(config.quota.poll_slice_secs, 60);
        assert_eq!(config.injection.primary, StrategyKind::Clipboard);
        assert_eq!(config.injection.fallback, StrategyKind::Keystroke);
        assert_eq!(config.injection.focus_delay_secs, 5);
        assert_eq!(config.reply.source, ReplySourceKind::Operator);
        assert_eq!(config.reply.wait_secs, 5);
    }

    #[test]
    fn test_deserialize_config() {
        let yaml = r#"
queue-file: tasks.txt
log-level: debug

feeder:
  check-interval-secs: 600
  fault-cooldown-secs: 30

quota:
  fallback-wait-secs: 7200

injection:
  primary: tmux
  fallback: none
  focus-delay-secs: 0
  tmux:
    target: claude:0.0

reply:
  source: tmux
  capture-lines: 80
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.queue_file, PathBuf::from("tasks.txt"));
        assert_eq!(config.log_level.as_deref(), Some("debug"));
        assert_eq!(config.feeder.check_interval_secs, 600);
        assert_eq!(config.quota.fallback_wait_secs, 7200);
        assert_eq!(config.injection.primary, StrategyKind::Tmux);
        assert_eq!(config.injection.fallback, StrategyKind::None);
        assert_eq!(config.injection.tmux.target.as_deref(), Some("claude:0.0"));
        assert_eq!(config.reply.source, ReplySourceKind::Tmux);
        assert_eq!(config.reply.capture_lines, 80);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let yaml = r#"
feeder:
  check-interval-secs: 60
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.feeder.check_interval_secs, 60);
        assert_eq!(config.feeder.fault_cooldown_secs, 60);
        assert_eq!(config.quota.poll_slice_secs, 60);
        assert_eq!(config.injection.tmux.submit_delay_ms, 1000);
    }

    #[test]
    fn test_load_prefers_repo_local_config() {
        let temp = tempdir().unwrap();
        fs::write(
            temp.path().join(LOCAL_CONFIG_FILE),
            "queue-file: backlog.md\nfeeder:\n  check-interval-secs: 120\n",
        )
        .unwrap();

        let config = Config::load(None, temp.path()).unwrap();

        assert_eq!(config.queue_path(temp.path()), temp.path().join("backlog.md"));
        assert_eq!(config.feeder.check_interval_secs, 120);
    }

    #[test]
    fn test_load_explicit_path_errors_are_fatal() {
        let temp = tempdir().unwrap();
        let missing = temp.path().join("nope.yml");

        assert!(Config::load(Some(&missing), temp.path()).is_err());
    }
}
