//! ClaudeQueue - unattended task feeder
//!
//! CLI entry point: loads config, sets up logging and runs the feeding loop.

use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use clap::Parser;
use colored::Colorize;
use eyre::{Context, Result, eyre};
use tracing::{debug, info, warn};
use tracing_subscriber::fmt::{self, time::ChronoLocal};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use claudequeue::cli::Cli;
use claudequeue::config::{Config, ReplySourceKind};
use claudequeue::shutdown::{self, ShutdownTrigger};
use claudequeue::{
    CaptureOracle, FeederLoop, FeederSettings, InputInjector, OperatorOracle, QuotaBackoff, StatusOracle, StopReason,
    TaskBatch, TmuxCapture,
};

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn setup_logging(log_path: &Path, log_level: Option<&str>) -> Result<()> {
    // Note: Can't log params here since logging isn't initialized yet
    let level = match log_level.map(|s| s.to_uppercase()).as_deref() {
        Some("TRACE") => tracing::Level::TRACE,
        Some("DEBUG") => tracing::Level::DEBUG,
        Some("INFO") | None => tracing::Level::INFO,
        Some("WARN") | Some("WARNING") => tracing::Level::WARN,
        Some("ERROR") => tracing::Level::ERROR,
        Some(other) => {
            eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", other);
            tracing::Level::INFO
        }
    };

    if let Some(dir) = log_path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).context("Failed to create log directory")?;
    }
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
        .context(format!("Failed to open log file {}", log_path.display()))?;

    let file_layer = fmt::layer()
        .with_writer(Mutex::new(log_file))
        .with_ansi(false)
        .with_target(false)
        .with_timer(ChronoLocal::new(TIME_FORMAT.to_string()));
    let console_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(false)
        .with_timer(ChronoLocal::new(TIME_FORMAT.to_string()));

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .with(file_layer)
        .with(console_layer)
        .init();

    debug!(?level, log_path = %log_path.display(), "Logging initialized");
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to build runtime")?;
    let result = runtime.block_on(run(cli));

    // A pending operator prompt lives on a blocking thread and must not hold the process open
    runtime.shutdown_background();
    result
}

async fn run(cli: Cli) -> Result<()> {
    let repo = cli.repo()?;
    let mut config = Config::load(cli.config.as_ref(), &repo).context("Failed to load configuration")?;
    cli.apply_overrides(&mut config);

    setup_logging(&config.log_path(&repo), config.log_level.as_deref()).context("Failed to setup logging")?;
    debug!(repo = %repo.display(), ?config, "run: config loaded");

    let queue_path = config.queue_path(&repo);

    if cli.dry_run {
        debug!("run: dry run");
        return cmd_dry_run(&queue_path);
    }

    println!("{}", "Claude Queue".bold().cyan());
    println!("Queue file: {}", queue_path.display());

    let reason = cmd_feed(&config, &queue_path).await?;

    println!("{}", "Shutting down...".yellow());
    info!("Claude Queue stopped: {}", reason);
    Ok(())
}

/// Print the rendered batch without touching the assistant
fn cmd_dry_run(queue_path: &Path) -> Result<()> {
    debug!(queue_path = %queue_path.display(), "cmd_dry_run: called");
    match TaskBatch::load(queue_path) {
        Ok(batch) => {
            info!("Loaded {} tasks (dry run, nothing will be sent)", batch.len());
            println!("{}", batch.render());
        }
        Err(e) => warn!("{}", e),
    }
    Ok(())
}

/// Run the feeding loop until it stops
async fn cmd_feed(config: &Config, queue_path: &Path) -> Result<StopReason> {
    debug!(queue_path = %queue_path.display(), "cmd_feed: called");
    let injector = InputInjector::from_config(&config.injection).context("Failed to set up input injection")?;
    let oracle = build_oracle(config)?;
    let backoff = QuotaBackoff::new(Duration::from_secs(config.quota.poll_slice_secs));

    let (trigger, listener) = shutdown::channel();
    spawn_signal_listener(trigger);

    let mut feeder =
        FeederLoop::new(FeederSettings::from_config(config), injector, oracle, backoff).with_shutdown(listener);
    feeder.run(queue_path).await
}

fn build_oracle(config: &Config) -> Result<Box<dyn StatusOracle>> {
    debug!(source = ?config.reply.source, "build_oracle: called");
    match config.reply.source {
        ReplySourceKind::Operator => Ok(Box::new(OperatorOracle::new())),
        ReplySourceKind::Tmux => {
            let target = config
                .injection
                .tmux
                .target
                .clone()
                .ok_or_else(|| eyre!("Reply source 'tmux' needs a target (--tmux-target or injection.tmux.target)"))?;
            info!("Reading Claude's replies from tmux pane {}", target);
            Ok(Box::new(CaptureOracle::new(TmuxCapture::new(
                target,
                config.reply.capture_lines,
            ))))
        }
    }
}

fn spawn_signal_listener(trigger: ShutdownTrigger) {
    debug!("spawn_signal_listener: called");
    tokio::spawn(async move {
        match wait_for_signal().await {
            Ok(()) => {
                debug!("spawn_signal_listener: signal received");
                trigger.trigger();
            }
            Err(e) => warn!("Failed to listen for interrupt signals: {}", e),
        }
    });
}

#[cfg(unix)]
async fn wait_for_signal() -> Result<()> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    tokio::select! {
        _ = sigint.recv() => debug!("wait_for_signal: SIGINT"),
        _ = sigterm.recv() => debug!("wait_for_signal: SIGTERM"),
    }
    Ok(())
}

#[cfg(not(unix))]
async fn wait_for_signal() -> Result<()> {
    tokio::signal::ctrl_c().await?;
    Ok(())
}
