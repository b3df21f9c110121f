//! FeederLoop - drives the assistant through the task batch

use std::path::Path;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use super::{CONTINUE_PROMPT, Phase, STATUS_PROBE, StopReason};
use crate::backoff::QuotaBackoff;
use crate::config::Config;
use crate::inject::InputInjector;
use crate::queue::TaskBatch;
use crate::reply::{DEFAULT_QUOTA_WAIT_SECS, Observation, StatusOracle, StatusReply, extract_wait_seconds};
use crate::shutdown::Shutdown;

/// Timing knobs of the feeding loop
#[derive(Debug, Clone)]
pub struct FeederSettings {
    /// Pause before every status probe
    pub check_interval: Duration,

    /// Pause between a status probe and collecting the answer
    pub reply_wait: Duration,

    /// Pause after an unexpected fault inside the loop
    pub fault_cooldown: Duration,

    /// Quota wait used when the message carries no duration
    pub fallback_wait_secs: u64,
}

impl Default for FeederSettings {
    fn default() -> Self {
        Self {
            check_interval: Duration::from_secs(900),
            reply_wait: Duration::from_secs(5),
            fault_cooldown: Duration::from_secs(60),
            fallback_wait_secs: DEFAULT_QUOTA_WAIT_SECS,
        }
    }
}

impl FeederSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            check_interval: Duration::from_secs(config.feeder.check_interval_secs),
            reply_wait: Duration::from_secs(config.reply.wait_secs),
            fault_cooldown: Duration::from_secs(config.feeder.fault_cooldown_secs),
            fallback_wait_secs: config.quota.fallback_wait_secs,
        }
    }
}

/// The feeding loop state machine
///
/// All injections happen on the caller's task, one at a time: a prompt is
/// never sent while the previous one's answer is still being collected.
pub struct FeederLoop {
    settings: FeederSettings,
    injector: InputInjector,
    oracle: Box<dyn StatusOracle>,
    backoff: QuotaBackoff,
    shutdown: Shutdown,
    phase: Phase,
}

impl FeederLoop {
    pub fn new(
        settings: FeederSettings,
        injector: InputInjector,
        oracle: Box<dyn StatusOracle>,
        backoff: QuotaBackoff,
    ) -> Self {
        debug!(?settings, "FeederLoop::new: called");
        Self {
            settings,
            injector,
            oracle,
            backoff,
            shutdown: Shutdown::never(),
            phase: Phase::Sending,
        }
    }

    /// Stop the run when the operator interrupts
    pub fn with_shutdown(mut self, shutdown: Shutdown) -> Self {
        debug!("FeederLoop::with_shutdown: called");
        self.shutdown = shutdown;
        self
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    /// Load the queue and drive the assistant until the run stops
    pub async fn run(&mut self, queue_path: &Path) -> eyre::Result<StopReason> {
        debug!(?queue_path, "FeederLoop::run: called");
        info!("Starting Claude Queue...");

        let batch = match TaskBatch::load(queue_path) {
            Ok(batch) => batch,
            Err(e) => {
                error!("{}", e);
                self.phase = Phase::Stopped(StopReason::QueueUnavailable);
                return Ok(StopReason::QueueUnavailable);
            }
        };
        info!("Loaded {} tasks from {}", batch.len(), queue_path.display());

        self.phase = Phase::Sending;
        let mut shutdown = self.shutdown.clone();

        loop {
            if let Phase::Stopped(reason) = self.phase {
                debug!(%reason, "FeederLoop::run: stopped");
                return Ok(reason);
            }

            let phase = self.phase.clone();
            let outcome = tokio::select! {
                biased;
                _ = shutdown.requested() => None,
                outcome = self.step(&phase, &batch) => Some(outcome),
            };

            match outcome {
                None => self.interrupt(),
                Some(Ok(next)) => {
                    if next != phase {
                        debug!(from = ?phase, to = ?next, "FeederLoop::run: transition");
                    }
                    self.phase = next;
                }
                Some(Err(e)) => {
                    error!("Error in main loop: {:#}", e);
                    info!("Retrying in {} ...", describe(self.settings.fault_cooldown));
                    tokio::select! {
                        biased;
                        _ = shutdown.requested() => self.interrupt(),
                        _ = tokio::time::sleep(self.settings.fault_cooldown) => {
                            debug!(?phase, "FeederLoop::run: cooldown finished, staying in phase");
                        }
                    }
                }
            }
        }
    }

    fn interrupt(&mut self) {
        debug!(phase = ?self.phase, "FeederLoop::interrupt: called");
        info!("Interrupted by user");
        self.phase = Phase::Stopped(StopReason::Interrupted);
    }

    async fn step(&mut self, phase: &Phase, batch: &TaskBatch) -> eyre::Result<Phase> {
        debug!(?phase, "FeederLoop::step: called");
        match phase {
            Phase::Sending => Ok(self.send_batch(batch).await),
            Phase::Polling => self.poll().await,
            Phase::AwaitingQuota { wait } => {
                self.backoff.wait_until(wait.seconds).await;
                Ok(Phase::Polling)
            }
            Phase::Stopped(reason) => Ok(Phase::Stopped(*reason)),
        }
    }

    async fn send_batch(&mut self, batch: &TaskBatch) -> Phase {
        debug!(task_count = batch.len(), "FeederLoop::send_batch: called");
        if !self.injector.deliver(&batch.render()).await {
            error!("Failed to send initial queue to Claude");
            return Phase::Stopped(StopReason::InitialDeliveryFailed);
        }
        info!(
            "Queue sent to Claude. Starting {} check loop...",
            describe(self.settings.check_interval)
        );
        Phase::Polling
    }

    async fn poll(&mut self) -> eyre::Result<Phase> {
        debug!("FeederLoop::poll: called");
        info!("Waiting {} before next check...", describe(self.settings.check_interval));
        tokio::time::sleep(self.settings.check_interval).await;

        info!("Checking if Claude has remaining tasks...");
        if !self.injector.deliver(STATUS_PROBE).await {
            warn!("Failed to send status check to Claude");
            return Ok(Phase::Polling);
        }

        // Give the assistant a moment to answer
        tokio::time::sleep(self.settings.reply_wait).await;

        match self.oracle.observe().await? {
            Observation::Quit => {
                info!("Exiting Claude Queue");
                Ok(Phase::Stopped(StopReason::OperatorQuit))
            }
            Observation::Status(StatusReply::NoMoreWork) => {
                info!("Claude reports no remaining tasks. Shutting down.");
                Ok(Phase::Stopped(StopReason::NoMoreWork))
            }
            Observation::Status(StatusReply::HasMoreWork) => {
                info!("Claude has remaining tasks. Sending continue command...");
                Ok(self.send_continue().await)
            }
            Observation::Status(StatusReply::Unrecognized) => {
                warn!("Invalid response. Assuming tasks remain and continuing...");
                Ok(self.send_continue().await)
            }
            Observation::QuotaExhausted { message } => {
                let wait = extract_wait_seconds(&message, self.settings.fallback_wait_secs);
                info!("Quota exhausted, pausing for {} seconds ({:?})", wait.seconds, wait.source);
                Ok(Phase::AwaitingQuota { wait })
            }
        }
    }

    async fn send_continue(&mut self) -> Phase {
        debug!("FeederLoop::send_continue: called");
        if !self.injector.deliver(CONTINUE_PROMPT).await {
            error!("Failed to send continue command");
            return Phase::Stopped(StopReason::ContinueDeliveryFailed);
        }
        info!("Sent 'continue' command to Claude");
        Phase::Polling
    }
}

/// Human-readable interval for log lines
fn describe(interval: Duration) -> String {
    let secs = interval.as_secs();
    match secs {
        60 => "1-minute".to_string(),
        s if s > 0 && s % 60 == 0 => format!("{}-minute", s / 60),
        s => format!("{}-second", s),
    }
}
