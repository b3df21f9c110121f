//! Integration tests for the feeding loop
//!
//! Drive a full run through the public API with a recording strategy and
//! scripted replies, in paused time.

use std::collections::VecDeque;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use claudequeue::{
    CONTINUE_PROMPT, FeederLoop, FeederSettings, InjectError, InjectStrategy, InputInjector, Observation, QuotaBackoff,
    STATUS_PROBE, StatusOracle, StatusReply, StopReason, TokioClock, shutdown,
};
use tempfile::TempDir;
use tokio::time::Instant;

// =============================================================================
// Test collaborators
// =============================================================================

type SentLog = Arc<Mutex<Vec<String>>>;

struct RecordingStrategy {
    name: &'static str,
    fails: bool,
    sent: SentLog,
}

impl RecordingStrategy {
    fn new(name: &'static str, fails: bool) -> (Self, SentLog) {
        let sent = SentLog::default();
        (
            Self {
                name,
                fails,
                sent: Arc::clone(&sent),
            },
            sent,
        )
    }
}

#[async_trait]
impl InjectStrategy for RecordingStrategy {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn inject(&self, text: &str) -> Result<(), InjectError> {
        self.sent.lock().unwrap().push(text.to_string());
        if self.fails {
            return Err(InjectError::Spawn {
                program: self.name.to_string(),
                source: io::Error::new(io::ErrorKind::NotFound, "not installed"),
            });
        }
        Ok(())
    }
}

struct ReplayOracle {
    replies: VecDeque<Observation>,
}

impl ReplayOracle {
    fn new(replies: Vec<Observation>) -> Self {
        Self { replies: replies.into() }
    }
}

#[async_trait]
impl StatusOracle for ReplayOracle {
    async fn observe(&mut self) -> eyre::Result<Observation> {
        Ok(self.replies.pop_front().unwrap_or(Observation::Quit))
    }
}

fn yes() -> Observation {
    Observation::Status(StatusReply::HasMoreWork)
}

fn no() -> Observation {
    Observation::Status(StatusReply::NoMoreWork)
}

fn write_queue(content: &str) -> (TempDir, PathBuf) {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let path = temp.path().join("queue.md");
    fs::write(&path, content).expect("Failed to write queue");
    (temp, path)
}

fn feeder_with(primary: RecordingStrategy, fallback: Option<RecordingStrategy>, replies: Vec<Observation>) -> FeederLoop {
    let fallback = fallback.map(|f| Box::new(f) as Box<dyn InjectStrategy>);
    let injector = InputInjector::new(Box::new(primary), fallback, Duration::from_secs(5));
    FeederLoop::new(
        FeederSettings::default(),
        injector,
        Box::new(ReplayOracle::new(replies)),
        QuotaBackoff::default().with_clock(Arc::new(TokioClock::new())),
    )
}

fn sent(log: &SentLog) -> Vec<String> {
    log.lock().unwrap().clone()
}

// =============================================================================
// Full runs
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_three_task_queue_runs_to_completion() {
    let (_temp, path) = write_queue("fix login bug\nadd tests\nupdate docs\n");
    let (primary, log) = RecordingStrategy::new("primary", false);
    let mut feeder = feeder_with(primary, None, vec![yes(), yes(), no()]);
    let start = Instant::now();

    let reason = feeder.run(&path).await.unwrap();

    assert_eq!(reason, StopReason::NoMoreWork);
    assert_eq!(
        sent(&log),
        vec![
            "Process these tasks one by one: 1. fix login bug; 2. add tests; 3. update docs",
            STATUS_PROBE,
            CONTINUE_PROMPT,
            STATUS_PROBE,
            CONTINUE_PROMPT,
            STATUS_PROBE,
        ]
    );
    // One focus delay, three check intervals, three reply waits
    assert!(start.elapsed() >= Duration::from_secs(5 + 3 * 900 + 3 * 5));
}

#[tokio::test(start_paused = true)]
async fn test_fallback_carries_the_run_when_primary_is_missing() {
    let (_temp, path) = write_queue("only task\n");
    let (primary, primary_log) = RecordingStrategy::new("primary", true);
    let (fallback, fallback_log) = RecordingStrategy::new("fallback", false);
    let mut feeder = feeder_with(primary, Some(fallback), vec![no()]);

    assert_eq!(feeder.run(&path).await.unwrap(), StopReason::NoMoreWork);

    let expected = vec!["Process these tasks one by one: 1. only task".to_string(), STATUS_PROBE.to_string()];
    assert_eq!(sent(&primary_log), expected);
    assert_eq!(sent(&fallback_log), expected);
}

#[tokio::test(start_paused = true)]
async fn test_both_strategies_failing_aborts_before_polling() {
    let (_temp, path) = write_queue("only task\n");
    let (primary, primary_log) = RecordingStrategy::new("primary", true);
    let (fallback, fallback_log) = RecordingStrategy::new("fallback", true);
    let mut feeder = feeder_with(primary, Some(fallback), vec![yes()]);

    assert_eq!(feeder.run(&path).await.unwrap(), StopReason::InitialDeliveryFailed);
    assert_eq!(sent(&primary_log).len(), 1);
    assert_eq!(sent(&fallback_log).len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_quota_exhaustion_pauses_then_resumes_polling() {
    let (_temp, path) = write_queue("task\n");
    let (primary, log) = RecordingStrategy::new("primary", false);
    let quota = Observation::QuotaExhausted {
        message: "You've hit your usage limit. Try again in 30 minutes.".to_string(),
    };
    let mut feeder = feeder_with(primary, None, vec![quota, no()]);
    let start = Instant::now();

    assert_eq!(feeder.run(&path).await.unwrap(), StopReason::NoMoreWork);

    assert!(start.elapsed() >= Duration::from_secs(5 + 2 * 900 + 2 * 5 + 1800));
    // No continue while the quota is exhausted
    assert_eq!(sent(&log).iter().filter(|s| *s == CONTINUE_PROMPT).count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_missing_queue_never_injects() {
    let temp = TempDir::new().unwrap();
    let (primary, log) = RecordingStrategy::new("primary", false);
    let mut feeder = feeder_with(primary, None, vec![yes()]);

    let reason = feeder.run(&temp.path().join("queue.md")).await.unwrap();

    assert_eq!(reason, StopReason::QueueUnavailable);
    assert!(sent(&log).is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_before_first_delivery_sends_nothing() {
    let (_temp, path) = write_queue("task\n");
    let (primary, log) = RecordingStrategy::new("primary", false);
    let (trigger, listener) = shutdown::channel();
    let mut feeder = feeder_with(primary, None, vec![yes()]).with_shutdown(listener);

    // Fires inside the five-second focus delay
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(1)).await;
        trigger.trigger();
    });

    assert_eq!(feeder.run(&path).await.unwrap(), StopReason::Interrupted);
    assert!(sent(&log).is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_stops_the_run() {
    let (_temp, path) = write_queue("task\n");
    let (primary, log) = RecordingStrategy::new("primary", false);
    let (trigger, listener) = shutdown::channel();
    let mut feeder = feeder_with(primary, None, vec![yes(), yes()]).with_shutdown(listener);

    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(60)).await;
        trigger.trigger();
    });

    assert_eq!(feeder.run(&path).await.unwrap(), StopReason::Interrupted);
    assert!(feeder.phase().is_stopped());
    assert_eq!(sent(&log).len(), 1);
}
