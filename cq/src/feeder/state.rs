//! Run state of the feeding loop

use std::fmt;

use crate::reply::QuotaWait;

/// Current phase of a run; never persisted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    /// Initial batch not yet delivered
    Sending,
    /// Periodic status checks
    Polling,
    /// Waiting for the assistant's quota to reset
    AwaitingQuota { wait: QuotaWait },
    /// Terminal
    Stopped(StopReason),
}

impl Phase {
    pub fn is_stopped(&self) -> bool {
        matches!(self, Phase::Stopped(_))
    }
}

/// Why a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Queue file missing, unreadable or empty
    QueueUnavailable,
    /// The initial batch could not be delivered
    InitialDeliveryFailed,
    /// A `continue` prompt could not be delivered
    ContinueDeliveryFailed,
    /// The assistant reported no remaining work
    NoMoreWork,
    /// The operator typed quit at the prompt
    OperatorQuit,
    /// Interrupt signal
    Interrupted,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            StopReason::QueueUnavailable => "queue unavailable",
            StopReason::InitialDeliveryFailed => "failed to send initial queue",
            StopReason::ContinueDeliveryFailed => "failed to send continue command",
            StopReason::NoMoreWork => "no remaining tasks",
            StopReason::OperatorQuit => "operator quit",
            StopReason::Interrupted => "interrupted by user",
        };
        f.write_str(text)
    }
}
