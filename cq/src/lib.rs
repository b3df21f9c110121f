//! ClaudeQueue - unattended task feeder for an interactive coding assistant
//!
//! Drives a coding-assistant terminal session that has no programmatic API.
//! A batch of tasks is injected into the assistant's input as if typed by a
//! human, then the session is polled on a fixed interval: the assistant is
//! asked whether work remains and is told to `continue` until it reports
//! that it is done, the operator quits, or a quota wait is in progress.
//!
//! # Core Concepts
//!
//! - **Black-box assistant**: the only channels are text injection and
//!   (optionally) reply capture, both behind traits
//! - **Lenient parsing**: free-form replies are classified by [`reply::parser`],
//!   with logged fallbacks instead of errors
//! - **Never stop silently**: an unrecognized status reply means "keep going"
//! - **Single control thread**: every wait is a timer on one thread, so
//!   injected input is strictly serialized
//!
//! # Modules
//!
//! - [`queue`] - Task list loading and batch rendering
//! - [`inject`] - Input injection strategies and the fallback injector
//! - [`reply`] - Reply parsing and status oracles (operator or capture)
//! - [`backoff`] - Quota wait with bounded polling slices
//! - [`feeder`] - The feeding loop state machine
//! - [`config`] - Configuration types and loading
//! - [`cli`] - Command-line interface

pub mod backoff;
pub mod cli;
pub mod config;
pub mod feeder;
pub mod inject;
pub mod queue;
pub mod reply;
pub mod shutdown;

// Re-export commonly used types
pub use backoff::{QuotaBackoff, SystemClock, TokioClock, WallClock};
pub use config::Config;
pub use feeder::{CONTINUE_PROMPT, FeederLoop, FeederSettings, Phase, STATUS_PROBE, StopReason};
pub use inject::{InjectError, InjectStrategy, InputInjector};
pub use queue::{QueueError, Task, TaskBatch};
pub use reply::{
    CaptureOracle, Observation, OperatorOracle, QuotaWait, ReplyCapture, StatusOracle, StatusReply, TmuxCapture,
    WaitSource,
};
pub use shutdown::{Shutdown, ShutdownTrigger};
