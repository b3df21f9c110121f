//! Feeding loop
//!
//! Sends the task batch once, then cycles through status probes and
//! `continue` prompts until the assistant reports it is done.

mod engine;
mod state;

pub use engine::{FeederLoop, FeederSettings};
pub use state::{Phase, StopReason};

/// Status probe injected on every check
pub const STATUS_PROBE: &str =
    "Do you have any remaining tasks in your queue? Please respond with only 'yes' or 'no'.";

/// Prompt that keeps the assistant working
pub const CONTINUE_PROMPT: &str = "continue";
