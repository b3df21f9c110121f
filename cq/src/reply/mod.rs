//! Reply handling
//!
//! Parses the assistant's free-form replies and supplies answers to the
//! status probe, either from the operator or from captured output.

mod capture;
mod operator;
pub mod oracle;
pub mod parser;

pub use capture::{CaptureError, CaptureOracle, ReplyCapture, TmuxCapture, classify_capture};
pub use operator::{OPERATOR_PROMPT, OperatorOracle, interpret_operator_answer};
pub use oracle::{Observation, StatusOracle};
pub use parser::{
    DEFAULT_QUOTA_WAIT_SECS, QuotaWait, StatusReply, WaitSource, extract_status_reply, extract_wait_seconds,
    is_quota_exhausted,
};
