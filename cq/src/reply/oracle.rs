//! StatusOracle trait definition

use async_trait::async_trait;

use super::StatusReply;

/// What the loop learned after a status probe
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Observation {
    /// The assistant answered the probe
    Status(StatusReply),

    /// The assistant reported quota exhaustion; carries the message text
    QuotaExhausted { message: String },

    /// The operator asked to stop
    Quit,
}

/// Source of the assistant's answer to the status probe
///
/// Implemented by a human relay ([`super::OperatorOracle`]) and by an
/// automated capture ([`super::CaptureOracle`]); the feeding loop treats
/// them identically.
#[async_trait]
pub trait StatusOracle: Send {
    /// Collect the answer to the most recent status probe
    async fn observe(&mut self) -> eyre::Result<Observation>;
}
