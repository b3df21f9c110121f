//! Injection error types

use std::io;
use std::process::ExitStatus;
use thiserror::Error;

/// Errors raised by a single injection strategy
#[derive(Debug, Error)]
pub enum InjectError {
    #[error("Failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("{program} exited with {status}")]
    Exit { program: String, status: ExitStatus },

    #[error("Failed to write text to {program}: {source}")]
    Stdin {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("Strategy {0} is not configured")]
    NotConfigured(&'static str),
}

impl InjectError {
    /// Whether the helper program is missing from the system
    pub fn is_missing_program(&self) -> bool {
        matches!(self, InjectError::Spawn { source, .. } if source.kind() == io::ErrorKind::NotFound)
    }
}
