//! Operator relay: ask the human what the assistant answered

use async_trait::async_trait;
use colored::Colorize;
use eyre::Result;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::debug;

use super::{Observation, StatusOracle, extract_status_reply};

/// Prompt shown to the operator after each status probe
pub const OPERATOR_PROMPT: &str = "What did Claude respond? (yes/no/q to quit): ";

/// Degraded mode used when the assistant's output cannot be captured
#[derive(Debug, Default)]
pub struct OperatorOracle;

impl OperatorOracle {
    pub fn new() -> Self {
        Self
    }
}

/// Map a line typed by the operator to an observation
pub fn interpret_operator_answer(line: &str) -> Observation {
    let answer = line.trim();
    debug!(%answer, "interpret_operator_answer: called");
    if answer.eq_ignore_ascii_case("q") {
        return Observation::Quit;
    }
    Observation::Status(extract_status_reply(answer))
}

#[async_trait]
impl StatusOracle for OperatorOracle {
    async fn observe(&mut self) -> Result<Observation> {
        debug!("OperatorOracle::observe: called");
        // Line editing blocks, keep it off the control thread's timers
        let line = tokio::task::spawn_blocking(|| -> Result<Option<String>> {
            let mut rl = DefaultEditor::new().map_err(|e| eyre::eyre!("Failed to initialize readline: {}", e))?;
            println!();
            match rl.readline(&OPERATOR_PROMPT.bright_cyan().to_string()) {
                Ok(line) => Ok(Some(line)),
                // Ctrl+C / Ctrl+D at the prompt mean quit
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => Ok(None),
                Err(err) => Err(eyre::eyre!("Readline error: {}", err)),
            }
        })
        .await??;

        match line {
            Some(line) => Ok(interpret_operator_answer(&line)),
            None => {
                debug!("OperatorOracle::observe: prompt interrupted");
                Ok(Observation::Quit)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reply::StatusReply;

    #[test]
    fn test_interpret_operator_answer() {
        assert_eq!(interpret_operator_answer("q"), Observation::Quit);
        assert_eq!(interpret_operator_answer(" Q \n"), Observation::Quit);
        assert_eq!(
            interpret_operator_answer("YES"),
            Observation::Status(StatusReply::HasMoreWork)
        );
        assert_eq!(
            interpret_operator_answer("no"),
            Observation::Status(StatusReply::NoMoreWork)
        );
        assert_eq!(
            interpret_operator_answer("not sure"),
            Observation::Status(StatusReply::Unrecognized)
        );
    }
}
