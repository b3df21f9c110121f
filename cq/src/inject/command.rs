//! Strategies backed by external helper programs

use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use super::{InjectError, InjectStrategy};

/// Placeholder replaced by the payload in keystroke helper arguments
pub const TEXT_PLACEHOLDER: &str = "{text}";

/// Copy the text to the clipboard, then send paste + submit keystrokes
pub struct ClipboardPaste {
    copy_command: Vec<String>,
    paste_commands: Vec<Vec<String>>,
}

impl ClipboardPaste {
    pub fn new(copy_command: Vec<String>, paste_commands: Vec<Vec<String>>) -> Result<Self, InjectError> {
        debug!(?copy_command, paste_steps = paste_commands.len(), "ClipboardPaste::new: called");
        if copy_command.is_empty() || paste_commands.is_empty() || paste_commands.iter().any(Vec::is_empty) {
            return Err(InjectError::NotConfigured("clipboard"));
        }
        Ok(Self {
            copy_command,
            paste_commands,
        })
    }
}

#[async_trait]
impl InjectStrategy for ClipboardPaste {
    fn name(&self) -> &'static str {
        "clipboard"
    }

    async fn inject(&self, text: &str) -> Result<(), InjectError> {
        debug!(text_len = text.len(), "ClipboardPaste::inject: called");
        run_step(&self.copy_command, Some(text)).await?;
        for step in &self.paste_commands {
            run_step(step, None).await?;
        }
        Ok(())
    }
}

/// Type the text with a dedicated keystroke helper (cliclick, xdotool)
pub struct KeystrokeHelper {
    commands: Vec<Vec<String>>,
}

impl KeystrokeHelper {
    pub fn new(commands: Vec<Vec<String>>) -> Result<Self, InjectError> {
        debug!(steps = commands.len(), "KeystrokeHelper::new: called");
        if commands.is_empty() || commands.iter().any(Vec::is_empty) {
            return Err(InjectError::NotConfigured("keystroke"));
        }
        Ok(Self { commands })
    }
}

#[async_trait]
impl InjectStrategy for KeystrokeHelper {
    fn name(&self) -> &'static str {
        "keystroke"
    }

    async fn inject(&self, text: &str) -> Result<(), InjectError> {
        debug!(text_len = text.len(), "KeystrokeHelper::inject: called");
        for step in &self.commands {
            let argv: Vec<String> = step.iter().map(|arg| arg.replace(TEXT_PLACEHOLDER, text)).collect();
            run_step(&argv, None).await?;
        }
        Ok(())
    }
}

/// Run one helper command to completion, optionally feeding `stdin`
pub(crate) async fn run_step(argv: &[String], stdin: Option<&str>) -> Result<(), InjectError> {
    let Some((program, args)) = argv.split_first() else {
        return Err(InjectError::NotConfigured("command"));
    };
    debug!(%program, arg_count = args.len(), has_stdin = stdin.is_some(), "run_step: called");

    let mut child = Command::new(program)
        .args(args)
        .stdin(if stdin.is_some() { Stdio::piped() } else { Stdio::null() })
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|source| InjectError::Spawn {
            program: program.clone(),
            source,
        })?;

    if let Some(input) = stdin {
        if let Some(mut pipe) = child.stdin.take() {
            pipe.write_all(input.as_bytes())
                .await
                .map_err(|source| InjectError::Stdin {
                    program: program.clone(),
                    source,
                })?;
            // Close stdin so the helper sees EOF
            drop(pipe);
        }
    }

    let status = child.wait().await.map_err(|source| InjectError::Spawn {
        program: program.clone(),
        source,
    })?;

    if !status.success() {
        debug!(%program, ?status, "run_step: non-zero exit");
        return Err(InjectError::Exit {
            program: program.clone(),
            status,
        });
    }
    Ok(())
}
