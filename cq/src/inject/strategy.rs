//! InjectStrategy trait definition

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use super::{ClipboardPaste, InjectError, KeystrokeHelper, TmuxPaste};
use crate::config::{InjectionConfig, StrategyKind};

/// One mechanism for moving text into the assistant's input
///
/// Delivery is all-or-nothing from the caller's point of view: `Ok(())`
/// means the text and a submit action were sent, any error means nothing
/// should be assumed about the target's input buffer.
#[async_trait]
pub trait InjectStrategy: Send + Sync {
    /// Short name used in log lines
    fn name(&self) -> &'static str;

    /// Inject `text` followed by a submit (Enter) action
    async fn inject(&self, text: &str) -> Result<(), InjectError>;
}

/// Build the strategy selected by `kind`, or `None` for [`StrategyKind::None`]
pub fn create_strategy(
    kind: StrategyKind,
    config: &InjectionConfig,
) -> Result<Option<Box<dyn InjectStrategy>>, InjectError> {
    debug!(?kind, "create_strategy: called");
    match kind {
        StrategyKind::Clipboard => Ok(Some(Box::new(ClipboardPaste::new(
            config.clipboard.copy_command.clone(),
            config.clipboard.paste_commands.clone(),
        )?))),
        StrategyKind::Keystroke => Ok(Some(Box::new(KeystrokeHelper::new(
            config.keystroke.commands.clone(),
        )?))),
        StrategyKind::Tmux => {
            let target = config.tmux.target.clone().ok_or(InjectError::NotConfigured("tmux"))?;
            Ok(Some(Box::new(TmuxPaste::new(
                target,
                Duration::from_millis(config.tmux.submit_delay_ms),
            ))))
        }
        StrategyKind::None => {
            debug!("create_strategy: no strategy selected");
            Ok(None)
        }
    }
}
