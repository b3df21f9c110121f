//! InputInjector - primary/fallback delivery with a one-time focus delay

use std::time::Duration;

use colored::Colorize;
use tracing::{debug, error, info, warn};

use super::{InjectError, InjectStrategy, create_strategy};
use crate::config::{InjectionConfig, StrategyKind};

/// Characters of the payload echoed in delivery log lines
const PREVIEW_CHARS: usize = 50;

/// Delivers text to the focused assistant
///
/// Failures never escape as errors: the primary strategy is tried once,
/// the fallback (if any) is tried exactly once after it, and the outcome is
/// reported as a boolean.
pub struct InputInjector {
    primary: Box<dyn InjectStrategy>,
    fallback: Option<Box<dyn InjectStrategy>>,
    focus_delay: Duration,
    granted_focus_delay: bool,
}

impl InputInjector {
    pub fn new(
        primary: Box<dyn InjectStrategy>,
        fallback: Option<Box<dyn InjectStrategy>>,
        focus_delay: Duration,
    ) -> Self {
        debug!(
            primary = primary.name(),
            fallback = ?fallback.as_ref().map(|f| f.name()),
            ?focus_delay,
            "InputInjector::new: called"
        );
        Self {
            primary,
            fallback,
            focus_delay,
            granted_focus_delay: false,
        }
    }

    /// Build the injector from the injection config section
    pub fn from_config(config: &InjectionConfig) -> Result<Self, InjectError> {
        debug!(primary = ?config.primary, fallback = ?config.fallback, "InputInjector::from_config: called");
        if config.primary == StrategyKind::None {
            return Err(InjectError::NotConfigured("primary"));
        }
        let primary = create_strategy(config.primary, config)?.ok_or(InjectError::NotConfigured("primary"))?;
        let fallback = create_strategy(config.fallback, config)?;
        Ok(Self::new(primary, fallback, Duration::from_secs(config.focus_delay_secs)))
    }

    /// Whether the one-time focus grace delay has already been spent
    pub fn has_granted_focus_delay(&self) -> bool {
        self.granted_focus_delay
    }

    /// Deliver `text` plus a submit action; `true` on success
    pub async fn deliver(&mut self, text: &str) -> bool {
        debug!(text_len = text.len(), "InputInjector::deliver: called");
        self.grant_focus_delay().await;

        let primary_err = match self.primary.inject(text).await {
            Ok(()) => {
                info!("Sent to Claude via {}: {}...", self.primary.name(), preview(text));
                return true;
            }
            Err(e) => e,
        };
        warn!("Error with {}: {}", self.primary.name(), primary_err);

        let Some(fallback) = self.fallback.as_ref() else {
            error!("No fallback injection strategy configured");
            return false;
        };

        debug!(fallback = fallback.name(), "InputInjector::deliver: trying fallback");
        match fallback.inject(text).await {
            Ok(()) => {
                info!("Sent to Claude via {}: {}...", fallback.name(), preview(text));
                true
            }
            Err(e) => {
                if e.is_missing_program() {
                    error!("{} helper not available: {}", fallback.name(), e);
                } else {
                    error!("Error with {}: {}", fallback.name(), e);
                }
                false
            }
        }
    }

    async fn grant_focus_delay(&mut self) {
        if self.granted_focus_delay {
            return;
        }
        debug!(focus_delay = ?self.focus_delay, "InputInjector::grant_focus_delay: first delivery");
        println!("{}", "Focus your Claude Code terminal window now...".yellow().bold());
        info!("Waiting {:?} for the assistant window to be focused", self.focus_delay);
        tokio::time::sleep(self.focus_delay).await;
        self.granted_focus_delay = true;
    }
}

fn preview(text: &str) -> String {
    text.chars().take(PREVIEW_CHARS).collect()
}
