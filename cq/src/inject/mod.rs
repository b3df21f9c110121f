//! Input injection
//!
//! Delivers text into the focused assistant as if typed by a human. Each
//! mechanism is an [`InjectStrategy`]; [`InputInjector`] owns a primary and
//! an optional fallback strategy plus the one-time focus grace delay.

mod command;
mod error;
mod injector;
pub mod strategy;
mod tmux;

pub use command::{ClipboardPaste, KeystrokeHelper};
pub use error::InjectError;
pub use injector::InputInjector;
pub use strategy::{InjectStrategy, create_strategy};
pub use tmux::TmuxPaste;
