//! Task queue loading and rendering
//!
//! The queue source is a plain text document with one task per non-empty
//! line. It is read exactly once per run; the resulting [`TaskBatch`] is
//! immutable.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

/// Prefix of the initial message that carries the whole batch
pub const BATCH_PREFIX: &str = "Process these tasks one by one: ";

/// Separator between rendered tasks in the initial message
pub const TASK_SEPARATOR: &str = "; ";

/// Why the queue could not be loaded
#[derive(Debug, Error)]
pub enum QueueError {
    #[error("Queue file {0} not found!")]
    Missing(PathBuf),

    #[error("Queue file {path} could not be read: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Queue file {0} has no tasks")]
    Empty(PathBuf),
}

/// A single queued task
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    /// 1-based line number within the queue content
    pub index: usize,

    /// Trimmed, non-empty task text
    pub text: String,
}

impl Task {
    /// Render as `"{index}. {text}"`
    pub fn render(&self) -> String {
        format!("{}. {}", self.index, self.text)
    }
}

/// Ordered tasks delivered together as one message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskBatch {
    tasks: Vec<Task>,
}

impl TaskBatch {
    /// Build a batch from raw queue content, skipping blank lines
    ///
    /// A task's index is its line number in the content, counted after
    /// leading and trailing blank lines are stripped; inner blank lines
    /// leave gaps.
    pub fn parse(content: &str) -> Self {
        let tasks: Vec<Task> = content
            .trim()
            .lines()
            .enumerate()
            .map(|(i, line)| (i + 1, line.trim()))
            .filter(|(_, line)| !line.is_empty())
            .map(|(index, line)| Task {
                index,
                text: line.to_string(),
            })
            .collect();
        debug!(task_count = tasks.len(), "TaskBatch::parse: called");
        Self { tasks }
    }

    /// Load the queue file, failing if it is missing, unreadable or empty
    pub fn load(path: &Path) -> Result<Self, QueueError> {
        debug!(?path, "TaskBatch::load: called");
        if !path.exists() {
            debug!(?path, "TaskBatch::load: file missing");
            return Err(QueueError::Missing(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|source| QueueError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;

        let batch = Self::parse(&content);
        if batch.is_empty() {
            debug!(?path, "TaskBatch::load: no tasks");
            return Err(QueueError::Empty(path.to_path_buf()));
        }
        Ok(batch)
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Render the initial message injected into the assistant
    pub fn render(&self) -> String {
        let rendered: Vec<String> = self.tasks.iter().map(Task::render).collect();
        format!("{}{}", BATCH_PREFIX, rendered.join(TASK_SEPARATOR))
    }
}
